use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "Store or replace an identity", long_about = "Replaces the name stored for KEY and, if --image is given, its face image. Omitting --name clears the stored name; omitting --image keeps the stored face.")]
    Store {
        #[arg(long, allow_negative_numbers = true)]
        key: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_name = "PATH", help = "Image file to store as the face (any supported format)")]
        image: Option<PathBuf>,
    },
    #[command(about = "Print one identity as JSON")]
    Fetch {
        #[arg(long, allow_negative_numbers = true)]
        key: i64,
        #[arg(long, value_name = "PATH", help = "Also save the stored face to PATH")]
        export: Option<PathBuf>,
    },
    #[command(about = "Print whether an identity is stored")]
    Exists {
        #[arg(long, allow_negative_numbers = true)]
        key: i64,
    },
    #[command(about = "Print the number of stored identities")]
    Count,
    #[command(about = "Remove an identity and its face")]
    Remove {
        #[arg(long, allow_negative_numbers = true)]
        key: i64,
    },
    #[command(about = "Remove every identity and face")]
    Clear,
    #[command(about = "Print every identity, one JSON object per line")]
    Dump,
}

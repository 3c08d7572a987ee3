mod wiring;

use crate::{cli, context, query::AsyncIdentityStorage};
use anyhow::Result;

pub struct App {
    pub ctx: context::Context,
    pub identities: AsyncIdentityStorage,
}

impl App {
    pub fn from_cli() -> Result<(Self, cli::Cli)> {
        let cli = crate::cli::parse();
        let ctx = context::Context::from_cli(&cli);

        crate::tracing::init(ctx.config.log_file.as_deref());
        log::debug!("📂 Data dir: {}", ctx.config.data_dir.display());
        log::debug!("🧮 Workers: {}", ctx.config.workers);
        if let Some(path) = ctx.config.log_file.as_deref() {
            log::debug!("📝 Log file: {}", path.display());
        }

        let app = Self::from_context(ctx)?;
        Ok((app, cli))
    }

    pub fn from_context(ctx: context::Context) -> Result<Self> {
        let storage = wiring::init_storage(&ctx)?;
        let identities = wiring::build_identities(&ctx, storage);
        Ok(Self { ctx, identities })
    }
}

pub async fn run() -> Result<()> {
    let (app, cli) = App::from_cli()?;

    let mut stdout = std::io::stdout().lock();
    let res = cli.cmd.run(&app.identities, &mut stdout).await;
    app.identities.executor().close();
    res
}

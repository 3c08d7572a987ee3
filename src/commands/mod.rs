use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::Command;
use crate::query::AsyncIdentityStorage;
use crate::types::{Identity, IdentityError};

mod models;

pub use models::IdentitySummary;

impl Command {
    /// Runs one repository operation through the background executor and
    /// prints its result to `out`.
    pub async fn run<W: Write>(&self, identities: &AsyncIdentityStorage, out: &mut W) -> Result<()> {
        match self {
            Command::Store { key, name, image } => {
                let image = match image {
                    Some(path) => Some(load_image(identities, path.clone()).await?),
                    None => None,
                };
                let identity = Identity::new(*key, name.clone(), image);
                identities
                    .store(identity)
                    .wait()
                    .await
                    .into_result()
                    .with_context(|| format!("storing identity {key}"))?;
                log::info!("stored identity {}", key);
            }
            Command::Fetch { key, export } => {
                let found = identities
                    .fetch(Identity::with_key(*key))
                    .wait()
                    .await
                    .into_result()
                    .with_context(|| format!("fetching identity {key}"))?;
                let Some(identity) = found else {
                    anyhow::bail!("identity {key} not found");
                };
                writeln!(out, "{}", serde_json::to_string(&IdentitySummary::from(&identity))?)?;
                if let Some(path) = export {
                    export_face(identities, identity, path.clone()).await?;
                }
            }
            Command::Exists { key } => {
                let exists = identities
                    .exists(Identity::with_key(*key))
                    .wait()
                    .await
                    .into_result()
                    .with_context(|| format!("checking identity {key}"))?;
                writeln!(out, "{exists}")?;
            }
            Command::Count => {
                let count = identities
                    .count()
                    .wait()
                    .await
                    .into_result()
                    .context("counting identities")?;
                writeln!(out, "{count}")?;
            }
            Command::Remove { key } => {
                identities
                    .remove(Identity::with_key(*key))
                    .wait()
                    .await
                    .into_result()
                    .with_context(|| format!("removing identity {key}"))?;
                log::info!("removed identity {}", key);
            }
            Command::Clear => {
                identities
                    .clear_all()
                    .wait()
                    .await
                    .into_result()
                    .context("clearing identities")?;
            }
            Command::Dump => {
                let all = identities
                    .dump_all()
                    .wait()
                    .await
                    .into_result()
                    .context("dumping identities")?;
                for identity in &all {
                    writeln!(out, "{}", serde_json::to_string(&IdentitySummary::from(identity))?)?;
                }
            }
        }
        Ok(())
    }
}

async fn load_image(identities: &AsyncIdentityStorage, path: PathBuf) -> Result<image::DynamicImage> {
    let shown = path.display().to_string();
    identities
        .executor()
        .spawn("load_image", move || {
            image::open(&path).map_err(|source| match source {
                image::ImageError::IoError(e) => IdentityError::io("read image", path, e),
                source => IdentityError::Decode { path, source },
            })
        })
        .wait()
        .await
        .into_result()
        .with_context(|| format!("loading image {shown}"))
}

async fn export_face(identities: &AsyncIdentityStorage, identity: Identity, path: PathBuf) -> Result<()> {
    let key = identity.key;
    let Some(face) = identity.image else {
        anyhow::bail!("identity {key} has no stored face");
    };
    let shown = path.display().to_string();
    identities
        .executor()
        .spawn("export_face", move || {
            face.save(&path)
                .map_err(|source| IdentityError::Encode { key, source })
        })
        .wait()
        .await
        .into_result()
        .with_context(|| format!("exporting face to {shown}"))?;
    log::info!("exported face of {} to {}", key, shown);
    Ok(())
}

use crate::configuration::Configuration;

pub struct Context {
    pub config: Configuration,
}

impl Context {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        let cfg = Configuration {
            data_dir: cli.data_dir.clone(),
            log_file: cli.log_file.clone(),
            workers: cli.workers,
            busy_timeout_ms: cli.busy_timeout_ms,
        };
        Self { config: cfg }
    }
}

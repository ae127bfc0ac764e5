use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::cli::Cli;
use crate::config::{Settings, SettingsError};
use crate::shell::{Shell, ShellError, shutdown_signal, spawn_stdin_reader};

pub struct Application;

impl Application {
    pub async fn run(cli: Cli) -> Result<(), ApplicationError> {
        let settings = Settings::read(&cli.config).await.context(SettingsSnafu)?;
        debug!("Loaded settings: {:?}", settings);

        let config = RuntimeConfig::new(cli, settings);
        debug!("Runtime config: {:?}", config);

        colored::control::set_override(
            supports_color::on(supports_color::Stream::Stdout).is_some(),
        );

        let mut shell = Shell::new(config, std::io::stdout());
        if shell.config().load_on_start {
            info!("Loading state on start");
            shell.load(None).await.context(ShellSnafu)?;
        }

        let lines = spawn_stdin_reader().context(InputSnafu)?;
        shell
            .run(lines, shutdown_signal())
            .await
            .context(ShellSnafu)?;

        info!("Session finished");
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while reading settings"))]
    SettingsError { source: SettingsError },
    #[snafu(display("Critical failure encountered in the shell"))]
    ShellError { source: ShellError },
    #[snafu(display("Failed to start reading standard input"))]
    InputError { source: std::io::Error },
}

#![allow(clippy::enum_variant_names)]

//! `treefs`: an interactive shell over an in-memory directory tree, with
//! snapshots that survive restarts.

use clap::Parser as _;
use tracing::debug;

use crate::application::{Application, ApplicationError};
use crate::cli::Cli;

mod application;
mod cli;
mod config;
mod ext;
mod filesystem;
mod persistence;
mod shell;

#[compio::main]
#[snafu::report]
async fn main() -> Result<(), ApplicationError> {
    let cli = Cli::parse();
    cli.log_level.install_subscriber();
    debug!("Starting treefs with {cli:?}");

    Application::run(cli).await
}

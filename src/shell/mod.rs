//! Line-oriented interactive front end over the in-memory tree.

mod command;
mod input;
#[allow(clippy::module_inception)]
mod shell;
mod signal;

pub use input::spawn_stdin_reader;
pub use shell::{Shell, ShellError};
pub use signal::shutdown_signal;

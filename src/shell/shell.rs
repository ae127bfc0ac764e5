use std::io::Write;
use std::path::Path;

use colored::Colorize;
use futures::stream::FusedStream;
use futures::{FutureExt, Stream, StreamExt, select};
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::RuntimeConfig;
use crate::filesystem::{FileSystem, FsError, NodeKind};
use crate::shell::command::Command;

/// Whether the session goes on after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Interactive front end: parses lines, calls into the filesystem and prints
/// results and errors to `out`. Core errors never end the session.
pub struct Shell<W> {
    file_system: FileSystem,
    config: RuntimeConfig,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(config: RuntimeConfig, out: W) -> Self {
        Self {
            file_system: FileSystem::new(),
            config,
            out,
        }
    }

    pub fn file_system(&self) -> &FileSystem {
        &self.file_system
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn prompt(&self) -> String {
        format!("Current Directory: {} $ ", self.file_system.current_name())
    }

    /// Runs until `exit`, end of input, or `shutdown` completing.
    ///
    /// On shutdown the state is autosaved when the configuration asks for it.
    pub async fn run<S, F>(&mut self, mut lines: S, shutdown: F) -> Result<(), ShellError>
    where
        S: Stream<Item = String> + FusedStream + Unpin,
        F: Future<Output = ()>,
    {
        let mut shutdown = std::pin::pin!(shutdown.fuse());

        loop {
            let prompt = self.prompt();
            write!(self.out, "{prompt}").context(OutputSnafu)?;
            self.out.flush().context(OutputSnafu)?;

            select! {
                line = lines.next() => match line {
                    Some(line) => {
                        if self.execute_line(&line).await? == Flow::Exit {
                            break;
                        }
                    }
                    None => {
                        debug!("Input closed, leaving the shell");
                        writeln!(self.out).context(OutputSnafu)?;
                        break;
                    }
                },
                () = shutdown => {
                    writeln!(self.out).context(OutputSnafu)?;
                    if self.config.autosave_on_signal {
                        info!("Shutdown requested, saving state");
                        self.save(None).await?;
                    }
                    break;
                }
            }
        }

        Ok(())
    }

    /// Parses and executes one line. Invalid commands are reported, not returned.
    pub async fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        match Command::parse(line) {
            Ok(Some(command)) => self.execute(command).await,
            Ok(None) => Ok(Flow::Continue),
            Err(e) => {
                debug!("Rejected input line: {:?}", e.line());
                self.report(&e)?;
                Ok(Flow::Continue)
            }
        }
    }

    pub async fn execute(&mut self, command: Command) -> Result<Flow, ShellError> {
        debug!("Executing {:?}", command);

        match command {
            Command::Exit => return Ok(Flow::Exit),
            Command::Save { path } => self.save(path.as_deref()).await?,
            Command::Load { path } => self.load(path.as_deref()).await?,
            command => match self.apply(command) {
                Ok(lines) => {
                    for line in lines {
                        writeln!(self.out, "{line}").context(OutputSnafu)?;
                    }
                }
                Err(e) => self.report(&e)?,
            },
        }

        Ok(Flow::Continue)
    }

    /// Writes a snapshot to `path`, or to the configured state file.
    pub async fn save(&mut self, path: Option<&Path>) -> Result<(), ShellError> {
        let path = path.unwrap_or(&self.config.state_file);
        match self.config.store().save(path, &self.file_system).await {
            Ok(()) => writeln!(self.out, "State saved successfully.").context(OutputSnafu),
            Err(e) => self.report(&e),
        }
    }

    /// Replaces the tree from a snapshot. On failure the current tree stays as it was.
    pub async fn load(&mut self, path: Option<&Path>) -> Result<(), ShellError> {
        let path = path.unwrap_or(&self.config.state_file);
        match self.config.store().load(path).await {
            Ok(file_system) => {
                self.file_system = file_system;
                writeln!(self.out, "State loaded successfully.").context(OutputSnafu)
            }
            Err(e) => {
                if e.is_malformed() {
                    warn!("Keeping the current tree, snapshot is unusable: {}", e);
                }
                self.report(&e)
            }
        }
    }

    /// Runs a tree command and returns the lines it prints.
    fn apply(&mut self, command: Command) -> Result<Vec<String>, FsError> {
        let fs = &mut self.file_system;

        let lines = match command {
            Command::Ls { path } => fs
                .ls(path.as_deref())?
                .into_iter()
                .map(|entry| match entry.kind {
                    NodeKind::Directory => entry.name.blue().bold().to_string(),
                    NodeKind::File => entry.name,
                })
                .collect(),
            Command::Cd { path } => {
                fs.cd(&path)?;
                Vec::new()
            }
            Command::Pwd => vec![fs.pwd()],
            Command::Mkdir { name } => {
                let outcome = fs.mkdir(&name)?;
                if outcome.renamed() {
                    vec![format!("{} created as {}", outcome.requested, outcome.created)]
                } else {
                    Vec::new()
                }
            }
            Command::Touch { name } => {
                fs.touch(&name)?;
                Vec::new()
            }
            Command::Write { name, content } => {
                fs.write(&name, &content)?;
                Vec::new()
            }
            Command::Mv {
                source,
                destination,
            } => {
                fs.mv(&source, &destination)?;
                vec![format!("{source} moved to {destination}")]
            }
            Command::Cp {
                source,
                destination,
            } => {
                fs.cp(&source, &destination)?;
                vec![format!("{source} copied to {destination}")]
            }
            Command::Rm { name } => {
                fs.rm(&name)?;
                vec![format!("{name} removed successfully.")]
            }
            Command::Grep { name, pattern } => {
                if fs.grep(&name, &pattern)? {
                    vec![format!("Pattern found in {name}")]
                } else {
                    vec![format!("Pattern not found in {name}")]
                }
            }
            Command::Cat { name } => vec![fs.cat(&name)?.to_string()],
            Command::Exit | Command::Save { .. } | Command::Load { .. } => Vec::new(),
        };

        Ok(lines)
    }

    fn report(&mut self, error: &dyn std::error::Error) -> Result<(), ShellError> {
        debug!("Command failed: {}", error);
        writeln!(self.out, "{} {}", "Error:".red(), error).context(OutputSnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum ShellError {
    #[snafu(display("Failed to write shell output"))]
    OutputError { source: std::io::Error },
}

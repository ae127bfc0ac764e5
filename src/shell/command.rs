use std::path::PathBuf;

use snafu::Snafu;

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ls { path: Option<String> },
    Cd { path: String },
    Pwd,
    Mkdir { name: String },
    Touch { name: String },
    Write { name: String, content: String },
    Mv { source: String, destination: String },
    Cp { source: String, destination: String },
    Rm { name: String },
    Grep { name: String, pattern: String },
    Cat { name: String },
    Save { path: Option<PathBuf> },
    Load { path: Option<PathBuf> },
    Exit,
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(display("Invalid command."))]
pub struct InvalidCommandError {
    line: String,
}

impl InvalidCommandError {
    pub fn line(&self) -> &str {
        &self.line
    }
}

impl Command {
    /// Splits `line` on whitespace and matches operation and argument count.
    ///
    /// Blank lines parse to `None`. `write` joins every word after the file name
    /// with single spaces.
    pub fn parse(line: &str) -> Result<Option<Self>, InvalidCommandError> {
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        let Some((&operation, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let owned = |index: usize| args[index].to_string();
        let command = match (operation, args.len()) {
            ("exit", 0) => Command::Exit,
            ("ls", 0) => Command::Ls { path: None },
            ("ls", 1) => Command::Ls {
                path: Some(owned(0)),
            },
            ("cd", 1) => Command::Cd { path: owned(0) },
            ("pwd", 0) => Command::Pwd,
            ("mkdir", 1) => Command::Mkdir { name: owned(0) },
            ("touch", 1) => Command::Touch { name: owned(0) },
            ("write", n) if n >= 1 => Command::Write {
                name: owned(0),
                content: args[1..].join(" "),
            },
            ("mv", 2) => Command::Mv {
                source: owned(0),
                destination: owned(1),
            },
            ("cp", 2) => Command::Cp {
                source: owned(0),
                destination: owned(1),
            },
            ("rm", 1) => Command::Rm { name: owned(0) },
            ("grep", 2) => Command::Grep {
                name: owned(0),
                pattern: owned(1),
            },
            ("cat", 1) => Command::Cat { name: owned(0) },
            ("save", 0) => Command::Save { path: None },
            ("save", 1) => Command::Save {
                path: Some(PathBuf::from(args[0])),
            },
            ("load", 0) => Command::Load { path: None },
            ("load", 1) => Command::Load {
                path: Some(PathBuf::from(args[0])),
            },
            _ => {
                return Err(InvalidCommandError {
                    line: line.to_string(),
                });
            }
        };

        Ok(Some(command))
    }
}

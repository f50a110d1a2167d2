//! Command table for the REPL.
//!
//! Every command is a [`Handler`] registered under its name in a
//! [`CommandTable`]. A handler gets the session, the raw argument string
//! (everything after the command name) and the console sink, and either
//! writes its success output or returns an error for the dispatcher to
//! report.

pub mod files;
pub mod navigation;
pub mod system;

use crate::error::{FmError, Result};
use crate::session::Session;
use crate::transfer::TransferMode;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Console sink handed to handlers
pub type Output = dyn AsyncWrite + Unpin + Send;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn run(&self, session: &mut Session, args: &str, out: &mut Output) -> Result<()>;
}

/// Fixed name -> handler lookup
pub struct CommandTable {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl CommandTable {
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &'static str, handler: impl Handler + 'static) {
        self.handlers.insert(name, Box::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Handler> {
        self.handlers.get(name).map(|h| h.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        let mut table = Self::empty();

        table.register("nwd", navigation::Nwd);
        table.register("up", navigation::Up);
        table.register("cd", navigation::Cd);

        table.register("ls", files::Ls);
        table.register("cat", files::Cat);
        table.register("add", files::Add);
        table.register("rn", files::Rename);
        table.register("rm", files::Remove);
        table.register("hash", files::Hash);
        table.register("cp", files::Transfer(TransferMode::Copy));
        table.register("mv", files::Transfer(TransferMode::Move));
        table.register("compress", files::Transfer(TransferMode::Compress));
        table.register("decompress", files::Transfer(TransferMode::Decompress));

        table.register("os", system::Os);

        table
    }
}

/// Split a trimmed line on the first whitespace run into name and rest.
pub fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim_start()),
        None => (line, ""),
    }
}

/// The whole argument string as one path, so names with spaces survive.
pub fn one_arg<'a>(args: &'a str, usage: &'static str) -> Result<&'a str> {
    let arg = args.trim();
    if arg.is_empty() {
        return Err(FmError::MissingArgument(usage));
    }
    Ok(arg)
}

/// The first two whitespace-separated tokens; extras are ignored.
pub fn two_args<'a>(args: &'a str, usage: &'static str) -> Result<(&'a str, &'a str)> {
    let mut tokens = args.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(first), Some(second)) => Ok((first, second)),
        _ => Err(FmError::MissingArgument(usage)),
    }
}

/// Write `line` plus a newline to the console.
pub async fn write_line(out: &mut Output, line: &str) -> Result<()> {
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await?;
    Ok(())
}

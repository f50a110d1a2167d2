use super::{one_arg, write_line, Handler, Output};
use crate::error::Result;
use crate::session::Session;
use async_trait::async_trait;
use std::path::Path;

/// The line printed at startup and after every directory change.
pub fn location_line(dir: &Path) -> String {
    format!("You are currently in {}", dir.display())
}

pub struct Nwd;

#[async_trait]
impl Handler for Nwd {
    async fn run(&self, session: &mut Session, _args: &str, out: &mut Output) -> Result<()> {
        write_line(out, &location_line(session.current_dir())).await
    }
}

pub struct Up;

#[async_trait]
impl Handler for Up {
    async fn run(&self, session: &mut Session, _args: &str, out: &mut Output) -> Result<()> {
        let dir = session.go_up()?;
        write_line(out, &location_line(dir)).await
    }
}

pub struct Cd;

#[async_trait]
impl Handler for Cd {
    async fn run(&self, session: &mut Session, args: &str, out: &mut Output) -> Result<()> {
        let target = one_arg(args, "cd <path>")?;
        let dir = session.change_directory(target).await?;
        write_line(out, &location_line(dir)).await
    }
}

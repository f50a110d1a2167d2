//! The prompt loop.
//!
//! ```text
//! AwaitingInput --line--> Dispatching --done--> AwaitingInput
//!       |                      |
//!       +-- EOF / interrupt ---+-- .exit --> Closed
//! ```
//!
//! Exactly one command runs at a time and every handler error is reported
//! on the console; nothing a command does can end the loop except `.exit`.

use crate::commands::navigation::location_line;
use crate::commands::{split_command, CommandTable};
use crate::error::FmError;
use crate::session::Session;
use std::future::Future;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Line that closes the session
pub const EXIT_TOKEN: &str = ".exit";

/// Written before each read
pub const PROMPT: &str = "> ";

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    ExitCommand,
    EndOfInput,
    Interrupted,
}

/// What the loop does after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Close,
}

pub fn greeting(display_name: Option<&str>) -> String {
    match display_name {
        Some(name) => format!("Welcome to the File Manager, {}!", name),
        None => "Welcome to the File Manager!".to_string(),
    }
}

pub fn farewell(display_name: Option<&str>) -> String {
    match display_name {
        Some(name) => format!("Thank you for using File Manager, {}, goodbye!", name),
        None => "Thank you for using File Manager, goodbye!".to_string(),
    }
}

pub struct Repl {
    session: Session,
    commands: CommandTable,
}

impl Repl {
    pub fn new(session: Session) -> Self {
        Self::with_commands(session, CommandTable::default())
    }

    pub fn with_commands(session: Session, commands: CommandTable) -> Self {
        Self { session, commands }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run until `.exit`, end of input, or `shutdown` resolves.
    ///
    /// The farewell is written exactly once on every path. `Err` means the
    /// console itself failed. Input bytes that are not UTF-8 are replaced
    /// rather than rejected.
    pub async fn run<R, W, S>(&mut self, mut input: R, out: &mut W, shutdown: S) -> io::Result<CloseReason>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut buf = Vec::new();

        write_str(out, &greeting(self.session.display_name())).await?;
        write_str(out, &location_line(self.session.current_dir())).await?;

        let reason = loop {
            out.write_all(PROMPT.as_bytes()).await?;
            out.flush().await?;

            buf.clear();
            let read = tokio::select! {
                read = input.read_until(b'\n', &mut buf) => read?,
                _ = &mut shutdown => {
                    // Finish the prompt line before saying goodbye
                    out.write_all(b"\n").await?;
                    break CloseReason::Interrupted;
                }
            };

            if read == 0 {
                out.write_all(b"\n").await?;
                break CloseReason::EndOfInput;
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            if self.dispatch(line, out).await? == Step::Close {
                break CloseReason::ExitCommand;
            }
        };

        tracing::debug!("session closed: {:?}", reason);
        write_str(out, &farewell(self.session.display_name())).await?;
        out.flush().await?;
        Ok(reason)
    }

    /// Handle one input line. Handler failures become one console line.
    pub async fn dispatch<W>(&mut self, line: &str, out: &mut W) -> io::Result<Step>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Step::Continue);
        }
        if line == EXIT_TOKEN {
            return Ok(Step::Close);
        }

        let (name, args) = split_command(line);
        tracing::debug!("dispatch {} {:?}", name, args);

        let result = match self.commands.get(name) {
            Some(handler) => handler.run(&mut self.session, args, out).await,
            None => Err(FmError::UnknownCommand(name.to_string())),
        };

        if let Err(err) = result {
            tracing::debug!("{} failed: {:?}", name, err);
            write_str(out, &err.console_line()).await?;
        }
        Ok(Step::Continue)
    }
}

async fn write_str<W: AsyncWrite + Unpin + ?Sized>(out: &mut W, line: &str) -> io::Result<()> {
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    async fn repl_in(dir: &Path, name: Option<&str>) -> Repl {
        let session = Session::open(dir, name.map(str::to_string)).await.unwrap();
        Repl::new(session)
    }

    async fn run_script(repl: &mut Repl, script: &str) -> (CloseReason, String) {
        let mut out = Vec::new();
        let reason = repl
            .run(script.as_bytes(), &mut out, std::future::pending())
            .await
            .unwrap();
        (reason, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_exit_command() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), Some("ada")).await;

        let (reason, text) = run_script(&mut repl, "nwd\n.exit\nnwd\n").await;

        assert_eq!(reason, CloseReason::ExitCommand);
        let location = location_line(tmp.path());
        assert_eq!(
            text,
            format!(
                "Welcome to the File Manager, ada!\n{loc}\n> {loc}\n> Thank you for using File Manager, ada, goodbye!\n",
                loc = location
            )
        );
    }

    #[tokio::test]
    async fn test_end_of_input_says_goodbye_once() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), None).await;

        let (reason, text) = run_script(&mut repl, "nwd").await;

        assert_eq!(reason, CloseReason::EndOfInput);
        assert_eq!(text.matches("goodbye").count(), 1);
        assert!(text.starts_with("Welcome to the File Manager!\n"));
        assert!(text.ends_with("Thank you for using File Manager, goodbye!\n"));
    }

    #[tokio::test]
    async fn test_interrupt_closes_session() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), None).await;
        let (_reader_keepalive, reader) = tokio::io::duplex(64);
        let mut out = Vec::new();

        let reason = repl
            .run(tokio::io::BufReader::new(reader), &mut out, async {})
            .await
            .unwrap();

        assert_eq!(reason, CloseReason::Interrupted);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("goodbye").count(), 1);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_loop() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), None).await;

        let script = "bogus\ncd nowhere\ncat\nrn a\nos --nope\nadd ok.txt\n.exit\n";
        let (reason, text) = run_script(&mut repl, script).await;

        assert_eq!(reason, CloseReason::ExitCommand);
        assert!(text.contains("Invalid input. Unknown operation: bogus."));
        assert!(text.contains("Operation failed: "));
        assert!(text.contains("Invalid input. Missing argument. Usage: cat <path>"));
        assert!(text.contains("Invalid input. Missing argument. Usage: rn <old> <new>"));
        assert!(text.contains("Invalid input. Unknown operating system command: --nope."));
        assert!(text.contains("File is created."));
        assert!(tmp.path().join("ok.txt").exists());
    }

    #[tokio::test]
    async fn test_non_utf8_line_does_not_end_session() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), None).await;
        let mut out = Vec::new();

        let script: &[u8] = b"cat caf\xe9.txt\nnwd\n.exit\n";
        let reason = repl
            .run(script, &mut out, std::future::pending())
            .await
            .unwrap();

        assert_eq!(reason, CloseReason::ExitCommand);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Operation failed: "));
        assert_eq!(text.matches(&location_line(tmp.path())).count(), 2);
        assert!(text.ends_with("Thank you for using File Manager, goodbye!\n"));
    }

    #[tokio::test]
    async fn test_crlf_line_endings() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), None).await;

        let (reason, _) = run_script(&mut repl, "nwd\r\n.exit\r\n").await;
        assert_eq!(reason, CloseReason::ExitCommand);
    }

    #[tokio::test]
    async fn test_cd_failure_keeps_directory() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), None).await;
        let mut out = Vec::new();

        repl.dispatch("cd does-not-exist", &mut out).await.unwrap();

        assert_eq!(repl.session().current_dir(), tmp.path());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Operation failed: "));
    }

    #[tokio::test]
    async fn test_blank_lines_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), None).await;
        let mut out = Vec::new();

        assert_eq!(repl.dispatch("   ", &mut out).await.unwrap(), Step::Continue);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_exit_token_is_trimmed() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), None).await;
        let mut out = Vec::new();

        assert_eq!(repl.dispatch("  .exit  ", &mut out).await.unwrap(), Step::Close);
    }

    #[tokio::test]
    async fn test_note_scenario() {
        let tmp = TempDir::new().unwrap();
        let work = tmp.path();
        let mut repl = repl_in(work, None).await;

        let script = format!(
            "add note.txt\ncompress note.txt {dir}\ndecompress note.txt.br {dir}\n.exit\n",
            dir = work.display()
        );

        let (_, text) = run_script(&mut repl, &script).await;

        assert!(text.contains("File is created."));
        assert!(text.contains("compressed to"));
        assert!(text.contains("decompressed to"));
        assert!(work.join("note.txt.br").exists());
        assert_eq!(fs::metadata(work.join("note.txt")).unwrap().len(), 0);
    }
}

use clap::{ArgAction, Command, CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fileman")]
#[command(about = "Interactive file manager with streaming copy, compression and hashing", long_about = None)]
#[command(version)]
#[command(ignore_errors = true)]
pub struct Cli {
    /// Name used in the greeting and farewell (`--username=<name>`)
    #[arg(long)]
    pub username: Option<String>,

    /// Directory to start in (defaults to the current working directory)
    #[arg(long, env = "FILEMAN_START_DIR")]
    pub start_dir: Option<PathBuf>,

    /// Verbose logging to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse the process arguments, ignoring anything unrecognised.
    pub fn parse_lenient() -> Result<Self, clap::Error> {
        Self::parse_lenient_from(std::env::args_os())
    }

    /// Parse `args`, keeping only options this command defines.
    ///
    /// Stray tokens may appear anywhere, before or after known options. An
    /// empty `--username=` counts as no name.
    pub fn parse_lenient_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut command = Self::command();
        command.build();

        let mut args = args.into_iter().map(Into::into);
        let mut kept: Vec<OsString> = args.next().into_iter().collect();
        while let Some(arg) = args.next() {
            let Some(takes_value) = known_option(&command, &arg) else {
                tracing::debug!("ignoring argument {:?}", arg);
                continue;
            };
            kept.push(arg);
            if takes_value {
                kept.extend(args.next());
            }
        }

        let mut cli = Self::try_parse_from(kept)?;
        cli.username = cli.username.filter(|name| !name.is_empty());
        Ok(cli)
    }

    /// Default tracing filter for the verbosity level. `RUST_LOG` overrides it.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// `Some(takes_value)` when `arg` names an option of `command`. A value
/// supplied inline (`--name=value`) does not need a following token.
fn known_option(command: &Command, arg: &OsString) -> Option<bool> {
    let arg = arg.to_str()?;

    if let Some(long) = arg.strip_prefix("--") {
        let (name, inline) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };
        let option = command
            .get_arguments()
            .find(|a| a.get_long() == Some(name))?;
        return Some(option.get_action().takes_values() && !inline);
    }

    let shorts = arg.strip_prefix('-').filter(|s| !s.is_empty())?;
    let mut takes_value = false;
    for c in shorts.chars() {
        let option = command.get_arguments().find(|a| a.get_short() == Some(c))?;
        takes_value = option.get_action().takes_values();
    }
    Some(takes_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_username() {
        let cli = Cli::try_parse_from(["fileman", "--username=ada"]).unwrap();
        assert_eq!(cli.username.as_deref(), Some("ada"));
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["fileman"]).unwrap();
        assert!(cli.username.is_none());
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["fileman", "-vv"]).unwrap();
        assert_eq!(cli.log_level(), "debug");
    }

    #[test]
    fn test_username_after_unknown_argument() {
        let cli = Cli::parse_lenient_from(["fileman", "--colour=loud", "--username=bob"]).unwrap();
        assert_eq!(cli.username.as_deref(), Some("bob"));

        let cli = Cli::parse_lenient_from(["fileman", "stray", "--username=bob"]).unwrap();
        assert_eq!(cli.username.as_deref(), Some("bob"));
    }

    #[test]
    fn test_username_before_unknown_argument() {
        let cli = Cli::parse_lenient_from(["fileman", "--username=bob", "--colour=loud", "-x"]).unwrap();
        assert_eq!(cli.username.as_deref(), Some("bob"));
    }

    #[test]
    fn test_empty_username_is_absent() {
        let cli = Cli::parse_lenient_from(["fileman", "--username="]).unwrap();
        assert!(cli.username.is_none());
    }

    #[test]
    fn test_separate_values_survive_filtering() {
        let cli = Cli::parse_lenient_from([
            "fileman",
            "junk",
            "--start-dir",
            "/srv",
            "--username",
            "ada",
            "-vv",
            "--colour",
        ])
        .unwrap();
        assert_eq!(cli.start_dir, Some(PathBuf::from("/srv")));
        assert_eq!(cli.username.as_deref(), Some("ada"));
        assert_eq!(cli.log_level(), "debug");
    }

    #[test]
    fn test_start_dir() {
        let cli = Cli::try_parse_from(["fileman", "--start-dir", "/srv"]).unwrap();
        assert_eq!(cli.start_dir, Some(PathBuf::from("/srv")));
    }
}

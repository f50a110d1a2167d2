//! Host introspection for the `os` command.

use crate::error::{FmError, Result};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsQuery {
    Eol,
    Cpus,
    HomeDir,
    Username,
    Architecture,
}

impl FromStr for OsQuery {
    type Err = FmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "--EOL" => Ok(OsQuery::Eol),
            "--cpus" => Ok(OsQuery::Cpus),
            "--homedir" => Ok(OsQuery::HomeDir),
            "--username" => Ok(OsQuery::Username),
            "--architecture" => Ok(OsQuery::Architecture),
            other => Err(FmError::UnknownFlag(other.to_string())),
        }
    }
}

/// Line terminator of the host platform
pub const EOL: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Lines to print for `query`.
pub fn report(query: OsQuery) -> Result<Vec<String>> {
    let lines = match query {
        OsQuery::Eol => vec![
            "Operating System Information:".to_string(),
            format!("Platform: {}", std::env::consts::OS),
            format!("Release: {}", whoami::distro()),
            format!("Architecture: {}", std::env::consts::ARCH),
            format!("End-Of-Line: {:?}", EOL),
        ],
        OsQuery::Cpus => vec![
            "CPU Information:".to_string(),
            format!("Number of CPUs: {}", num_cpus::get()),
            format!("Physical cores: {}", num_cpus::get_physical()),
        ],
        OsQuery::HomeDir => {
            let home = dirs::home_dir().ok_or(FmError::HostInfo("Home directory"))?;
            vec![format!("Home Directory: {}", home.display())]
        }
        OsQuery::Username => vec![format!("Current User Name: {}", whoami::username())],
        OsQuery::Architecture => vec![format!("Architecture: {}", std::env::consts::ARCH)],
    };
    Ok(lines)
}

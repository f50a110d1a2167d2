use super::{one_arg, write_line, Handler, Output};
use crate::error::Result;
use crate::os_info::{report, OsQuery};
use crate::session::Session;
use async_trait::async_trait;

pub struct Os;

#[async_trait]
impl Handler for Os {
    async fn run(&self, _session: &mut Session, args: &str, out: &mut Output) -> Result<()> {
        let query: OsQuery = one_arg(args, "os --EOL|--cpus|--homedir|--username|--architecture")?
            .parse()?;
        for line in report(query)? {
            write_line(out, &line).await?;
        }
        Ok(())
    }
}

//! Open-settings command for sending the user to the usage access screen.

use std::io::Write;

use anyhow::Result;

use crate::channel::Host;

pub fn run<W: Write, H: Host + ?Sized>(writer: &mut W, host: &H) -> Result<()> {
    host.open_usage_access_settings()?;
    writeln!(writer, "Opened usage access settings.")?;
    Ok(())
}

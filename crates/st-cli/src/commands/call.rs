//! Call command for dispatching a single method call.

use std::io::Write;

use anyhow::{Context, Result};

use crate::channel::{Host, MethodCall, Reply, dispatch};

/// Dispatches `method` to `host` and writes the reply as one JSON line.
pub fn run<W: Write, H: Host + ?Sized>(
    writer: &mut W,
    host: &H,
    method: &str,
    arguments: Option<&str>,
) -> Result<Reply> {
    let arguments = arguments
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("arguments must be valid JSON")?;
    let call = MethodCall {
        method: method.to_string(),
        arguments,
    };

    let reply = dispatch(host, &call);
    writeln!(writer, "{}", serde_json::to_string(&reply)?)?;
    Ok(reply)
}

//! JSON method channel between a UI process and the native host.
//!
//! Each request names a method and optional arguments; each reply is one of
//! three envelopes:
//!
//! - `{"status":"success","result":...}`
//! - `{"status":"error","code":...,"message":...,"details":null}`
//! - `{"status":"not_implemented"}`
//!
//! `not_implemented` is kept distinct from `error` so a caller can tell a
//! missing method from a failed one.

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use st_core::Report;
use thiserror::Error;

/// Error code for a failed usage query.
pub const USAGE_ERROR: &str = "USAGE_ERROR";
/// Error code for a failure to open the settings screen.
pub const SETTINGS_ERROR: &str = "SETTINGS_ERROR";
/// Error code for a request line that is not a valid method call.
pub const BAD_REQUEST: &str = "BAD_REQUEST";

/// A request arriving over the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: None,
        }
    }
}

/// Methods the host implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Per-app usage for the last 24 hours.
    GetTodayUsage,
    /// Send the user to the usage access permission screen.
    OpenUsageAccessSettings,
}

impl Method {
    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GetTodayUsage => "getTodayUsage",
            Self::OpenUsageAccessSettings => "openUsageAccessSettings",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A method name the host does not implement.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "getTodayUsage" => Ok(Self::GetTodayUsage),
            "openUsageAccessSettings" => Ok(Self::OpenUsageAccessSettings),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// A reply sent back over the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    Success {
        result: Value,
    },
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    NotImplemented,
}

impl Reply {
    #[must_use]
    pub fn success(result: Value) -> Self {
        Self::Success { result }
    }

    #[must_use]
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// The native side of the channel.
///
/// This trait allows dispatch to work with different hosts (e.g., the
/// SQLite-backed [`NativeHost`](crate::NativeHost), or test fixtures).
pub trait Host {
    /// Fetches and aggregates usage for the 24 hours ending now.
    fn today_usage(&self) -> Result<Report>;

    /// Opens the screen where the user grants usage access.
    fn open_usage_access_settings(&self) -> Result<()>;
}

/// Routes one method call to the host and wraps the outcome in a [`Reply`].
///
/// Host failures become labeled errors; nothing is retried.
pub fn dispatch<H: Host + ?Sized>(host: &H, call: &MethodCall) -> Reply {
    let method = match call.method.parse::<Method>() {
        Ok(method) => method,
        Err(err) => {
            tracing::warn!(%err, "rejecting method call");
            return Reply::NotImplemented;
        }
    };
    tracing::debug!(%method, "dispatching method call");

    match method {
        Method::GetTodayUsage => match host.today_usage() {
            Ok(report) => match serde_json::to_value(&report) {
                Ok(result) => Reply::success(result),
                Err(err) => Reply::error(USAGE_ERROR, err.to_string()),
            },
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "usage query failed");
                Reply::error(USAGE_ERROR, format!("{err:#}"))
            }
        },
        Method::OpenUsageAccessSettings => match host.open_usage_access_settings() {
            Ok(()) => Reply::success(Value::Null),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "failed to open settings");
                Reply::error(SETTINGS_ERROR, format!("{err:#}"))
            }
        },
    }
}

/// Serves JSON-lines method calls from `reader`, writing one reply per call.
///
/// Blank lines are skipped. A line that does not decode as a method call,
/// including one that is not valid UTF-8, gets a `BAD_REQUEST` reply and the
/// loop continues. Returns the number of replies written.
pub fn serve<H, R, W>(host: &H, mut reader: R, writer: &mut W) -> Result<usize>
where
    H: Host + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut replies = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .context("failed to read method call")?;
        if read == 0 {
            break;
        }
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }

        let reply = match serde_json::from_slice::<MethodCall>(line) {
            Ok(call) => dispatch(host, &call),
            Err(err) => Reply::error(BAD_REQUEST, format!("invalid method call: {err}")),
        };

        serde_json::to_writer(&mut *writer, &reply).context("failed to encode reply")?;
        writeln!(writer)?;
        writer.flush()?;
        replies += 1;
    }
    Ok(replies)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;

    use anyhow::anyhow;
    use st_core::{UsageRecord, aggregate};

    use super::*;

    /// Host returning canned results.
    pub(crate) struct FakeHost {
        pub records: Vec<UsageRecord>,
        pub usage_error: Option<&'static str>,
        pub settings_error: Option<&'static str>,
        pub settings_opened: Cell<usize>,
    }

    impl FakeHost {
        pub(crate) fn with_records(records: Vec<UsageRecord>) -> Self {
            Self {
                records,
                usage_error: None,
                settings_error: None,
                settings_opened: Cell::new(0),
            }
        }
    }

    impl Host for FakeHost {
        fn today_usage(&self) -> Result<Report> {
            if let Some(message) = self.usage_error {
                return Err(anyhow!(message));
            }
            Ok(aggregate(self.records.clone()))
        }

        fn open_usage_access_settings(&self) -> Result<()> {
            if let Some(message) = self.settings_error {
                return Err(anyhow!(message));
            }
            self.settings_opened.set(self.settings_opened.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn method_from_str() {
        assert_eq!(
            "getTodayUsage".parse::<Method>().unwrap(),
            Method::GetTodayUsage
        );
        assert_eq!(
            "openUsageAccessSettings".parse::<Method>().unwrap(),
            Method::OpenUsageAccessSettings
        );
        assert_eq!(
            "gettodayusage".parse::<Method>().unwrap_err(),
            UnknownMethod("gettodayusage".to_string())
        );
    }

    #[test]
    fn method_as_str_matches_from_str() {
        for method in [Method::GetTodayUsage, Method::OpenUsageAccessSettings] {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
        }
    }

    #[test]
    fn get_today_usage_returns_report() {
        let host = FakeHost::with_records(vec![
            UsageRecord::new("com.a", 30_000),
            UsageRecord::new("com.a", 90_000),
        ]);
        let reply = dispatch(&host, &MethodCall::new("getTodayUsage"));
        assert_eq!(
            reply,
            Reply::success(serde_json::json!({
                "totalMinutes": 2,
                "apps": [{"package": "com.a", "minutes": 2}],
            }))
        );
    }

    #[test]
    fn get_today_usage_failure_is_labeled() {
        let mut host = FakeHost::with_records(Vec::new());
        host.usage_error = Some("usage access not granted");
        let reply = dispatch(&host, &MethodCall::new("getTodayUsage"));
        assert_eq!(reply, Reply::error(USAGE_ERROR, "usage access not granted"));
    }

    #[test]
    fn open_settings_returns_null() {
        let host = FakeHost::with_records(Vec::new());
        let reply = dispatch(&host, &MethodCall::new("openUsageAccessSettings"));
        assert_eq!(reply, Reply::success(Value::Null));
        assert_eq!(host.settings_opened.get(), 1);
    }

    #[test]
    fn open_settings_failure_is_labeled() {
        let mut host = FakeHost::with_records(Vec::new());
        host.settings_error = Some("no usage access settings command configured");
        let reply = dispatch(&host, &MethodCall::new("openUsageAccessSettings"));
        assert!(matches!(reply, Reply::Error { ref code, .. } if code == SETTINGS_ERROR));
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let host = FakeHost::with_records(Vec::new());
        let reply = dispatch(&host, &MethodCall::new("getWeeklyUsage"));
        assert_eq!(reply, Reply::NotImplemented);
        assert_eq!(host.settings_opened.get(), 0);
    }

    #[test]
    fn reply_envelopes_serialize() {
        let json = serde_json::to_string(&Reply::NotImplemented).unwrap();
        assert_eq!(json, r#"{"status":"not_implemented"}"#);

        let json = serde_json::to_string(&Reply::error(USAGE_ERROR, "boom")).unwrap();
        assert_eq!(
            json,
            r#"{"status":"error","code":"USAGE_ERROR","message":"boom","details":null}"#
        );

        let json = serde_json::to_string(&Reply::success(Value::Null)).unwrap();
        assert_eq!(json, r#"{"status":"success","result":null}"#);
    }

    #[test]
    fn method_call_arguments_are_optional() {
        let call: MethodCall = serde_json::from_str(r#"{"method":"getTodayUsage"}"#).unwrap();
        assert_eq!(call, MethodCall::new("getTodayUsage"));
    }

    #[test]
    fn serve_answers_each_line() {
        let host = FakeHost::with_records(vec![UsageRecord::new("com.a", 60_000)]);
        let input = concat!(
            r#"{"method":"getTodayUsage"}"#,
            "\n\n",
            r#"{"method":"nope","arguments":{"x":1}}"#,
            "\n",
            "not json\n",
        );
        let mut output = Vec::new();

        let replies = serve(&host, input.as_bytes(), &mut output).unwrap();
        assert_eq!(replies, 3);

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            r#"{"status":"success","result":{"apps":[{"minutes":1,"package":"com.a"}],"totalMinutes":1}}"#
        );
        assert_eq!(lines[1], r#"{"status":"not_implemented"}"#);

        let bad: Reply = serde_json::from_str(lines[2]).unwrap();
        assert!(matches!(bad, Reply::Error { ref code, .. } if code == BAD_REQUEST));
    }

    #[test]
    fn serve_keeps_going_after_invalid_utf8() {
        let host = FakeHost::with_records(vec![UsageRecord::new("com.a", 60_000)]);
        let input: &[u8] =
            b"{\"method\":\"getTodayUsage\"}\n\xff\xfe garbage\n{\"method\":\"getTodayUsage\"}\n";
        let mut output = Vec::new();

        let replies = serve(&host, input, &mut output).unwrap();
        assert_eq!(replies, 3);

        let output = String::from_utf8(output).unwrap();
        let replies: Vec<Reply> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert!(matches!(replies[0], Reply::Success { .. }));
        assert!(matches!(replies[1], Reply::Error { ref code, .. } if code == BAD_REQUEST));
        assert_eq!(replies[2], replies[0]);
    }

    #[test]
    fn serve_answers_last_line_without_newline() {
        let host = FakeHost::with_records(Vec::new());
        let mut output = Vec::new();

        let replies = serve(&host, &b"{\"method\":\"nope\"}"[..], &mut output).unwrap();
        assert_eq!(replies, 1);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "{\"status\":\"not_implemented\"}\n"
        );
    }
}

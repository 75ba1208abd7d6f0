//! Running shortcuts through the host's scripting bridges.
//!
//! Waiting runs go through `osascript` and the "Shortcuts Events" helper so
//! output can be captured. Fire-and-forget runs open a `shortcuts://` URL.

use crate::error::{Result, ShortcutsError};
use crate::types::RunResult;
use serde_json::Value;
use std::future::Future;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Executes external programs. Swapped for a fake in tests.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<CommandOutput>> + Send;
}

/// Spawns real processes with `tokio::process`. The child is killed if the
/// timeout elapses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);

        let output = match timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| ShortcutsError::Timeout(limit.as_secs()))??,
            None => cmd.output().await?,
        };
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

// ---------------------------------------------------------------------------
// Script and URL construction
// ---------------------------------------------------------------------------

/// Strings pass through; anything else is compact JSON.
pub fn stringify_input(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A double-quoted AppleScript string literal.
pub fn applescript_literal(value: &str) -> String {
    Value::from(value).to_string()
}

pub fn build_applescript(name: &str, input: Option<&Value>) -> String {
    let mut run = format!("    run the shortcut named {}", applescript_literal(name));
    if let Some(input) = input {
        run.push_str(" with input ");
        run.push_str(&applescript_literal(&stringify_input(input)));
    }
    ["tell application \"Shortcuts Events\"", &run, "end tell"].join("\n")
}

pub fn build_shortcut_url(name: &str, input: Option<&Value>) -> String {
    let mut url = format!(
        "shortcuts://run-shortcut?name={}",
        urlencoding::encode(name)
    );
    if let Some(input) = input {
        url.push_str("&input=");
        url.push_str(&urlencoding::encode(&stringify_input(input)));
    }
    url
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptRun {
    pub output: String,
    pub elapsed_ms: u64,
    pub exit_code: i32,
}

/// Run a shortcut and wait for it. Output is trimmed stdout followed by
/// trimmed stderr on its own line when there is any.
pub async fn run_via_applescript<R: CommandRunner>(
    runner: &R,
    name: &str,
    input: Option<&Value>,
    timeout: Option<Duration>,
) -> Result<ScriptRun> {
    let started = Instant::now();
    let args = vec!["-e".to_string(), build_applescript(name, input)];
    let result = runner.run("osascript", &args, timeout).await?;

    let stdout = result.stdout.trim();
    let stderr = result.stderr.trim();
    let output = if stderr.is_empty() {
        stdout.to_string()
    } else {
        format!("{stdout}\n{stderr}").trim().to_string()
    };
    Ok(ScriptRun {
        output,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        exit_code: result.exit_code,
    })
}

/// Launch a shortcut without waiting for its result.
pub async fn run_via_url_scheme<R: CommandRunner>(
    runner: &R,
    name: &str,
    input: Option<&Value>,
    timeout: Option<Duration>,
) -> Result<()> {
    let args = vec![build_shortcut_url(name, input)];
    let result = runner.run("open", &args, timeout).await?;
    if result.exit_code == 0 {
        return Ok(());
    }
    let stderr = result.stderr.trim();
    let stdout = result.stdout.trim();
    let message = if !stderr.is_empty() {
        stderr.to_string()
    } else if !stdout.is_empty() {
        stdout.to_string()
    } else {
        format!("open returned {}", result.exit_code)
    };
    Err(ShortcutsError::Execution(message))
}

/// Run a shortcut and fold every failure into an unsuccessful [`RunResult`].
/// A JSON `null` input counts as no input.
pub async fn run_shortcut<R: CommandRunner>(
    runner: &R,
    name: &str,
    input: Option<&Value>,
    wait_for_result: bool,
    timeout: Duration,
) -> RunResult {
    let input = input.filter(|value| !value.is_null());
    tracing::info!(shortcut = name, wait = wait_for_result, "running shortcut");

    if wait_for_result {
        return match run_via_applescript(runner, name, input, Some(timeout)).await {
            Ok(run) => RunResult {
                success: run.exit_code == 0,
                output: Some(run.output),
                execution_time_ms: Some(run.elapsed_ms),
            },
            Err(ShortcutsError::Timeout(_)) => failure("Timeout waiting for shortcut".into()),
            Err(e) => failure(failure_message(e)),
        };
    }

    match run_via_url_scheme(runner, name, input, Some(timeout)).await {
        Ok(()) => RunResult {
            success: true,
            output: None,
            execution_time_ms: None,
        },
        Err(e) => failure(failure_message(e)),
    }
}

fn failure(message: String) -> RunResult {
    tracing::warn!(error = %message, "shortcut run failed");
    RunResult {
        success: false,
        output: Some(message),
        execution_time_ms: None,
    }
}

fn failure_message(error: ShortcutsError) -> String {
    match error {
        ShortcutsError::Execution(message) => message,
        other => other.to_string(),
    }
}

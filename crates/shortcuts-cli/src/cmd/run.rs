use crate::context::ToolContext;
use crate::output::print_json;
use shortcuts_core::executor::run_shortcut;
use std::time::Duration;

pub fn run(
    ctx: &ToolContext,
    name: &str,
    input: Option<&str>,
    wait: bool,
    timeout_secs: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let input = input.map(parse_input);
    let timeout = timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| ctx.config.default_timeout());

    let result = ctx
        .block_on(run_shortcut(&ctx.runner, name, input.as_ref(), wait, timeout))
        .map_err(anyhow::Error::msg)?;

    if json {
        print_json(&result)?;
    } else if result.success {
        if let Some(output) = result.output.as_deref().filter(|o| !o.is_empty()) {
            println!("{output}");
        }
    }

    if !result.success {
        anyhow::bail!(
            "shortcut '{name}' failed: {}",
            result.output.as_deref().unwrap_or("no output")
        );
    }
    Ok(())
}

/// Command-line input is taken as JSON when it parses, otherwise as a plain
/// string.
fn parse_input(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

use crate::context::ToolContext;
use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use shortcuts_core::library;
use shortcuts_core::types::{SearchIn, ShortcutMetadata};

pub fn list(
    ctx: &ToolContext,
    folder: Option<&str>,
    with_actions: bool,
    json: bool,
) -> anyhow::Result<()> {
    let shortcuts = library::list_shortcuts(&ctx.db, folder, with_actions)
        .context("failed to list shortcuts")?;
    if json {
        return print_json(&shortcuts);
    }
    print_shortcuts(&shortcuts, with_actions);
    Ok(())
}

pub fn show(ctx: &ToolContext, name: &str, json: bool) -> anyhow::Result<()> {
    let detail = library::get_shortcut(&ctx.db, name, true)?;
    if json {
        return print_json(&detail);
    }

    println!("Name:       {}", detail.name);
    println!("ID:         {}", or_dash(detail.id.as_deref()));
    println!("Actions:    {}", or_dash(detail.action_count));
    println!("Modified:   {}", or_dash(detail.last_modified.as_deref()));
    if let Some(inputs) = detail.input_types.filter(|i| !i.is_empty()) {
        println!("Input:      {}", inputs.join(", "));
    }

    let actions = detail.actions.unwrap_or_default();
    if actions.is_empty() {
        return Ok(());
    }
    println!();
    let rows = actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let params = if action.parameters.is_empty() {
                "-".to_string()
            } else {
                action.parameters.keys().cloned().collect::<Vec<_>>().join(", ")
            };
            vec![(i + 1).to_string(), action.identifier.clone(), params]
        })
        .collect::<Vec<_>>();
    print_table(&["#", "ACTION", "PARAMETERS"], &rows);
    Ok(())
}

pub fn search(ctx: &ToolContext, query: &str, search_in: SearchIn, json: bool) -> anyhow::Result<()> {
    let shortcuts = library::search_shortcuts(&ctx.db, query, search_in)
        .with_context(|| format!("failed to search shortcuts for '{query}'"))?;
    if json {
        return print_json(&shortcuts);
    }
    if shortcuts.is_empty() {
        println!("No shortcuts match '{query}'.");
        return Ok(());
    }
    print_shortcuts(&shortcuts, false);
    Ok(())
}

pub fn folders(ctx: &ToolContext, json: bool) -> anyhow::Result<()> {
    let folders = ctx.db.folders().context("failed to list folders")?;
    if json {
        return print_json(&folders);
    }
    if folders.is_empty() {
        println!("No folders.");
        return Ok(());
    }
    for folder in folders {
        println!("{}", folder.name);
    }
    Ok(())
}

fn print_shortcuts(shortcuts: &[ShortcutMetadata], with_actions: bool) {
    if shortcuts.is_empty() {
        println!("No shortcuts.");
        return;
    }
    let mut headers = vec!["NAME", "ACTIONS", "MODIFIED"];
    if with_actions {
        headers.push("TYPES");
    }
    let rows = shortcuts
        .iter()
        .map(|s| {
            let mut row = vec![
                s.name.clone(),
                or_dash(s.action_count),
                or_dash(s.last_modified.as_deref()),
            ];
            if with_actions {
                row.push(s.action_types.as_ref().map_or(0, Vec::len).to_string());
            }
            row
        })
        .collect::<Vec<_>>();
    print_table(&headers, &rows);
}

use crate::context::ToolContext;
use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use shortcuts_core::catalog::ActionQuery;

pub fn list(ctx: &ToolContext, query: ActionQuery, json: bool) -> anyhow::Result<()> {
    let result = ctx
        .catalog
        .get_all_actions(&query)
        .context("failed to build the action catalog")?;
    if json {
        return print_json(&result.actions);
    }
    if result.actions.is_empty() {
        println!("No actions match.");
        return Ok(());
    }

    let rows = result
        .actions
        .iter()
        .map(|a| {
            vec![
                a.identifier.clone(),
                a.source.to_string(),
                a.category.clone(),
                a.usage_count.to_string(),
                or_dash(a.title.as_deref()),
            ]
        })
        .collect::<Vec<_>>();
    print_table(&["IDENTIFIER", "SOURCE", "CATEGORY", "USES", "TITLE"], &rows);
    println!("\n{} action(s)", result.actions.len());
    Ok(())
}

pub fn categories(ctx: &ToolContext, json: bool) -> anyhow::Result<()> {
    let categories = ctx
        .catalog
        .categories()
        .context("failed to build the action catalog")?;
    if json {
        return print_json(&categories);
    }
    for category in categories {
        println!("{category}");
    }
    Ok(())
}

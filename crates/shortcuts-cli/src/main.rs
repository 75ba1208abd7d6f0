use clap::{Parser, Subcommand};
use shortcuts_cli::{cmd, context::ToolContext};
use shortcuts_core::catalog::ActionQuery;
use shortcuts_core::config::{expand_tilde, Config};
use shortcuts_core::types::{ActionSource, SearchIn};

#[derive(Parser)]
#[command(
    name = "shortcuts-mcp",
    about = "Browse, search, and run macOS Shortcuts, or serve them to MCP clients over stdio",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the Shortcuts database (default: ~/Library/Shortcuts/Shortcuts.sqlite)
    #[arg(long, global = true, env = "SHORTCUTS_DB_PATH")]
    db: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as an MCP stdio server (the default)
    Serve,

    /// List shortcuts in the library
    List {
        /// Folder to filter by
        #[arg(long)]
        folder: Option<String>,

        /// Decode each shortcut and count its distinct action types
        #[arg(long)]
        actions: bool,
    },

    /// Show one shortcut and its actions
    Show { name: String },

    /// Search shortcuts by name or action content
    Search {
        query: String,

        /// Where to look: name, actions, or both
        #[arg(long = "in", default_value = "name")]
        search_in: SearchIn,
    },

    /// List known action types
    Actions {
        /// Only actions from this source (system, apps, library, curated)
        #[arg(long)]
        source: Option<ActionSource>,

        /// Category name or identifier prefix
        #[arg(long)]
        category: Option<String>,

        /// Substring of identifier, title, or description
        #[arg(long)]
        search: Option<String>,

        /// Rebuild the catalog first
        #[arg(long)]
        refresh: bool,
    },

    /// List action categories
    Categories,

    /// List library folders
    Folders,

    /// Run a shortcut
    Run {
        name: String,

        /// Input for the shortcut (parsed as JSON when possible)
        #[arg(long)]
        input: Option<String>,

        /// Launch without waiting for the result
        #[arg(long)]
        no_wait: bool,

        /// Seconds to wait (default: SHORTCUTS_DEFAULT_TIMEOUT or 30)
        #[arg(long)]
        timeout: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    let config = match load_config(cli.db.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    };

    let default_level = match &command {
        Commands::Serve => config.tracing_level(),
        _ => tracing::Level::WARN,
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(default_level.to_string().to_lowercase())
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        // stdout carries command output and the JSON-RPC stream
        .with_writer(std::io::stderr)
        .init();

    let ctx = ToolContext::new(config);
    let json = cli.json;

    let result = match command {
        Commands::Serve => cmd::mcp::run(&ctx),
        Commands::List { folder, actions } => {
            cmd::shortcuts::list(&ctx, folder.as_deref(), actions, json)
        }
        Commands::Show { name } => cmd::shortcuts::show(&ctx, &name, json),
        Commands::Search { query, search_in } => {
            cmd::shortcuts::search(&ctx, &query, search_in, json)
        }
        Commands::Actions {
            source,
            category,
            search,
            refresh,
        } => cmd::actions::list(
            &ctx,
            ActionQuery {
                source,
                category,
                search,
                force_refresh: refresh,
            },
            json,
        ),
        Commands::Categories => cmd::actions::categories(&ctx, json),
        Commands::Folders => cmd::shortcuts::folders(&ctx, json),
        Commands::Run {
            name,
            input,
            no_wait,
            timeout,
        } => cmd::run::run(&ctx, &name, input.as_deref(), !no_wait, timeout, json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(db: Option<&str>) -> anyhow::Result<Config> {
    let config = Config::from_env()?;
    match db.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => Ok(config.with_db_path(expand_tilde(raw)?)),
        None => Ok(config),
    }
}

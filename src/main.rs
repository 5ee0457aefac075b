use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use poari::app::BoardApp;
use poari::board::BoardState;
use poari::data::{PartitionKey, Provider, Source};
use poari::integrations::{self, loader};
use poari::store::SourceStore;
use poari::{config, util};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "poari")]
#[command(about = "A minimal board view for issues across multiple projects")]
#[command(version)]
struct Args {
    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Write a default config file
    #[arg(long)]
    init: bool,

    /// Overwrite an existing config with --init
    #[arg(long, requires = "init")]
    force: bool,

    /// Column axis: state, milestone, assignee or label
    #[arg(long)]
    columns: Option<PartitionKey>,

    /// Row axis: state, milestone, assignee or label
    #[arg(long)]
    rows: Option<PartitionKey>,

    /// Print the board as JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the sources issues are fetched from
    Sources {
        #[command(subcommand)]
        action: SourcesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SourcesCommand {
    /// List saved sources and their API endpoints
    List,
    /// Add a source
    Add {
        /// Display name, also shown on every card
        #[arg(long)]
        name: String,
        /// organization/repository for GitHub, project id or path for GitLab
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "github")]
        provider: Provider,
        /// Base URL of a self-hosted instance (ignored for GitHub)
        #[arg(long)]
        domain: Option<String>,
        /// Personal access token for private projects
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Remove every source with the given name
    Remove { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("poari=info".parse()?),
        )
        .init();

    if args.init {
        let path = config::init(args.config.as_deref(), args.force)?;
        println!("Config saved to {}", path.display());
        return Ok(());
    }

    let mut config = config::load(args.config.as_deref())?;
    let store = SourceStore::new(config.storage.sources_path()?);

    if let Some(Command::Sources { action }) = args.command {
        return run_sources(&store, action);
    }

    if let Some(columns) = args.columns {
        config.board.columns = columns;
    }
    if let Some(rows) = args.rows {
        config.board.rows = rows;
    }

    let mut app = BoardApp::new(config, store, loader::http_fetcher());
    app.bootstrap()?;
    app.wait_for_load().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&app.state)?);
    } else {
        print_board(&app.state);
    }
    Ok(())
}

fn run_sources(store: &SourceStore, action: SourcesCommand) -> Result<()> {
    let mut sources = store.load()?.unwrap_or_else(poari::data::default_sources);

    match action {
        SourcesCommand::List => {
            for source in &sources {
                let endpoint = integrations::issues_url(source)
                    .unwrap_or_else(|e| format!("invalid: {}", e));
                println!("{:<24} {:<7} {}", source.name, source.provider, endpoint);
            }
            return Ok(());
        }
        SourcesCommand::Add {
            name,
            url,
            provider,
            domain,
            api_key,
        } => {
            let source = Source {
                name,
                url,
                domain,
                api_key: api_key.unwrap_or_default(),
                provider,
            };
            integrations::validate(&source).with_context(|| {
                format!(
                    "{} sources expect url as {}",
                    source.provider,
                    source.provider.url_hint()
                )
            })?;
            sources.push(source);
        }
        SourcesCommand::Remove { name } => {
            let before = sources.len();
            sources.retain(|s| s.name != name);
            if sources.len() == before {
                anyhow::bail!("No source named '{}'", name);
            }
        }
    }

    store.save(&sources)?;
    println!("Saved {} sources to {}", sources.len(), store.path().display());
    Ok(())
}

fn print_board(state: &BoardState) {
    for column in &state.grid.columns {
        let title = if column.bucket.is_empty() {
            state.columns_mode.empty_title()
        } else {
            column.title.as_str()
        };
        println!("== {} ({})", title, column.rows.iter().map(|r| r.issues.len()).sum::<usize>());

        for row in column.rows.iter().filter(|r| !r.issues.is_empty()) {
            let title = if row.bucket.is_empty() {
                state.rows_mode.empty_title()
            } else {
                row.title.as_str()
            };
            println!("   -- {}", title);
            for issue in &row.issues {
                println!(
                    "      #{:<6} {:<60} [{}] {}",
                    issue.number,
                    util::truncate(&issue.title, 60),
                    issue.state,
                    issue.provider
                );
            }
        }
    }

    // multi-valued axes repeat an issue once per label or assignee
    if state.columns_mode.is_multi_valued() || state.rows_mode.is_multi_valued() {
        println!(
            "{} issues shown as {} cards",
            state.issues().len(),
            state.grid.issue_count()
        );
    }

    for (source, error) in state.repository.failures() {
        eprintln!("! {}: {}", source, error);
    }
}

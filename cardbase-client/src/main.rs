use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

use shared_types::ContactRecord;

use cardbase_client::api::ApiClient;
use cardbase_client::browser::DatabaseBrowser;
use cardbase_client::config::ClientConfig;
use cardbase_client::render;
use cardbase_client::workspace::Workspace;

#[derive(Parser, Debug)]
#[command(name = "cardbase", version, about = "Business-card contact extraction client")]
struct Cli {
    #[arg(long)]
    log_file_path: Option<String>,

    /// Backend base URL; overrides CARDBASE_API_URL and the config file.
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract contacts from one or more card images.
    Extract {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Run the AI improve pass on the extracted contacts.
        #[arg(long)]
        improve: bool,

        /// Merge duplicates within the extracted batch (local only).
        #[arg(long)]
        dedupe: bool,

        /// Free-form instructions passed to the improve operation.
        #[arg(long)]
        instructions: Option<String>,
    },

    /// Search the contact database; no query lists everything.
    Search {
        query: Option<String>,

        /// Exact-name lookup instead of the general search.
        #[arg(long, requires = "query")]
        by_name: bool,
    },

    /// Merge duplicate contacts across the whole database.
    Merge {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Delete one contact by its database id.
    Delete {
        id: i64,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing(log_file_path: Option<&str>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = log_file_path {
        let log_path = std::path::Path::new(log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("cardbase.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn confirm(prompt: &str, assume_yes: bool) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let answer = line.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

fn print_notice(notice: Option<&str>) {
    if let Some(notice) = notice {
        println!("{notice}");
    }
}

fn fail_on(error: Option<&str>) -> anyhow::Result<()> {
    match error {
        Some(message) => anyhow::bail!("{message}"),
        None => Ok(()),
    }
}

async fn run_extract(
    client: ApiClient,
    files: &[PathBuf],
    improve: bool,
    dedupe: bool,
    instructions: Option<&str>,
) -> anyhow::Result<()> {
    let mut workspace = Workspace::new(client);

    workspace.extract(files).await;
    fail_on(workspace.error())?;

    if improve {
        workspace.improve(instructions).await;
        fail_on(workspace.error())?;
    }

    if dedupe {
        workspace.dedupe().await;
        fail_on(workspace.error())?;
    }

    print_notice(workspace.notice());
    if workspace.contacts().is_empty() {
        println!("No contacts extracted.");
    } else {
        println!("{}", render::render_records(workspace.contacts()));
    }
    if let Some(meta) = workspace.meta().and_then(render::render_meta) {
        println!("{meta}");
    }

    Ok(())
}

async fn run_search_by_name(client: ApiClient, name: &str) -> anyhow::Result<()> {
    let response = client.search_by_name(name).await?;
    println!(
        "Found {} contact(s) named \"{}\"",
        response.count, name
    );

    let records: Vec<ContactRecord> = response
        .contacts
        .into_iter()
        .map(ContactRecord::persisted)
        .collect();
    if !records.is_empty() {
        println!("{}", render::render_records(&records));
    }
    Ok(())
}

async fn run_search(client: ApiClient, query: &str) -> anyhow::Result<()> {
    let mut browser = DatabaseBrowser::new(client);
    browser.search(query).await;
    fail_on(browser.error())?;

    print_notice(browser.search_info());
    if browser.contacts().is_empty() {
        println!("No contacts found. Start by extracting contacts from business cards.");
    } else {
        println!("{}", render::render_records(browser.contacts()));
    }

    Ok(())
}

async fn run_merge(client: ApiClient, assume_yes: bool) -> anyhow::Result<()> {
    let mut browser = DatabaseBrowser::new(client);
    browser.search("").await;
    fail_on(browser.error())?;

    if browser.contacts().len() < 2 {
        println!("Not enough contacts in the database to merge.");
        return Ok(());
    }

    let prompt = "Merge all duplicate contacts? This will consolidate matching contacts into single entries.";
    if !confirm(prompt, assume_yes)? {
        println!("Aborted.");
        return Ok(());
    }

    browser.merge_duplicates().await;
    fail_on(browser.error())?;

    print_notice(browser.notice());
    print_notice(browser.search_info());
    Ok(())
}

async fn run_delete(client: ApiClient, id: i64, assume_yes: bool) -> anyhow::Result<()> {
    if !confirm("Delete this contact permanently?", assume_yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let mut browser = DatabaseBrowser::new(client);
    browser.delete(id).await;
    fail_on(browser.error())?;

    print_notice(browser.notice());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_file_path.as_deref());

    let base_url = match cli.api_url {
        Some(url) => url,
        None => {
            let (config, config_path) =
                ClientConfig::load().context("Failed to load config")?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            config.api_base_url()
        }
    };
    tracing::info!(base_url = %base_url, "using extraction backend");

    let client = ApiClient::new(base_url);

    match cli.command {
        Command::Extract {
            files,
            improve,
            dedupe,
            instructions,
        } => run_extract(client, &files, improve, dedupe, instructions.as_deref()).await,
        Command::Search { query, by_name } => {
            let query = query.as_deref().unwrap_or("");
            if by_name {
                run_search_by_name(client, query).await
            } else {
                run_search(client, query).await
            }
        }
        Command::Merge { yes } => run_merge(client, yes).await,
        Command::Delete { id, yes } => run_delete(client, id, yes).await,
    }
}

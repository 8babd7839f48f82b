//! newsdesk - a command-line client for the news API.
//!
//! Every request goes through the core interceptor pipeline, so failures are
//! shown once as a toast on stderr and the process exits non-zero.

mod cli;
mod login;
mod toast;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsdesk_core::models::{NewNews, NewsUpdate};
use newsdesk_core::utils::{format_age, format_publish_time, truncate_string};
use newsdesk_core::{
    ApiError, CacheManager, ClientConfig, CredentialStore, HttpClient, NewsApi, NewsQuery,
    Notifier, SessionContext, Settings,
};

use cli::{Cli, Commands};
use toast::StderrToast;

// ============================================================================
// Constants
// ============================================================================

/// When set, logs go to a daily rolling file in this directory instead of stderr
const LOG_DIR_ENV: &str = "NEWSDESK_LOG_DIR";

const LOG_FILE_PREFIX: &str = "newsdesk.log";

/// Subdirectory of the cache dir holding cached responses
const RESPONSE_CACHE_DIR: &str = "responses";

/// Maximum concurrent delete requests.
const MAX_CONCURRENT_REQUESTS: usize = 4;

/// Title column width in list output
const TITLE_WIDTH: usize = 40;

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        _ => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // API failures have already been shown as a toast
            if e.downcast_ref::<ApiError>().is_none() {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load settings, using defaults");
        Settings::default()
    });
    let cache_dir = settings.cache_dir()?;
    let session = SessionContext::persistent(&cache_dir)
        .context("Failed to load saved session")?;

    let mut config = ClientConfig::from_env(settings.base_url.clone());
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
    }

    let toast: Arc<dyn Notifier> = Arc::new(StderrToast::new());
    let http = report(HttpClient::new(config, session, toast.clone()), toast.as_ref())?;
    let cache = CacheManager::new(cache_dir.join(RESPONSE_CACHE_DIR))?;
    let api = NewsApi::new(http).with_cache(cache);

    match cli.command {
        Commands::Login { username, remember } => {
            login(&api, &mut settings, username, remember).await
        }
        Commands::Logout { forget } => logout(&api, forget),
        Commands::Whoami => {
            match api.session().current() {
                Some(data) => println!(
                    "{} (logged in {})",
                    data.username,
                    format_age(data.created_at)
                ),
                None => println!("Not logged in"),
            }
            Ok(())
        }
        Commands::List {
            category,
            page,
            page_size,
            no_cache,
            json,
        } => {
            let query = NewsQuery {
                category_id: category,
                page,
                page_size,
            };
            let result = api.list_news(query, !no_cache).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            println!(
                "{:>6}  {:<width$}  {:<12}  {}",
                "ID",
                "TITLE",
                "AUTHOR",
                "PUBLISHED",
                width = TITLE_WIDTH
            );
            for item in &result.list {
                println!(
                    "{:>6}  {:<width$}  {:<12}  {}",
                    item.id,
                    truncate_string(&item.title, TITLE_WIDTH),
                    truncate_string(item.display_author(), 12),
                    format_publish_time(item.publish_time),
                    width = TITLE_WIDTH
                );
            }
            println!(
                "\nPage {} ({} of {} shown)",
                page,
                result.list.len(),
                result.total
            );
            Ok(())
        }
        Commands::Show { id, no_cache, json } => {
            let item = api.news_detail(id, !no_cache).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&item)?);
            } else {
                println!("#{} {}", item.id, item.title);
                println!(
                    "Category {} | {} | {}\n",
                    item.category_id,
                    item.display_author(),
                    format_publish_time(item.publish_time)
                );
                println!("{}", item.content);
            }
            Ok(())
        }
        Commands::Categories { no_cache } => {
            for category in api.categories(!no_cache).await? {
                println!("{:>4}  {}", category.id, category.name);
            }
            Ok(())
        }
        Commands::Add {
            title,
            content,
            category,
            author,
        } => {
            let created = api
                .add_news(&NewNews {
                    title,
                    content,
                    category_id: category,
                    author,
                })
                .await?;
            println!("Created news #{}", created.id);
            Ok(())
        }
        Commands::Update {
            id,
            title,
            content,
            category,
            author,
        } => {
            let update = NewsUpdate {
                title,
                content,
                category_id: category,
                author,
            };
            if update.is_empty() {
                anyhow::bail!("Nothing to update: pass at least one field");
            }
            api.update_news(id, &update).await?;
            println!("Updated news #{}", id);
            Ok(())
        }
        Commands::Delete { ids } => delete_all(&api, ids).await,
        Commands::ServerCacheClear { pattern } => {
            let summary = api.clear_server_cache(&pattern).await?;
            if summary.is_empty() {
                println!("Server cache cleared ({})", pattern);
            } else {
                println!("{}", summary);
            }
            Ok(())
        }
        Commands::CacheStatus { json } => {
            let status = api.cache_status().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
                return Ok(());
            }
            println!("Status:   {}", status.status);
            println!("Version:  {}", status.redis_version.as_deref().unwrap_or("-"));
            println!("Memory:   {}", status.used_memory.as_deref().unwrap_or("-"));
            match status.connected_clients {
                Some(clients) => println!("Clients:  {}", clients),
                None => println!("Clients:  -"),
            }
            Ok(())
        }
        Commands::CacheClear => {
            let removed = api
                .cache()
                .map(|c| c.clear())
                .transpose()?
                .unwrap_or(0);
            println!("Removed {} cached responses", removed);
            Ok(())
        }
    }
}

/// Show an error raised outside the pipeline the way the pipeline would, so
/// `main` can treat every `ApiError` as already reported.
fn report<T>(result: Result<T, ApiError>, notifier: &dyn Notifier) -> Result<T, ApiError> {
    result.map_err(|e| {
        warn!(error = %e, "Failed outside the request pipeline");
        notifier.notify(e.user_message());
        e
    })
}

async fn login(
    api: &NewsApi,
    settings: &mut Settings,
    username: Option<String>,
    remember: bool,
) -> Result<()> {
    let username = match username.or_else(|| settings.last_username.clone()) {
        Some(u) => u,
        None => prompt_username()?,
    };
    if username.is_empty() {
        anyhow::bail!("Username required");
    }

    let store = CredentialStore::for_backend(&api.http().config().base_url);
    let password = login::login_with_fallback(
        api,
        &username,
        store.get_password(&username).ok(),
        || {
            if let Err(e) = store.delete(&username) {
                warn!(error = %e, "Failed to delete stored credentials");
            }
        },
        || Ok(rpassword::prompt_password("Password: ")?),
    )
    .await?;

    if remember {
        if let Err(e) = store.store(&username, &password) {
            warn!(error = %e, "Failed to store credentials");
        }
    }

    settings.last_username = Some(username.clone());
    if let Err(e) = settings.save() {
        warn!(error = %e, "Failed to save settings");
    }

    info!(username = %username, "Login successful");
    println!("Logged in as {}", username);
    Ok(())
}

fn logout(api: &NewsApi, forget: bool) -> Result<()> {
    let username = api.session().current().map(|d| d.username);
    api.logout()?;

    if forget {
        if let Some(ref username) = username {
            let store = CredentialStore::for_backend(&api.http().config().base_url);
            if let Err(e) = store.delete(username) {
                warn!(error = %e, "Failed to delete stored credentials");
            }
        }
    }

    println!("Logged out");
    Ok(())
}

/// Delete several items with a bounded number of requests in flight. Each
/// failure has already been reported; the first one decides the exit status.
async fn delete_all(api: &NewsApi, ids: Vec<i64>) -> Result<()> {
    let results: Vec<(i64, Result<(), ApiError>)> = stream::iter(ids)
        .map(|id| async move { (id, api.delete_news(id).await) })
        .buffer_unordered(MAX_CONCURRENT_REQUESTS)
        .collect()
        .await;

    let mut first_error = None;
    for (id, result) in results {
        match result {
            Ok(()) => println!("Deleted news #{}", id),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn prompt_username() -> Result<String> {
    print!("Username: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    Ok(username.trim().to_string())
}

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(author, version, about = "Command-line client for the newsdesk news API")]
pub struct Cli {
    /// Override the API base URL for this invocation
    #[clap(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        /// Username (defaults to the last one used)
        #[clap(short, long)]
        username: Option<String>,

        /// Remember the password in the OS keychain
        #[clap(long, default_value_t = false)]
        remember: bool,
    },

    /// Forget the session token
    Logout {
        /// Also remove the remembered password from the keychain
        #[clap(long, default_value_t = false)]
        forget: bool,
    },

    /// Show the current session
    Whoami,

    /// List news in a category
    List {
        #[clap(short, long, default_value_t = 1)]
        category: i64,

        #[clap(short, long, default_value_t = 1)]
        page: u32,

        #[clap(long, default_value_t = 10)]
        page_size: u32,

        /// Always ask the server, ignoring the local cache
        #[clap(long, default_value_t = false)]
        no_cache: bool,

        /// Print raw JSON instead of a table
        #[clap(long, default_value_t = false)]
        json: bool,
    },

    /// Show one news item
    Show {
        id: i64,

        #[clap(long, default_value_t = false)]
        no_cache: bool,

        #[clap(long, default_value_t = false)]
        json: bool,
    },

    /// List news categories
    Categories {
        #[clap(long, default_value_t = false)]
        no_cache: bool,
    },

    /// Publish a news item
    Add {
        #[clap(long)]
        title: String,

        #[clap(long)]
        content: String,

        #[clap(long)]
        category: i64,

        #[clap(long)]
        author: Option<String>,
    },

    /// Change fields of a news item
    Update {
        id: i64,

        #[clap(long)]
        title: Option<String>,

        #[clap(long)]
        content: Option<String>,

        #[clap(long)]
        category: Option<i64>,

        #[clap(long)]
        author: Option<String>,
    },

    /// Delete one or more news items
    Delete {
        #[clap(required = true)]
        ids: Vec<i64>,
    },

    /// Remove all locally cached responses
    CacheClear,

    /// Clear the backend's cache
    ServerCacheClear {
        /// Key pattern, e.g. "news:*"; "*" clears everything
        #[clap(long, default_value = "*")]
        pattern: String,
    },

    /// Show the backend cache status
    CacheStatus {
        #[clap(long, default_value_t = false)]
        json: bool,
    },
}

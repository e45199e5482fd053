mod offline;
mod query;

use clap::{Parser, Subcommand};
use hoom_core::MarketScope;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hoom-cli")]
#[command(about = "Listing search and market analysis from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the filter a Spanish prompt resolves to
    Parse {
        prompt: String,
        /// general or land
        #[arg(long, default_value = "general")]
        scope: MarketScope,
    },
    /// Summarize listings from a JSON file without touching the database
    Summarize {
        /// JSON array of listing records
        #[arg(long)]
        input: std::path::PathBuf,
        #[arg(long, default_value = "general")]
        scope: MarketScope,
        /// Optional prompt applied before summarizing
        #[arg(long)]
        prompt: Option<String>,
    },
    /// List stored listings matching a prompt
    Listings {
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long, default_value = "general")]
        scope: MarketScope,
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Summarize every stored listing matching a prompt
    Analysis {
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long, default_value = "general")]
        scope: MarketScope,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Parse { prompt, scope }) => offline::run_parse(&prompt, scope)?,
        Some(Commands::Summarize {
            input,
            scope,
            prompt,
        }) => offline::run_summarize(&input, scope, prompt.as_deref())?,
        Some(Commands::Listings {
            prompt,
            scope,
            limit,
        }) => {
            let pool = connect().await?;
            query::run_listings(&pool, prompt.as_deref(), scope, limit).await?;
        }
        Some(Commands::Analysis { prompt, scope }) => {
            let pool = connect().await?;
            query::run_analysis(&pool, prompt.as_deref(), scope).await?;
        }
        Some(Commands::Db { command }) => {
            let pool = connect().await?;
            match command {
                DbCommands::Ping => {
                    hoom_db::ping(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = hoom_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        None => println!("hoom-cli: run with --help to see the available commands"),
    }

    Ok(())
}

async fn connect() -> anyhow::Result<sqlx::PgPool> {
    let config = hoom_core::load_app_config()?;
    let pool_config = hoom_db::PoolConfig::from_app_config(&config);
    let pool = hoom_db::connect_pool(&config.database_url, pool_config).await?;
    tracing::debug!(env = %config.env, "connected to database");
    Ok(pool)
}

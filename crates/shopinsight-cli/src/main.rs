mod analyze;
mod history;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shopinsight-cli")]
#[command(about = "Shopify storefront insights from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze one storefront and print its insights
    Analyze {
        /// Store URL; `https://` is assumed when no scheme is given
        url: String,
        /// Also summarize the configured competitor stores
        #[arg(long)]
        competitors: bool,
        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
        /// Store the record in the database
        #[arg(long)]
        save: bool,
    },
    /// List stored analyses, newest first
    History {
        /// Maximum number of records to show
        #[arg(long, default_value = "20")]
        limit: u32,
        /// Number of records to skip
        #[arg(long, default_value = "0")]
        offset: u32,
    },
    /// Show totals over stored analyses
    Stats,
    /// Database commands
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check the database connection
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = shopinsight_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze {
            url,
            competitors,
            json,
            save,
        }) => analyze::run_analyze(&config, &url, competitors, json, save).await?,
        Some(Commands::History { limit, offset }) => {
            let pool = shopinsight_db::connect_pool_from_config(&config).await?;
            history::run_history(&pool, i64::from(limit), i64::from(offset)).await?;
        }
        Some(Commands::Stats) => {
            let pool = shopinsight_db::connect_pool_from_config(&config).await?;
            history::run_stats(&pool).await?;
        }
        Some(Commands::Db { command }) => {
            let pool = shopinsight_db::connect_pool_from_config(&config).await?;
            match command {
                DbCommands::Ping => {
                    shopinsight_db::health_check(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = shopinsight_db::run_migrations(&pool).await?;
                    tracing::info!(applied, "migrations applied");
                    println!("applied {applied} migration(s)");
                }
            }
        }
        None => Cli::command().print_help()?,
    }

    Ok(())
}

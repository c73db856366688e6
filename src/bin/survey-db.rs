use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use survey_backend::config::Config;
use survey_backend::database::pool::{create_pool, run_migrations};

#[derive(Parser)]
#[command(name = "survey-db", version, about = "Database chores for the survey backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect, run `SELECT version()` and print the result
    CheckConnection,
    /// Apply pending migrations
    Migrate,
    /// Drop all survey tables and recreate them from migrations
    Reset {
        /// Confirm that every stored response should be deleted
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = Config::from_env().context("loading configuration")?;
    let pool = create_pool(&config.database)
        .await
        .context("connecting to database")?;

    match cli.command {
        Command::CheckConnection => {
            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(&pool)
                .await?;
            println!("Connected: {}", version);
        }
        Command::Migrate => {
            run_migrations(&pool).await?;
            println!("Migrations applied");
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("refusing to reset without --yes");
            }
            let mut tx = pool.begin().await?;
            for table in ["answers", "responses", "_sqlx_migrations"] {
                sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;
            tracing::warn!("Survey tables dropped");
            run_migrations(&pool).await?;
            println!("Database reset");
        }
    }

    pool.close().await;
    Ok(())
}

//! Operator utility that opens a new season.
//!
//! Creates one ledger row per known entry for the target season. Re-running
//! it for the same season creates nothing new. Votes on the running season
//! keep flowing while it works.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use season_elo::config::EngineConfig;
use season_elo::domain::{RolloverPolicy, Season};
use season_elo::persistence::{LedgerStore, PostgresStore};

/// Open a rating season.
#[derive(Debug, Parser)]
#[command(name = "open-season", version, about)]
struct Args {
    /// Season number to open (at least 1).
    #[arg(long)]
    season: i32,

    /// Start each entry at its previous-season rating instead of 1500.
    #[arg(long)]
    carry_forward: bool,

    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    anyhow::ensure!(
        args.season >= Season::FIRST.number(),
        "season must be at least 1, got {}",
        args.season
    );
    let season = Season::new(args.season);
    let policy = if args.carry_forward {
        RolloverPolicy::CarryForward
    } else {
        RolloverPolicy::Reset
    };

    let mut config = EngineConfig::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    let store = PostgresStore::connect(&config).await?;
    store.migrate().await?;

    tracing::info!(%season, %policy, "opening season");
    let created = store.open_season(season, policy).await?;
    tracing::info!(%season, created, "season ready");

    Ok(())
}

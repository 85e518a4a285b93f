use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filmoteca::{seed, Config, Console, EntityStore, Exporter, Session};

fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the menu on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filmoteca=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::parse();
    info!("Starting filmoteca {}", filmoteca::VERSION);

    // The only fatal failure: no store, no menu
    let mut store = EntityStore::open(&config.database)
        .with_context(|| format!("Failed to open store at {}", config.database.display()))?;

    let report = seed(&mut store, &config).context("Failed to load startup data")?;
    println!(
        "✓ Loaded {} movies, {} reviews, {} cinema listings",
        report.movies, report.reviews, report.listings
    );

    let exporter = Exporter::new(&config.export_dir);
    info!("Exports go to {}", exporter.dir().display());

    let console = Console::new(io::stdin().lock(), io::stdout());
    let session = Session::new(store, console, exporter);
    session.run().context("Console failure")?;

    info!("Session closed");
    Ok(())
}

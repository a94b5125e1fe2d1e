#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from corrupt data.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::path::Path;

use rdflite::config::StoreConfig;
use rdflite::storage::{StoreError, TripleStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rdflite=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut dump = false;
    let mut files = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--dump" {
            dump = true;
        } else {
            files.push(arg);
        }
    }

    // Load configuration from environment variables
    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: location={}, keyword_search={}, fresh={}, reasoning={}",
        config
            .location
            .as_deref()
            .map_or_else(|| ":memory:".into(), Path::to_string_lossy),
        config.keyword_search,
        config.fresh,
        config.reasoning
    );

    if let Err(e) = run(&config, &files, dump) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(config: &StoreConfig, files: &[String], dump: bool) -> Result<(), StoreError> {
    let mut store = TripleStore::open(config)?;
    for file in files {
        let read = store.load(Path::new(file), None)?;
        tracing::info!("Loaded {read} triples from {file}");
    }
    tracing::info!("Store holds {} triples", store.size()?);

    if dump {
        for line in store.dump()? {
            println!("{line}");
        }
    }
    Ok(())
}

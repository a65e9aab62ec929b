use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use popcorn::app::{App, AppEvent};
use popcorn::catalog::OmdbClient;
use popcorn::config::Config;
use popcorn::search::SearchDebouncer;
use popcorn::storage::{Database, DatabaseError};
use popcorn::ui;
use popcorn::watched::WatchedStore;

/// Get the config directory path (~/.config/popcorn/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("popcorn"))
}

#[derive(Parser, Debug)]
#[command(name = "popcorn", about = "Search movies and keep track of what you watched")]
struct Args {
    /// Config file (default: ~/.config/popcorn/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Database file (default: ~/.config/popcorn/popcorn.db)
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Forget the stored watched list before starting
    #[arg(long)]
    reset_watched: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    }

    // User-only access
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let config_dir = get_config_dir()?;
    ensure_config_dir(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;

    let db_path = args.db.clone().unwrap_or_else(|| config_dir.join("popcorn.db"));
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!("Error: {}", DatabaseError::InstanceLocked);
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    let store = WatchedStore::new(Arc::new(db.clone()));
    if args.reset_watched {
        store
            .clear()
            .await
            .context("Failed to reset the watched list")?;
        println!("Watched list reset.");
    }
    let watched = store.load().await;

    let catalog = OmdbClient::new(&config.catalog_config()).context("Failed to create catalog client")?;
    let search = SearchDebouncer::new(config.debounce(), config.min_query_length);

    let mut app = App::new(Arc::new(catalog), store, watched, search);
    for warning in app.keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    let result = ui::run(&mut app, event_tx, event_rx).await;

    drop(app);
    db.close().await;
    result?;

    println!("Goodbye!");
    Ok(())
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use webfilmz_api::{AppState, RestApi};
use webfilmz_similarity::{EngineConfig, Ranker, SimilarityEngine, DEFAULT_HOWMANY, DEFAULT_RATING_LIMIT};
use webfilmz_storage::StorageManager;

/// Movie recommendations from user ratings
#[derive(Parser, Debug)]
#[command(name = "webfilmz")]
#[command(about = "Item-to-item movie recommendations", long_about = None)]
struct Args {
    /// Path to the data directory
    #[arg(short, long, default_value = "./data", global = true)]
    data_dir: PathBuf,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// HTTP API port
        #[arg(long, default_value_t = 8337)]
        http_port: u16,

        /// Directory holding movies.dat and user_ratedmovies.dat
        #[arg(long, default_value = "./data")]
        dataset_dir: PathBuf,

        /// Ratings read per similarity run (0 reads all)
        #[arg(long, default_value_t = DEFAULT_RATING_LIMIT)]
        rating_limit: usize,
    },
    /// Import movies.dat and user_ratedmovies.dat
    Import {
        #[arg(long)]
        dataset_dir: PathBuf,
    },
    /// Recompute every movie-to-movie similarity
    BuildComparison {
        /// Ratings read per run (0 reads all)
        #[arg(long, default_value_t = DEFAULT_RATING_LIMIT)]
        rating_limit: usize,

        /// Correlate on a single thread
        #[arg(long)]
        no_parallel: bool,
    },
    /// Print recommendations for a user
    Recommend {
        #[arg(long)]
        user: u64,

        #[arg(long, default_value_t = DEFAULT_HOWMANY)]
        limit: usize,
    },
}

fn engine_config(rating_limit: usize, parallel: bool) -> EngineConfig {
    EngineConfig {
        rating_limit: (rating_limit > 0).then_some(rating_limit),
        parallel,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting webfilmz v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let storage = Arc::new(StorageManager::open(&args.data_dir)?);
    info!("Storage initialized");

    match args.command {
        Command::Serve { http_port, dataset_dir, rating_limit } => {
            let state = AppState {
                storage,
                engine: SimilarityEngine::new(engine_config(rating_limit, true)),
                ranker: Ranker::default(),
                dataset_dir,
            };

            let http_handle = std::thread::spawn(move || {
                info!("Starting HTTP server on port {}", http_port);
                let sys = actix_web::rt::System::new();
                sys.block_on(async {
                    if let Err(e) = RestApi::start(state, http_port).await {
                        tracing::error!("HTTP server error: {}", e);
                    }
                })
            });
            info!("HTTP API: http://localhost:{}/", http_port);

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                }
                _ = tokio::task::spawn_blocking(move || {
                    http_handle.join().ok();
                }) => {
                    info!("HTTP server stopped");
                }
            }
            info!("Shutting down...");
        }
        Command::Import { dataset_dir } => {
            let report = storage.import(&dataset_dir)?;
            info!(movies = report.movies, ratings = report.ratings, "Import complete");
        }
        Command::BuildComparison { rating_limit, no_parallel } => {
            let engine = SimilarityEngine::new(engine_config(rating_limit, !no_parallel));
            let report = tokio::task::spawn_blocking(move || engine.run(storage.store())).await??;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Recommend { user, limit } => {
            let rankings = Ranker::new(limit).recommend(storage.store(), user)?;
            println!("{}", serde_json::to_string_pretty(&rankings)?);
        }
    }

    Ok(())
}

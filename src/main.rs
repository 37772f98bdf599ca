use clap::{Args, Parser, Subcommand};
use simrec_api::{GatewayApi, GatewayState, RestApi};
use simrec_core::{CatalogSchema, Engine, EngineConfig, LookupPolicy, TokenizerDialect};
use simrec_runtime::{EngineManager, EngineSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// A content-based recommender over tagged items
#[derive(Parser, Debug)]
#[command(name = "simrec")]
#[command(about = "Content-based recommendations from item tags", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, global = true, default_value = "info", env = "SIMREC_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the recommender service
    Serve {
        #[command(flatten)]
        engine: EngineArgs,

        /// HTTP API port
        #[arg(long, default_value_t = 5001, env = "SIMREC_HTTP_PORT")]
        http_port: u16,
    },
    /// Run the user-facing gateway in front of a recommender service
    Gateway {
        /// Base URL of the recommender service
        #[arg(long, default_value = "http://127.0.0.1:5001", env = "SIMREC_UPSTREAM")]
        upstream: String,

        /// HTTP API port
        #[arg(long, default_value_t = 5002, env = "SIMREC_GATEWAY_PORT")]
        http_port: u16,

        /// Upstream request timeout in milliseconds
        #[arg(long, default_value_t = 5000, env = "SIMREC_UPSTREAM_TIMEOUT_MS")]
        timeout_ms: u64,
    },
    /// Print recommendations for one title and exit
    Recommend {
        #[command(flatten)]
        engine: EngineArgs,

        /// Title to find similar items for
        title: String,

        /// Number of recommendations (defaults to --default-top-n)
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Print JSON instead of a ranked list
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Path to the catalog CSV
    #[arg(short, long, default_value = "movies.csv", env = "SIMREC_CATALOG")]
    catalog: PathBuf,

    /// Tag tokenization: whitespace (lowercased) or delimited (case kept)
    #[arg(long, default_value = "whitespace", env = "SIMREC_DIALECT")]
    dialect: TokenizerDialect,

    /// Title matching: exact or case-insensitive
    #[arg(long, default_value = "exact", env = "SIMREC_LOOKUP")]
    lookup: LookupPolicy,

    /// Keep English stopwords in the vocabulary
    #[arg(long, env = "SIMREC_NO_STOPWORDS")]
    no_stopwords: bool,

    /// Recommendations returned when a request does not ask for a count
    #[arg(long, default_value_t = 5, env = "SIMREC_DEFAULT_TOP_N")]
    default_top_n: usize,

    /// Separator between tags in the catalog
    #[arg(long, default_value_t = '|')]
    tag_delimiter: char,

    /// Catalog id column
    #[arg(long, default_value = "id")]
    id_column: String,

    /// Catalog title column
    #[arg(long, default_value = "title")]
    title_column: String,

    /// Catalog tags column
    #[arg(long, default_value = "tags")]
    tags_column: String,
}

impl EngineArgs {
    fn config(&self) -> EngineConfig {
        EngineConfig {
            dialect: self.dialect,
            stopwords: !self.no_stopwords,
            lookup: self.lookup,
            default_top_n: self.default_top_n,
            tag_delimiter: self.tag_delimiter,
        }
    }

    fn schema(&self) -> CatalogSchema {
        CatalogSchema {
            id_column: self.id_column.clone(),
            title_column: self.title_column.clone(),
            tags_column: self.tags_column.clone(),
        }
    }

    fn source(&self) -> anyhow::Result<EngineSource> {
        let config = self.config();
        config.validate()?;
        Ok(EngineSource::new(&self.catalog, config).with_schema(self.schema()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
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

    match cli.command {
        Command::Serve { engine, http_port } => serve(engine, http_port).await,
        Command::Gateway { upstream, http_port, timeout_ms } => {
            gateway(upstream, http_port, Duration::from_millis(timeout_ms)).await
        }
        Command::Recommend { engine, title, top_n, json } => recommend(engine, &title, top_n, json),
    }
}

async fn serve(args: EngineArgs, http_port: u16) -> anyhow::Result<()> {
    info!("Starting simrec recommender v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);
    info!("HTTP API port: {}", http_port);

    let manager = Arc::new(EngineManager::new(args.source()?));
    let build = manager.spawn_build()?;

    // Requests that arrive before the build finishes get 503
    let manager_http = manager.clone();
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(manager_http, http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    match tokio::task::spawn_blocking(move || build.join()).await? {
        Ok(Ok(())) => info!("Recommender ready: http://localhost:{}/", http_port),
        Ok(Err(e)) => {
            error!("Engine initialization failed: {}", e);
            return Err(e.into());
        }
        Err(_) => anyhow::bail!("engine build thread panicked"),
    }

    #[cfg(unix)]
    {
        let reload_manager = manager.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            let mut hangup = match signal(SignalKind::hangup()) {
                Ok(hangup) => hangup,
                Err(e) => {
                    warn!("SIGHUP reload unavailable: {}", e);
                    return;
                }
            };
            while hangup.recv().await.is_some() {
                let manager = reload_manager.clone();
                match tokio::task::spawn_blocking(move || manager.reload()).await {
                    Ok(Ok(())) => info!("Engine reloaded"),
                    Ok(Err(e)) => warn!("Engine reload failed: {}", e),
                    Err(e) => warn!("Engine reload task failed: {}", e),
                }
            }
        });
    }

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
    Ok(())
}

async fn gateway(upstream: String, http_port: u16, timeout: Duration) -> anyhow::Result<()> {
    info!("Starting simrec gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("Upstream recommender: {} (timeout {:?})", upstream, timeout);

    let state = GatewayState::new(&upstream, timeout)?;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = GatewayApi::start(state, http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("Gateway: http://localhost:{}/", http_port);

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
    Ok(())
}

fn recommend(args: EngineArgs, title: &str, top_n: Option<usize>, json: bool) -> anyhow::Result<()> {
    let config = args.config();
    let engine = Engine::load(&args.catalog, &args.schema(), config)?;
    let result = engine.recommend(title, top_n.unwrap_or(engine.config().default_top_n))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Recommendations for '{}':", result.query);
    for (rank, rec) in result.items.iter().enumerate() {
        println!("{}. {} (similarity: {})", rank + 1, rec.title, rec.score);
    }
    println!("Total items in catalog: {}", engine.len());
    Ok(())
}

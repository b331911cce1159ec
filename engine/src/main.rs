// Aftercare post-discharge assistant
// Main entry point for the aftercare binary

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use aftercare_engine::cli::{Cli, Command};
use aftercare_engine::config::Config;
use aftercare_engine::llm::gemini::GeminiProvider;
use aftercare_engine::llm::LLMProvider;
use aftercare_engine::records::RecordStore;
use aftercare_engine::reference::ReferenceClient;
use aftercare_engine::router::ConversationRouter;
use aftercare_engine::search::SearchClient;
use aftercare_engine::server::{self, AppState};
use aftercare_engine::session::{spawn_sweeper, InMemorySessionStore, SessionStore};
use aftercare_engine::{secrets, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize basic telemetry first (before config is loaded)
    telemetry::init_telemetry();

    tracing::info!("Aftercare v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (or use custom path if provided)
    let mut config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // Re-initialize telemetry with the CLI or config-driven log level
    // (only takes effect if RUST_LOG env var is not set)
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    telemetry::init_telemetry_with_level(log_level);

    match cli.command {
        Command::Serve { listen } => {
            if let Some(listen) = listen {
                config.server.listen = listen;
            }
            run_serve(config).await
        }
        Command::Doctor => run_doctor(&config).await,
    }
}

/// Wire up the components and run the HTTP service.
async fn run_serve(config: Config) -> anyhow::Result<()> {
    let api_key = secrets::gemini_api_key()?;

    let records = Arc::new(RecordStore::load(&config.core.records_path));
    if records.record_count() == 0 {
        tracing::warn!(
            "No discharge records loaded from {:?}; running degraded, all lookups will miss",
            config.core.records_path
        );
    }

    let llm = Arc::new(GeminiProvider::new(config.llm.gemini.clone(), api_key));
    let reference = Arc::new(ReferenceClient::new(&config.reference));
    let search = Arc::new(SearchClient::new(&config.search));

    let router = Arc::new(ConversationRouter::new(llm, records, reference, search));

    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(
        Duration::from_secs(config.session.ttl_secs),
    ));
    spawn_sweeper(
        Arc::clone(&sessions),
        Duration::from_secs(config.session.sweep_interval_secs),
    );

    server::serve(&config.server, AppState { router, sessions }).await?;
    Ok(())
}

/// Print startup diagnostics without serving.
async fn run_doctor(config: &Config) -> anyhow::Result<()> {
    println!("Aftercare doctor");
    println!("  listen address:  {}", config.server.listen);
    println!("  gemini model:    {}", config.llm.gemini.model);

    match secrets::gemini_api_key() {
        Ok(api_key) => {
            println!("  api key:         present ({})", secrets::GEMINI_API_KEY_VAR);
            let llm = GeminiProvider::new(config.llm.gemini.clone(), api_key);
            let health = if llm.check_health().await { "ok" } else { "not ok" };
            println!("  provider health: {} ({})", health, llm.name());
        }
        Err(_) => println!("  api key:         MISSING ({})", secrets::GEMINI_API_KEY_VAR),
    }

    let records = RecordStore::load(&config.core.records_path);
    println!(
        "  records file:    {:?} ({} record(s))",
        config.core.records_path,
        records.record_count()
    );

    match &config.reference.base_url {
        Some(url) => println!("  reference index: {}", url),
        None => println!("  reference index: not configured (web search fallback only)"),
    }
    println!("  search backend:  {}", config.search.base_url);
    println!(
        "  session ttl:     {}s (sweep every {}s)",
        config.session.ttl_secs, config.session.sweep_interval_secs
    );

    Ok(())
}

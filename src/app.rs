use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use crate::application::use_cases::action_interpreter::ActionInterpreter;
use crate::application::use_cases::csv_processor::CsvProcessor;
use crate::application::use_cases::table_search::SearchCache;
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::llm_clients::{LLMClient, RouterClient};
use crate::interfaces::http::{add_log, start_server, HttpState};

/// Load configuration and serve the HTTP API until shutdown
pub async fn run() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = AppConfig::load()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        output_dir = ?config.output_dir,
        "Configuration loaded"
    );

    let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(RouterClient::new());
    let logs = Arc::new(Mutex::new(Vec::new()));
    add_log(&logs, "INFO", "App", "CSV toolbox starting");

    let state = HttpState {
        processor: CsvProcessor::new(config.output_dir.clone()),
        search_cache: Arc::new(SearchCache::new(config.search_cache_capacity)),
        interpreter: ActionInterpreter::new(Arc::clone(&llm_client)),
        llm_client,
        logs,
        config,
    };

    start_server(state)?.await?;
    tracing::info!("HTTP API stopped");
    Ok(())
}

use crate::application::use_cases::action_interpreter::{ActionInterpreter, ResultSummary};
use crate::application::use_cases::csv_processor::CsvProcessor;
use crate::application::use_cases::table_search::{
    apply_action, export_results, paginate, search_rows, SearchCache,
};
use crate::domain::consolidation::ConsolidationOptions;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::table_action::{SearchResult, TableAction};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::llm_clients::LLMClient;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const MAX_LOG_ENTRIES: usize = 100;

const EXPORT_FILE_NAME: &str = "exported_data.csv";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub config: AppConfig,
    pub processor: CsvProcessor,
    pub search_cache: Arc<SearchCache>,
    pub interpreter: ActionInterpreter,
    pub llm_client: Arc<dyn LLMClient + Send + Sync>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Deserialize)]
pub struct HeadersRequest {
    pub file_path: PathBuf,
}

#[derive(Deserialize)]
pub struct ConsolidateRequest {
    pub file_path: PathBuf,
    pub options: ConsolidationOptions,
}

#[derive(Deserialize)]
pub struct PreviewRequest {
    pub content: String,
    pub options: ConsolidationOptions,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub groups: usize,
    pub key_fields: Vec<String>,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub file_path: PathBuf,
    pub search_text: String,
    #[serde(default)]
    pub search_column: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub search_column: String,
    pub columns: Vec<String>,
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub rows: Vec<SearchResult>,
    pub results: Vec<SearchResult>,
}

#[derive(Deserialize)]
pub struct ManipulateRequest {
    pub results: Vec<SearchResult>,
    pub action: serde_json::Value,
}

#[derive(Deserialize)]
pub struct ExportRequest {
    pub results: Vec<SearchResult>,
    /// Preferred column order, usually the searched file's headers
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Deserialize)]
pub struct InterpretRequest {
    #[serde(default)]
    pub config: Option<LLMConfig>,
    pub summary: ResultSummary,
    pub query: String,
}

#[post("/csv/headers")]
async fn csv_headers(data: web::Data<HttpState>, req: web::Json<HeadersRequest>) -> impl Responder {
    let req = req.into_inner();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Reading headers: {}", req.file_path.display()),
    );

    let processor = data.processor.clone();
    match run_blocking(move || processor.read_headers(&req.file_path)).await {
        Ok(preview) => HttpResponse::Ok().json(preview),
        Err(e) => error_response(&data.logs, "Reading headers failed", e),
    }
}

#[post("/csv/consolidate")]
async fn csv_consolidate(
    data: web::Data<HttpState>,
    req: web::Json<ConsolidateRequest>,
) -> impl Responder {
    let req = req.into_inner();
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!(
            "Consolidating {} (content={} layout={})",
            req.file_path.display(),
            req.options.content_mode,
            req.options.layout_mode
        ),
    );

    let processor = data.processor.clone();
    match run_blocking(move || processor.process_file(&req.file_path, &req.options)).await {
        Ok(report) => {
            add_log(
                &data.logs,
                "INFO",
                "HttpApi",
                &format!(
                    "Wrote {} rows to {}",
                    report.output_rows,
                    report.output_path.display()
                ),
            );
            HttpResponse::Ok().json(report)
        }
        Err(e) => error_response(&data.logs, "Consolidation failed", e),
    }
}

#[post("/csv/preview")]
async fn csv_preview(data: web::Data<HttpState>, req: web::Json<PreviewRequest>) -> impl Responder {
    let req = req.into_inner();
    let processor = data.processor.clone();

    match run_blocking(move || processor.process_content(&req.content, &req.options)).await {
        Ok(table) => HttpResponse::Ok().json(PreviewResponse {
            rows: table.records(),
            headers: table.headers,
            groups: table.groups,
            key_fields: table.key_fields,
        }),
        Err(e) => error_response(&data.logs, "Preview failed", e),
    }
}

#[post("/csv/search")]
async fn csv_search(data: web::Data<HttpState>, req: web::Json<SearchRequest>) -> impl Responder {
    let req = req.into_inner();
    let search_column = req
        .search_column
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| data.config.default_search_column.clone());
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!(
            "Searching '{}' in column '{}' of {}",
            req.search_text,
            search_column,
            req.file_path.display()
        ),
    );

    let cache = Arc::clone(&data.search_cache);
    let path = req.file_path.clone();
    let table = match run_blocking(move || cache.get_or_load(&path)).await {
        Ok(table) => table,
        Err(e) => return error_response(&data.logs, "Search failed", e),
    };

    let results = match search_rows(&table, &req.search_text, &search_column) {
        Ok(results) => results,
        Err(e) => return error_response(&data.logs, "Search failed", e),
    };
    let page = paginate(&results, req.page.unwrap_or(1), data.config.rows_per_page);

    HttpResponse::Ok().json(SearchResponse {
        search_column,
        columns: table.headers.clone(),
        page: page.page,
        total_pages: page.total_pages,
        total_rows: page.total_rows,
        rows: page.rows,
        results,
    })
}

#[post("/csv/manipulate")]
async fn csv_manipulate(
    data: web::Data<HttpState>,
    req: web::Json<ManipulateRequest>,
) -> impl Responder {
    let req = req.into_inner();
    let action = match serde_json::from_value::<TableAction>(req.action) {
        Ok(action) => action,
        Err(e) => {
            return error_response(
                &data.logs,
                "Manipulation rejected",
                AppError::ValidationError(format!("Unsupported table action: {}", e)),
            )
        }
    };

    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!("Applying {} to {} rows", action.name(), req.results.len()),
    );
    HttpResponse::Ok().json(apply_action(req.results, &action))
}

#[post("/csv/export")]
async fn csv_export(data: web::Data<HttpState>, req: web::Json<ExportRequest>) -> impl Responder {
    match export_results(&req.results, &req.columns) {
        Ok(csv) => {
            add_log(
                &data.logs,
                "INFO",
                "HttpApi",
                &format!("Exported {} rows", req.results.len()),
            );
            HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
                ))
                .body(csv)
        }
        Err(e) => error_response(&data.logs, "Export failed", e),
    }
}

#[post("/csv/interpret")]
async fn csv_interpret(
    data: web::Data<HttpState>,
    req: web::Json<InterpretRequest>,
) -> impl Responder {
    let req = req.into_inner();
    let config = req.config.unwrap_or_else(|| data.config.llm.clone());
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!(
            "Interpreting query (provider={:?} model={})",
            config.provider, config.model
        ),
    );

    match data
        .interpreter
        .interpret(&config, &req.summary, &req.query)
        .await
    {
        Ok(interpretation) => HttpResponse::Ok().json(interpretation),
        Err(e) => error_response(&data.logs, "Interpretation failed", e),
    }
}

#[post("/llm/models")]
async fn list_models(data: web::Data<HttpState>, config: web::Json<LLMConfig>) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "HttpApi",
        &format!(
            "Fetching models (provider={:?} base_url={})",
            config.provider, config.base_url
        ),
    );

    match data.llm_client.list_models(&config).await {
        Ok(models) => HttpResponse::Ok().json(models),
        Err(e) => error_response(&data.logs, "Failed to list models", e),
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap_or_else(|p| p.into_inner());
    HttpResponse::Ok().json(&*logs)
}

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(task)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}

fn error_response(logs: &Mutex<Vec<LogEntry>>, context: &str, err: AppError) -> HttpResponse {
    add_log(logs, "ERROR", "HttpApi", &format!("{}: {}", context, err));
    if err.is_client_error() {
        tracing::warn!(error = %err, "{}", context);
        HttpResponse::BadRequest().body(err.to_string())
    } else {
        tracing::error!(error = %err, "{}", context);
        HttpResponse::InternalServerError().body(err.to_string())
    }
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap_or_else(|p| p.into_inner());
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(csv_headers)
            .service(csv_consolidate)
            .service(csv_preview)
            .service(csv_search)
            .service(csv_manipulate)
            .service(csv_export)
            .service(csv_interpret)
            .service(list_models)
            .service(get_logs),
    );
}

pub fn start_server(state: HttpState) -> std::io::Result<Server> {
    let address = state.config.bind_address();
    let state = web::Data::new(state);

    tracing::info!(host = %address.0, port = address.1, "Starting HTTP API");

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(address)?
    .run();

    Ok(server)
}

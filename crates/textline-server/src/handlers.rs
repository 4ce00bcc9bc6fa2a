//! HTTP request handlers for the log-access API.
//!
//! Every handler mints a correlation id, records the access in the log store,
//! and returns JSON errors tagged with that id.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use textline_auth::{extract_token_credentials, verify_admin_key, IssuedToken, X_TIMESTAMP_HEADER};
use textline_logs::{
    iso_millis, parse_hours, parse_limit, render_html, render_text, LevelCounts, LevelFilter,
    LogData, LogEntry, LogQuery, OutputFormat, QueryResult, QueryStats, TimeSpan,
};
use textline_observe::{analyze, format_for_agent, summarize, AgentInstructions, AgentLogEntry, Diagnosis};
use tracing::debug;
use uuid::Uuid;

use crate::config::ConfigReport;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// State handle passed to every handler.
pub type SharedState = Arc<AppState>;

/// `/logs` limits.
const LOGS_DEFAULT_LIMIT: usize = 100;
const LOGS_MAX_LIMIT: usize = 1000;

/// `/agent-logs` limits.
const AGENT_DEFAULT_LIMIT: usize = 50;
const AGENT_MAX_LIMIT: usize = 200;

/// `/application-logs` limits.
const APPLICATION_DEFAULT_LIMIT: usize = 100;
const APPLICATION_MAX_LIMIT: usize = 500;
const APPLICATION_DEFAULT_HOURS: u32 = 24;

/// Query parameters for `/logs`.
#[derive(Debug, Default, Deserialize)]
pub struct LogsParams {
    /// Access token.
    pub token: Option<String>,
    /// Token timestamp in Unix milliseconds.
    pub timestamp: Option<String>,
    /// Level filter.
    pub level: Option<String>,
    /// Maximum entries.
    pub limit: Option<String>,
    /// `json`, `text` or `html`.
    pub format: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
    /// Correlation id.
    #[serde(rename = "requestId")]
    pub request_id: Option<String>,
}

/// Query parameters for `/log-token`.
#[derive(Debug, Default, Deserialize)]
pub struct TokenParams {
    /// Admin key.
    pub admin_key: Option<String>,
}

/// Query parameters for `/agent-logs`.
#[derive(Debug, Default, Deserialize)]
pub struct AgentLogsParams {
    /// Admin key.
    pub admin_key: Option<String>,
    /// Level filter, ERROR when absent.
    pub level: Option<String>,
    /// Maximum entries.
    pub limit: Option<String>,
    /// `text`, `json`, `html` or `summary`.
    pub format: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
}

/// Query parameters for `/application-logs`.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationLogsParams {
    /// Level filter.
    pub level: Option<String>,
    /// Maximum entries.
    pub limit: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
    /// Time window in hours.
    pub hours: Option<String>,
}

fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn client_ip(headers: &HeaderMap) -> String {
    header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map_or_else(|| "unknown".to_string(), |ip| ip.trim().to_string())
}

fn fields<const N: usize>(pairs: [(&str, Value); N]) -> LogData {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Builds parameters from a query string, keeping the first value of a
/// repeated key.
fn first_values<T: DeserializeOwned + Default>(pairs: Vec<(String, String)>) -> T {
    let mut map = serde_json::Map::new();
    for (key, value) in pairs {
        map.entry(key).or_insert(Value::String(value));
    }
    serde_json::from_value(Value::Object(map)).unwrap_or_default()
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> ApiResult<Response> {
    let body = serde_json::to_string_pretty(body)?;
    Ok((status, [(CONTENT_TYPE, "application/json")], body).into_response())
}

fn document_response(format: OutputFormat, body: String) -> Response {
    ([(CONTENT_TYPE, format.content_type())], body).into_response()
}

fn authorize_admin(
    state: &AppState,
    provided: Option<&str>,
    ip: &str,
    request_id: &str,
    message: &str,
) -> ApiResult<()> {
    let expected = state.admin_key();
    verify_admin_key(expected.as_deref(), provided).map_err(|err| {
        state.store().warn(
            message,
            fields([
                ("providedKey", if provided.is_some() { "provided" } else { "missing" }.into()),
                ("ip", ip.into()),
            ]),
            Some(request_id),
        );
        ApiError::from(err)
    })
}

/// Metadata attached to `/logs` JSON responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LogsMeta<'a> {
    total: usize,
    level: &'static str,
    limit: usize,
    counts: LevelCounts,
    time_range: &'a TimeSpan,
    timestamp: String,
    request_id: &'a str,
}

#[derive(Debug, Serialize)]
struct LogsResponse<'a> {
    success: bool,
    logs: &'a [LogEntry],
    meta: LogsMeta<'a>,
}

/// Handle GET /logs - token-protected log retrieval.
pub async fn get_logs(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let request_id = new_request_id();
    let params: LogsParams = first_values(pairs);
    serve_logs(&state, &headers, &params, &request_id)
        .unwrap_or_else(|err| state.fail(err, &request_id, "Error retrieving logs"))
}

fn serve_logs(
    state: &AppState,
    headers: &HeaderMap,
    params: &LogsParams,
    request_id: &str,
) -> ApiResult<Response> {
    let store = state.store();
    let ip = client_ip(headers);
    let authorization = header_str(headers, AUTHORIZATION.as_str());
    let x_timestamp = header_str(headers, X_TIMESTAMP_HEADER);

    let credentials = extract_token_credentials(
        params.token.as_deref(),
        params.timestamp.as_deref(),
        authorization,
        x_timestamp,
    )
    .map_err(|err| {
        store.warn(
            "Unauthorized log access attempt - missing credentials",
            fields([
                ("hasToken", (params.token.is_some() || authorization.is_some()).into()),
                ("hasTimestamp", (params.timestamp.is_some() || x_timestamp.is_some()).into()),
                ("ip", ip.clone().into()),
            ]),
            Some(request_id),
        );
        ApiError::from(err)
    })?;

    // An unset secret verifies nothing.
    let verified = state
        .token_service()
        .is_some_and(|service| service.authenticate(credentials.token, credentials.timestamp).is_ok());
    if !verified {
        store.warn(
            "Unauthorized log access attempt - invalid credentials",
            fields([("ip", ip.into()), ("timestamp", credentials.timestamp.into())]),
            Some(request_id),
        );
        return Err(ApiError::InvalidAuthentication);
    }

    let level = LevelFilter::parse(params.level.as_deref());
    let limit = parse_limit(params.limit.as_deref(), LOGS_DEFAULT_LIMIT, LOGS_MAX_LIMIT);
    let format = OutputFormat::parse_or(params.format.as_deref(), OutputFormat::Json);

    store.info(
        "Authorized log access",
        fields([
            ("level", level.as_str().into()),
            ("limit", limit.into()),
            ("search", params.search.clone().into()),
            ("requestIdFilter", params.request_id.clone().into()),
            ("ip", ip.into()),
        ]),
        Some(request_id),
    );

    let mut query = LogQuery::new().with_level(level).with_limit(limit);
    if let Some(search) = &params.search {
        query = query.with_search(search.as_str());
    }
    if let Some(filter) = &params.request_id {
        query = query.with_request_id(filter.as_str());
    }
    let result = query.execute(store);

    match format {
        OutputFormat::Html => Ok(document_response(format, render_html(&result, Utc::now()))),
        OutputFormat::Text => Ok(document_response(format, render_text(&result))),
        OutputFormat::Json | OutputFormat::Summary => json_response(
            StatusCode::OK,
            &LogsResponse {
                success: true,
                logs: &result.entries,
                meta: LogsMeta {
                    total: result.stats.total,
                    level: level.as_str(),
                    limit,
                    counts: result.stats.counts,
                    time_range: &result.stats.time_range,
                    timestamp: iso_millis::format(&Utc::now()),
                    request_id,
                },
            },
        ),
    }
}

/// Links to `/logs` pre-filled with an issued token.
#[derive(Debug, Serialize)]
struct TokenUrls {
    json: String,
    html: String,
    text: String,
}

#[derive(Debug, Serialize)]
struct UsageParameters {
    level: &'static str,
    limit: &'static str,
    format: &'static str,
    search: &'static str,
    #[serde(rename = "requestId")]
    request_id: &'static str,
}

#[derive(Debug, Serialize)]
struct TokenUsage {
    parameters: UsageParameters,
    examples: [String; 3],
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    success: bool,
    #[serde(flatten)]
    issued: IssuedToken,
    urls: TokenUrls,
    usage: TokenUsage,
}

/// Handle GET /log-token - exchange the admin key for a time-boxed token.
pub async fn get_log_token(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let request_id = new_request_id();
    let params: TokenParams = first_values(pairs);
    issue_token(&state, &headers, &params, &request_id)
        .unwrap_or_else(|err| state.fail(err, &request_id, "Error issuing log token"))
}

fn issue_token(
    state: &AppState,
    headers: &HeaderMap,
    params: &TokenParams,
    request_id: &str,
) -> ApiResult<Response> {
    let ip = client_ip(headers);
    authorize_admin(
        state,
        params.admin_key.as_deref(),
        &ip,
        request_id,
        "Unauthorized log token request",
    )?;

    let service = state
        .token_service()
        .ok_or(textline_auth::Error::SecretNotConfigured)?;
    let issued = service.issue_now()?;

    let scheme = header_str(headers, "x-forwarded-proto").unwrap_or("http");
    let host = header_str(headers, HOST.as_str()).unwrap_or("localhost");
    let base = format!(
        "{scheme}://{host}/logs?token={}&timestamp={}",
        issued.token, issued.timestamp
    );

    state.store().info(
        "Log token issued",
        fields([
            ("expiresAt", iso_millis::format(&issued.expires_at).into()),
            ("ip", ip.into()),
        ]),
        Some(request_id),
    );

    json_response(
        StatusCode::OK,
        &TokenResponse {
            success: true,
            urls: TokenUrls {
                json: base.clone(),
                html: format!("{base}&format=html"),
                text: format!("{base}&format=text"),
            },
            usage: TokenUsage {
                parameters: UsageParameters {
                    level: "Filter by log level (ERROR, WARN, INFO, DEBUG)",
                    limit: "Limit number of entries (max 1000)",
                    format: "Response format (json, html, text)",
                    search: "Search in log messages and data",
                    request_id: "Filter by specific request ID",
                },
                examples: [
                    format!("{base}&level=ERROR"),
                    format!("{base}&format=html&limit=50"),
                    format!("{base}&search=SMS&format=text"),
                ],
            },
            issued,
        },
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentMeta<'a> {
    total: usize,
    level: &'static str,
    limit: usize,
    search: Option<&'a str>,
    timestamp: String,
    agent_access: bool,
    request_id: &'a str,
}

#[derive(Debug, Serialize)]
struct AgentLogsResponse<'a> {
    success: bool,
    logs: &'a [LogEntry],
    meta: AgentMeta<'a>,
}

/// Handle GET /agent-logs - admin-key gated retrieval in one step.
pub async fn get_agent_logs(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let request_id = new_request_id();
    let params: AgentLogsParams = first_values(pairs);
    serve_agent_logs(&state, &headers, &params, &request_id)
        .unwrap_or_else(|err| state.fail(err, &request_id, "Error in agent log access"))
}

fn serve_agent_logs(
    state: &AppState,
    headers: &HeaderMap,
    params: &AgentLogsParams,
    request_id: &str,
) -> ApiResult<Response> {
    let ip = client_ip(headers);
    authorize_admin(
        state,
        params.admin_key.as_deref(),
        &ip,
        request_id,
        "Unauthorized agent log access attempt",
    )?;

    let level = LevelFilter::parse(Some(params.level.as_deref().unwrap_or("ERROR")));
    let limit = parse_limit(params.limit.as_deref(), AGENT_DEFAULT_LIMIT, AGENT_MAX_LIMIT);
    let format = OutputFormat::parse_or(params.format.as_deref(), OutputFormat::Text);

    state.store().info(
        "Agent log access granted",
        fields([
            ("level", level.as_str().into()),
            ("limit", limit.into()),
            ("search", params.search.clone().into()),
            ("ip", ip.into()),
        ]),
        Some(request_id),
    );

    let mut query = LogQuery::new().with_level(level).with_limit(limit);
    if let Some(search) = &params.search {
        query = query.with_search(search.as_str());
    }
    let result = query.execute(state.store());

    match format {
        OutputFormat::Text => Ok(document_response(format, render_text(&result))),
        OutputFormat::Html => Ok(document_response(format, render_html(&result, Utc::now()))),
        OutputFormat::Summary => json_response(StatusCode::OK, &summarize(&result.entries, limit)),
        OutputFormat::Json => json_response(
            StatusCode::OK,
            &AgentLogsResponse {
                success: true,
                logs: &result.entries,
                meta: AgentMeta {
                    total: result.stats.total,
                    level: level.as_str(),
                    limit,
                    search: params.search.as_deref(),
                    timestamp: iso_millis::format(&Utc::now()),
                    agent_access: true,
                    request_id,
                },
            },
        ),
    }
}

#[derive(Debug, Serialize)]
struct ApplicationQuery<'a> {
    level: &'static str,
    limit: usize,
    search: Option<&'a str>,
    hours: u32,
}

#[derive(Debug, Serialize)]
struct ApplicationMeta<'a> {
    timestamp: String,
    query: ApplicationQuery<'a>,
    stats: &'a QueryStats,
}

#[derive(Debug, Serialize)]
struct ApplicationLogsResponse<'a> {
    meta: ApplicationMeta<'a>,
    analysis: &'a Diagnosis,
    logs: Vec<AgentLogEntry>,
    #[serde(rename = "instructions_for_llm")]
    instructions: AgentInstructions,
}

/// Handle GET /application-logs - public diagnosis for automated readers.
pub async fn get_application_logs(
    State(state): State<SharedState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let request_id = new_request_id();
    let params: ApplicationLogsParams = first_values(pairs);
    serve_application_logs(&state, &params, &request_id)
        .unwrap_or_else(|err| state.fail(err, &request_id, "Error serving application logs"))
}

fn serve_application_logs(
    state: &AppState,
    params: &ApplicationLogsParams,
    request_id: &str,
) -> ApiResult<Response> {
    let level = LevelFilter::parse(params.level.as_deref());
    let limit = parse_limit(
        params.limit.as_deref(),
        APPLICATION_DEFAULT_LIMIT,
        APPLICATION_MAX_LIMIT,
    );
    let hours = parse_hours(params.hours.as_deref(), APPLICATION_DEFAULT_HOURS);
    let search = params.search.as_deref().filter(|s| !s.is_empty());

    let mut query = LogQuery::new()
        .with_level(level)
        .with_limit(limit)
        .with_hours_window(hours);
    if let Some(search) = search {
        query = query.with_search(search);
    }
    let result: QueryResult = query.execute(state.store());
    let diagnosis = analyze(&result.entries);

    debug!(
        request_id,
        total = result.stats.total,
        status = %diagnosis.health_status,
        "serving application logs"
    );
    state.store().debug(
        "Application logs served",
        fields([
            ("total", result.stats.total.into()),
            ("healthStatus", diagnosis.health_status.as_str().into()),
        ]),
        Some(request_id),
    );

    json_response(
        StatusCode::OK,
        &ApplicationLogsResponse {
            meta: ApplicationMeta {
                timestamp: iso_millis::format(&Utc::now()),
                query: ApplicationQuery {
                    level: level.as_str(),
                    limit,
                    search,
                    hours,
                },
                stats: &result.stats,
            },
            analysis: &diagnosis,
            logs: result.entries.iter().map(format_for_agent).collect(),
            instructions: AgentInstructions::from_diagnosis(&diagnosis),
        },
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    uptime_secs: u64,
    timestamp: i64,
    environment: String,
    platform: String,
    region: String,
    twilio_configured: bool,
    config_summary: String,
    log_entries: usize,
    log_capacity: usize,
}

/// Handle GET /health - configuration-derived health.
pub async fn health_check(State(state): State<SharedState>) -> Response {
    let request_id = new_request_id();
    let validation = state.provider().validate();
    let env = state.provider().environment();
    let status = if validation.is_valid {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let body = HealthResponse {
        status: if validation.is_valid { "HEALTHY" } else { "MISCONFIGURED" },
        message: if validation.is_valid { "OK" } else { "CONFIGURATION_ERROR" },
        uptime_secs: state.uptime_secs(),
        timestamp: Utc::now().timestamp_millis(),
        environment: env.environment,
        platform: env.platform,
        region: env.region,
        twilio_configured: validation.twilio_configured,
        config_summary: validation.summary,
        log_entries: state.store().len(),
        log_capacity: state.store().capacity(),
    };
    json_response(status, &body).unwrap_or_else(|err| state.fail(err, &request_id, "Error in health check"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiagnosticsResponse<'a> {
    #[serde(flatten)]
    report: &'a ConfigReport,
    timestamp: String,
    request_id: &'a str,
}

/// Handle GET /diagnostics - full configuration report.
pub async fn get_diagnostics(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let request_id = new_request_id();
    let store = state.store();
    store.info(
        "Diagnostics endpoint accessed",
        fields([("ip", client_ip(&headers).into())]),
        Some(&request_id),
    );

    let report = state.provider().report();
    store.info(
        "Diagnostics completed",
        fields([
            ("status", serde_json::to_value(report.status).unwrap_or(Value::Null)),
            ("missingVars", report.validation.missing.len().into()),
            ("isValid", report.validation.is_valid.into()),
        ]),
        Some(&request_id),
    );

    let status = if report.validation.is_valid {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    json_response(
        status,
        &DiagnosticsResponse {
            report: &report,
            timestamp: iso_millis::format(&Utc::now()),
            request_id: &request_id,
        },
    )
    .unwrap_or_else(|err| state.fail(err, &request_id, "Error in diagnostics"))
}

/// Handle OPTIONS on any endpoint - empty preflight response.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Handle any other verb.
pub async fn method_not_allowed() -> Response {
    ApiError::MethodNotAllowed.into_response_with_id(&new_request_id())
}

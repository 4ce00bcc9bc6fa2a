//! Route configuration for the log-access API.

use axum::http::Method;
use axum::routing::{get, MethodRouter, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    get_agent_logs, get_application_logs, get_diagnostics, get_log_token, get_logs, health_check,
    method_not_allowed, preflight, SharedState,
};

/// Create the log-access router.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/logs", endpoint(get(get_logs)))
        .route("/log-token", endpoint(get(get_log_token)))
        .route("/agent-logs", endpoint(get(get_agent_logs)))
        .route("/application-logs", endpoint(get(get_application_logs)))
        .route("/health", endpoint(get(health_check)))
        .route("/diagnostics", endpoint(get(get_diagnostics)))
        .with_state(state)
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Adds the preflight and wrong-verb handlers to a GET route.
fn endpoint(route: MethodRouter<SharedState>) -> MethodRouter<SharedState> {
    route.options(preflight).fallback(method_not_allowed)
}

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use textline_logs::{LogData, LogLevel, LogStore};
    use tower::ServiceExt;

    use crate::config::{ServerConfig, StaticConfig, ADMIN_KEY_VAR, LOG_SECRET_VAR};
    use crate::state::AppState;

    const ADMIN: &str = "test-admin-key";
    const SECRET: &str = "test-log-secret";

    fn full_config() -> StaticConfig {
        StaticConfig::new()
            .with("TWILIO_ACCOUNT_SID", "AC123")
            .with("TWILIO_AUTH_TOKEN", "tok")
            .with("TWILIO_PHONE_NUMBER", "+15550000000")
            .with(ADMIN_KEY_VAR, ADMIN)
            .with(LOG_SECRET_VAR, SECRET)
    }

    fn make_state(provider: StaticConfig) -> SharedState {
        Arc::new(AppState::new(
            Arc::new(LogStore::new(1000)),
            Arc::new(provider),
            ServerConfig::default(),
        ))
    }

    fn seeded_state() -> SharedState {
        let state = make_state(full_config());
        let store = state.store();
        store.info("SMS sent", LogData::new(), Some("req-a"));
        let mut data = LogData::new();
        data.insert("code".to_string(), json!(21211));
        store.error("Twilio error 21211", data, Some("req-b"));
        store.error("Missing required fields: to", LogData::new(), Some("req-c"));
        store.warn("Slow provider response", LogData::new(), Some("req-a"));
        state
    }

    fn fresh_token() -> (String, String) {
        let timestamp = Utc::now().timestamp_millis().to_string();
        let token = textline_auth::issue(SECRET.as_bytes(), &timestamp).expect("token");
        (token, timestamp)
    }

    async fn send(state: SharedState, method: Method, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        create_router(state).oneshot(request).await.expect("response")
    }

    async fn get_uri(state: SharedState, uri: &str) -> Response<Body> {
        send(state, Method::GET, uri).await
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        serde_json::from_slice(&bytes).expect("json")
    }

    fn content_type(response: &Response<Body>) -> String {
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn logs_without_credentials_is_401() {
        let state = seeded_state();
        let response = get_uri(state.clone(), "/logs").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Authentication required");
        assert_eq!(json["help"], "Include token and timestamp parameters");
        let request_id = json["requestId"].as_str().expect("request id");

        let recorded = state.store().query_by_correlation(request_id);
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].level, LogLevel::Warn);
    }

    #[tokio::test]
    async fn logs_with_bad_token_is_403() {
        let state = seeded_state();
        let (_, timestamp) = fresh_token();
        let uri = format!("/logs?token={}&timestamp={timestamp}", "0".repeat(64));
        let response = get_uri(state, &uri).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["error"], "Invalid authentication");
    }

    #[tokio::test]
    async fn logs_with_expired_token_is_403() {
        let state = seeded_state();
        let timestamp = (Utc::now().timestamp_millis() - 2 * 60 * 60 * 1000).to_string();
        let token = textline_auth::issue(SECRET.as_bytes(), &timestamp).expect("token");
        let response = get_uri(state, &format!("/logs?token={token}&timestamp={timestamp}")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn logs_with_valid_token_returns_json() {
        let state = seeded_state();
        let (token, timestamp) = fresh_token();
        let uri = format!("/logs?token={token}&timestamp={timestamp}&level=error");
        let response = get_uri(state, &uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").map(|v| v.as_bytes()),
            Some(&b"*"[..])
        );

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["meta"]["level"], "ERROR");
        assert_eq!(json["meta"]["total"], 2);
        assert_eq!(json["meta"]["counts"]["error"], 2);
        let logs = json["logs"].as_array().expect("logs");
        assert_eq!(logs[0]["message"], "Missing required fields: to");
        assert_eq!(logs[1]["requestId"], "req-b");
    }

    #[tokio::test]
    async fn logs_accepts_header_credentials() {
        let state = seeded_state();
        let (token, timestamp) = fresh_token();
        let request = Request::builder()
            .uri("/logs?format=text&search=twilio&level=error")
            .header("authorization", format!("Bearer {token}"))
            .header("x-timestamp", timestamp)
            .body(Body::empty())
            .expect("request");
        let response = create_router(state).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(content_type(&response).starts_with("text/plain"));

        let text = body_text(response).await;
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("[ERROR] Twilio error 21211 {\"code\":21211}"));
    }

    #[tokio::test]
    async fn logs_by_request_id() {
        let state = seeded_state();
        let (token, timestamp) = fresh_token();
        let uri = format!("/logs?token={token}&timestamp={timestamp}&requestId=req-a");
        let json = body_json(get_uri(state, &uri).await).await;
        let logs = json["logs"].as_array().expect("logs");
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0]["message"], "Slow provider response");
        assert_eq!(logs[1]["message"], "SMS sent");
    }

    #[tokio::test]
    async fn logs_html_escapes_untrusted_text() {
        let state = seeded_state();
        state
            .store()
            .info("<script>alert(1)</script>", LogData::new(), None);
        let (token, timestamp) = fresh_token();
        let uri = format!("/logs?token={token}&timestamp={timestamp}&format=html");
        let response = get_uri(state, &uri).await;
        assert!(content_type(&response).starts_with("text/html"));
        let html = body_text(response).await;
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[tokio::test]
    async fn logs_without_configured_secret_is_403() {
        let state = make_state(StaticConfig::new().with(ADMIN_KEY_VAR, ADMIN));
        let (token, timestamp) = fresh_token();
        let response = get_uri(state, &format!("/logs?token={token}&timestamp={timestamp}")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn log_token_requires_admin_key() {
        let state = seeded_state();
        let response = get_uri(state.clone(), "/log-token").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = get_uri(state, "/log-token?admin_key=wrong").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["help"], "Include admin_key parameter with valid key");
    }

    #[tokio::test]
    async fn log_token_issues_verifiable_token() {
        let state = seeded_state();
        let request = Request::builder()
            .uri(format!("/log-token?admin_key={ADMIN}"))
            .header("host", "logs.example.com")
            .body(Body::empty())
            .expect("request");
        let response = create_router(state.clone()).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        let token = json["token"].as_str().expect("token");
        let timestamp = json["timestamp"].as_str().expect("timestamp");
        assert!(json["expiresAt"].is_string());
        assert!(textline_auth::verify(token, SECRET.as_bytes(), timestamp, 60));
        assert!(json["urls"]["html"]
            .as_str()
            .is_some_and(|u| u.starts_with("http://logs.example.com/logs?token=") && u.ends_with("&format=html")));
        assert_eq!(json["usage"]["examples"].as_array().map(Vec::len), Some(3));

        let uri = format!("/logs?token={token}&timestamp={timestamp}");
        assert_eq!(get_uri(state, &uri).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn log_token_without_secret_is_500_and_recorded() {
        let state = make_state(StaticConfig::new().with(ADMIN_KEY_VAR, ADMIN));
        let response = get_uri(state.clone(), &format!("/log-token?admin_key={ADMIN}")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Internal server error");
        let request_id = json["requestId"].as_str().expect("request id");
        let recorded = state.store().query_by_correlation(request_id);
        assert!(recorded.iter().any(|e| e.level == LogLevel::Error));
    }

    #[tokio::test]
    async fn log_token_post_is_405() {
        let response = send(seeded_state(), Method::POST, "/log-token").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn options_is_empty_200() {
        for uri in ["/logs", "/log-token", "/agent-logs", "/application-logs"] {
            let response = send(seeded_state(), Method::OPTIONS, uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().contains_key("access-control-allow-origin"));
            assert!(body_text(response).await.is_empty());
        }
    }

    #[tokio::test]
    async fn agent_logs_defaults_to_error_text() {
        let state = seeded_state();
        let response = get_uri(state, &format!("/agent-logs?admin_key={ADMIN}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(content_type(&response).starts_with("text/plain"));

        let text = body_text(response).await;
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.contains("[ERROR]")));
    }

    #[tokio::test]
    async fn agent_logs_summary() {
        let state = seeded_state();
        let uri = format!("/agent-logs?admin_key={ADMIN}&format=summary");
        let json = body_json(get_uri(state, &uri).await).await;
        assert_eq!(json["status"], "ISSUES_FOUND");
        assert_eq!(json["errorCount"], 2);
        assert_eq!(json["commonIssues"]["missingFields"], 1);
        assert_eq!(json["commonIssues"]["twilioApi"], 1);
        assert_eq!(json["recentErrors"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn agent_logs_rejects_bad_key_and_records_attempt() {
        let state = seeded_state();
        let before = state.store().len();
        let response = get_uri(state.clone(), "/agent-logs?admin_key=nope").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(state.store().len(), before + 1);
    }

    #[tokio::test]
    async fn agent_logs_without_configured_key_is_401() {
        let state = make_state(StaticConfig::new().with(LOG_SECRET_VAR, SECRET));
        let response = get_uri(state, "/agent-logs?admin_key=").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn application_logs_is_public_and_analysed() {
        let state = seeded_state();
        let response = get_uri(state, "/application-logs").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["meta"]["query"]["level"], "ALL");
        assert_eq!(json["meta"]["query"]["hours"], 24);
        assert_eq!(json["meta"]["stats"]["total"], 4);
        assert_eq!(json["analysis"]["healthStatus"], "ERRORS_DETECTED");
        assert_eq!(json["analysis"]["patterns"]["missingFields"], 1);
        assert_eq!(json["analysis"]["patterns"]["twilioApi"], 1);
        assert_eq!(
            json["analysis"]["specificIssues"],
            json!([
                "Required fields missing in API requests",
                "Twilio API errors or authentication issues"
            ])
        );
        assert_eq!(json["logs"][0]["request_id"], "req-a");
        assert!(json["instructions_for_llm"]["fix_suggestions"].is_array());
    }

    #[tokio::test]
    async fn application_logs_clamps_limit() {
        let state = make_state(full_config());
        for i in 0..600 {
            state.store().debug(format!("tick {i}"), LogData::new(), None);
        }
        let json = body_json(get_uri(state, "/application-logs?limit=9999&level=debug").await).await;
        assert_eq!(json["meta"]["query"]["limit"], 500);
        assert_eq!(json["logs"].as_array().map(Vec::len), Some(500));
    }

    #[tokio::test]
    async fn application_logs_accepts_huge_hours() {
        let state = seeded_state();
        let response = get_uri(state, "/application-logs?hours=99999999999").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["meta"]["query"]["hours"], u32::MAX);
        assert_eq!(json["meta"]["stats"]["total"], 4);
    }

    #[tokio::test]
    async fn repeated_parameters_use_first_value() {
        let state = seeded_state();
        let response = get_uri(state.clone(), "/application-logs?level=ERROR&level=WARN").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["meta"]["query"]["level"], "ERROR");
        assert_eq!(json["meta"]["stats"]["total"], 2);

        let uri = format!("/agent-logs?admin_key={ADMIN}&admin_key=wrong&format=json&format=text");
        let response = get_uri(state.clone(), &uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["meta"]["agentAccess"], true);

        let response = get_uri(state.clone(), "/logs?token=a&token=b").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        let request_id = json["requestId"].as_str().expect("request id");
        assert_eq!(state.store().query_by_correlation(request_id).len(), 1);
    }

    #[tokio::test]
    async fn limit_with_trailing_text_is_read_leniently() {
        let state = seeded_state();
        let json = body_json(get_uri(state, "/application-logs?limit=2abc").await).await;
        assert_eq!(json["meta"]["query"]["limit"], 2);
        assert_eq!(json["logs"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn health_reflects_configuration() {
        let response = get_uri(seeded_state(), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "HEALTHY");

        let response = get_uri(make_state(StaticConfig::new()), "/health").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["status"], "MISCONFIGURED");
        assert_eq!(json["twilioConfigured"], false);
    }

    #[tokio::test]
    async fn diagnostics_reports_without_leaking_secrets() {
        let response = get_uri(seeded_state(), "/diagnostics").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "CONFIGURED");
        assert_eq!(json["logging"]["adminKey"], "SET");
        assert!(json["requestId"].is_string());
        assert!(!json.to_string().contains(SECRET));

        let response = get_uri(make_state(StaticConfig::new()), "/diagnostics").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["validation"]["missing"].as_array().map(Vec::len), Some(3));
    }
}

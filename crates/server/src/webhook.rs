use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use stenbot_telegram::dispatch::DispatchBridge;
use stenbot_telegram::events::{decode_update, Update};

#[derive(Clone)]
pub struct AppState {
    pub bridge: DispatchBridge,
    pub webhook_token: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_workers: usize,
    pub checked_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook/{token}", post(webhook))
        .with_state(state)
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        active_workers: state.bridge.active_workers().await,
        checked_at: Utc::now().to_rfc3339(),
    };
    (StatusCode::OK, Json(payload))
}

/// Telegram webhook entry point. Always returns 200 once the token checks
/// out; a non-200 would make Telegram redeliver the same update forever.
/// The body is parsed by hand so even unparseable JSON is acknowledged.
pub async fn webhook(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Bytes,
) -> StatusCode {
    if token != state.webhook_token {
        warn!(event_name = "ingress.webhook.bad_token", "webhook call with unknown token");
        return StatusCode::NOT_FOUND;
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(error) => {
            warn!(
                event_name = "ingress.webhook.malformed_update",
                error = %error,
                "discarding update that does not match the Bot API shape"
            );
            return StatusCode::OK;
        }
    };
    let update_id = update.update_id;

    match decode_update(&update) {
        Ok(Some(event)) => {
            info!(
                event_name = "ingress.webhook.update_received",
                update_id,
                conversation_id = %event.conversation_id,
                "dispatching update"
            );
            state.bridge.dispatch(event).await;
        }
        Ok(None) => {
            info!(
                event_name = "ingress.webhook.update_skipped",
                update_id,
                "update carries no dialogue event"
            );
        }
        Err(error) => {
            warn!(
                event_name = "ingress.webhook.update_rejected",
                update_id,
                error = %error,
                "discarding undecodable update"
            );
        }
    }

    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use stenbot_core::calc::ReservePolicy;
    use stenbot_core::catalog::Catalog;
    use stenbot_core::dialogue::DialogueEngine;
    use stenbot_telegram::dispatch::{DispatchBridge, DispatchTuning};
    use stenbot_telegram::outbound::NoopSender;

    use super::{router, AppState};

    fn state() -> AppState {
        let engine = DialogueEngine::new(Catalog::builtin(), ReservePolicy::default());
        let bridge =
            DispatchBridge::new(engine, std::sync::Arc::new(NoopSender), DispatchTuning::default());
        AppState { bridge, webhook_token: "123:token".to_owned() }
    }

    fn webhook_request(token: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/webhook/{token}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_reports_ready_with_worker_count() {
        let response = router(state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(payload["status"], "ready");
        assert_eq!(payload["active_workers"], 0);
    }

    #[tokio::test]
    async fn webhook_acknowledges_valid_updates() {
        let body = serde_json::json!({
            "update_id": 1,
            "message": { "chat": { "id": 42 }, "text": "/start" }
        });

        let response =
            router(state()).oneshot(webhook_request("123:token", body)).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn webhook_acknowledges_undecodable_updates() {
        // Telegram must not redeliver updates the bot cannot consume.
        let body = serde_json::json!({ "update_id": 2, "edited_message": { "noise": true } });

        let response =
            router(state()).oneshot(webhook_request("123:token", body)).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn webhook_acknowledges_syntactically_broken_bodies() {
        let request = Request::builder()
            .method("POST")
            .uri("/webhook/123:token")
            .header("content-type", "application/json")
            .body(Body::from("{not valid json"))
            .expect("request");

        let response = router(state()).oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn webhook_rejects_unknown_tokens() {
        let body = serde_json::json!({ "update_id": 3 });

        let response =
            router(state()).oneshot(webhook_request("999:wrong", body)).await.expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

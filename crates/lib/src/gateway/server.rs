//! Gateway HTTP server: liveness probe and the LINE webhook callback.

use crate::channels::{LineClient, ReplyClient};
use crate::config::{self, Config, Credentials};
use crate::llm::{CompletionClient, GeminiClient};
use crate::webhook::{Dispatcher, MessageHandler, WebhookError, SIGNATURE_HEADER};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Body of `GET /index`. Kept as-is so existing probes keep matching.
pub const INDEX_BODY: &str = "Hello Flask";

/// Application context shared by all requests: the dispatcher and its clients.
/// Built once at startup and never mutated.
#[derive(Clone)]
pub struct GatewayState {
    pub dispatcher: Arc<Dispatcher>,
}

impl GatewayState {
    /// Wire a dispatcher around the given clients.
    pub fn new(
        channel_secret: String,
        completion: Arc<dyn CompletionClient>,
        reply: Arc<dyn ReplyClient>,
    ) -> Self {
        let handler = MessageHandler::new(completion, reply);
        Self {
            dispatcher: Arc::new(Dispatcher::new(channel_secret, handler)),
        }
    }

    /// Build the production context: Gemini for completions, LINE for replies.
    pub fn from_config(config: Config, credentials: Credentials) -> Self {
        let model = config::resolve_gemini_model(&config);
        let gemini = GeminiClient::new(credentials.gemini_api_key, model, config.gemini.api_base);
        log::info!("gemini model: {}", gemini.model());
        let line = LineClient::new(credentials.channel_access_token, config.line.api_base);
        Self::new(
            credentials.channel_secret,
            Arc::new(gemini),
            Arc::new(line),
        )
    }
}

/// Routes: `GET /index` and `POST /callback`.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/index", get(index))
        .route("/callback", post(callback))
        .with_state(state)
}

/// Resolve credentials, bind, and serve until SIGINT/SIGTERM. Missing credentials fail before binding.
pub async fn run_gateway(config: Config) -> Result<()> {
    let credentials = Credentials::resolve(&config)?;
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let state = GatewayState::from_config(config, credentials);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining in-flight requests");
}

/// GET /index — liveness probe.
async fn index() -> &'static str {
    INDEX_BODY
}

/// POST /callback — LINE webhook. A missing X-Line-Signature header is treated as an invalid signature.
async fn callback(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    match state.dispatcher.dispatch(&body, signature).await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(e) => webhook_error_response(e),
    }
}

fn webhook_error_response(err: WebhookError) -> Response {
    let status = err.status_code();
    match &err {
        WebhookError::Auth => log::warn!("callback: rejected delivery with invalid signature"),
        WebhookError::Parse(e) => log::warn!("callback: malformed payload: {}", e),
        WebhookError::Downstream(e) => log::error!("callback: downstream failure: {}", e),
    }
    (status, status.canonical_reason().unwrap_or("error")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::OutboundMessage;
    use crate::webhook::sign;
    use crate::webhook::testing::{FakeCompletion, FakeReply, ReplyCall};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const SECRET: &str = "gateway-test-secret";

    fn app(completion: Arc<FakeCompletion>, reply: Arc<FakeReply>) -> Router {
        router(GatewayState::new(
            SECRET.to_string(),
            completion,
            reply,
        ))
    }

    fn text_payload(token: &str, text: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "destination": "Ubot",
            "events": [{
                "type": "message",
                "source": { "type": "user", "userId": "U1" },
                "replyToken": token,
                "message": { "id": "1", "type": "text", "text": text }
            }]
        }))
        .unwrap()
    }

    fn callback_request(body: Vec<u8>, signature: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().method("POST").uri("/callback");
        if let Some(sig) = signature {
            req = req.header(SIGNATURE_HEADER, sig);
        }
        req.body(Body::from(body)).unwrap()
    }

    async fn body_string(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn from_config_builds_routable_state() {
        let credentials = Credentials {
            channel_access_token: "tok".to_string(),
            channel_secret: SECRET.to_string(),
            gemini_api_key: "key".to_string(),
        };
        let app = router(GatewayState::from_config(Config::default(), credentials));
        let res = app
            .oneshot(Request::builder().uri("/index").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn index_says_hello() {
        let app = app(
            Arc::new(FakeCompletion::answering("x")),
            Arc::new(FakeReply::default()),
        );
        let res = app
            .oneshot(Request::builder().uri("/index").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "Hello Flask");
    }

    #[tokio::test]
    async fn callback_replies_and_returns_ok() {
        let completion = Arc::new(FakeCompletion::answering("Hi there"));
        let reply = Arc::new(FakeReply::default());
        let body = text_payload("T1", "Hello");
        let sig = sign(&body, SECRET);

        let res = app(completion.clone(), reply.clone())
            .oneshot(callback_request(body, Some(&sig)))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "OK");
        assert_eq!(completion.prompts(), vec!["Hello".to_string()]);
        assert!(reply.calls().contains(&ReplyCall::Reply {
            token: "T1".to_string(),
            messages: vec![OutboundMessage::text("Hi there")]
        }));
    }

    #[tokio::test]
    async fn callback_rejects_bad_or_missing_signature() {
        let completion = Arc::new(FakeCompletion::answering("unused"));
        let reply = Arc::new(FakeReply::default());
        let app = app(completion.clone(), reply.clone());
        let body = text_payload("T1", "Hello");
        let wrong = sign(&body, "not-the-secret");

        let res = app
            .clone()
            .oneshot(callback_request(body.clone(), Some(&wrong)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = app.oneshot(callback_request(body, None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        assert!(completion.prompts().is_empty());
        assert!(reply.calls().is_empty());
    }

    #[tokio::test]
    async fn callback_malformed_payload_is_bad_request() {
        let body = b"not json".to_vec();
        let sig = sign(&body, SECRET);
        let res = app(
            Arc::new(FakeCompletion::answering("x")),
            Arc::new(FakeReply::default()),
        )
        .oneshot(callback_request(body, Some(&sig)))
        .await
        .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn callback_downstream_failure_is_server_error() {
        let reply = Arc::new(FakeReply::default());
        let body = text_payload("T1", "Hello");
        let sig = sign(&body, SECRET);

        let res = app(Arc::new(FakeCompletion::failing()), reply.clone())
            .oneshot(callback_request(body, Some(&sig)))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(reply.replies().is_empty());
    }

    #[tokio::test]
    async fn callback_reply_failure_is_server_error() {
        let body = text_payload("T1", "Hello");
        let sig = sign(&body, SECRET);

        let res = app(
            Arc::new(FakeCompletion::answering("generated")),
            Arc::new(FakeReply::failing_reply()),
        )
        .oneshot(callback_request(body, Some(&sig)))
        .await
        .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn callback_requires_post() {
        let res = app(
            Arc::new(FakeCompletion::answering("x")),
            Arc::new(FakeReply::default()),
        )
        .oneshot(Request::builder().uri("/callback").body(Body::empty()).unwrap())
        .await
        .unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}

//! HTTP Service
//!
//! Exposes the questionnaire and chat surface over axum:
//! - `GET /questions` - fixed question set (static, no state)
//! - `POST /submit` - questionnaire submission, one intake completion
//! - `POST /chat` - one retrieval-augmented chat turn
//! - `GET /health` - liveness plus readiness flag
//!
//! Shared resources live in an `AppContext` built once at startup and guarded
//! by an explicit readiness state machine (Loading -> Ready | Failed); every
//! stateful handler answers 503 until the context is ready.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AppConfig;
use crate::core::chain::RetrievalChain;
use crate::core::directory::TherapistRecord;
use crate::core::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::core::prompts;
use crate::core::questionnaire;

/// Speaker labels used in client-visible chat history.
pub const BOT_SPEAKER: &str = "AntarVaani";
pub const USER_SPEAKER: &str = "User";

// ============================================================================
// Application State
// ============================================================================

/// Startup lifecycle of the shared resources.
pub enum Readiness {
    Loading,
    Ready(Arc<AppContext>),
    Failed(String),
}

/// Process-wide resources: constructed once at startup, read-only afterward.
pub struct AppContext {
    pub therapists: Vec<TherapistRecord>,
    /// Pre-rendered directory block for the intake prompt.
    pub therapist_info: String,
    pub llm: Arc<dyn LlmProvider>,
    pub chain: RetrievalChain,
}

#[derive(Clone)]
pub struct AppState {
    readiness: Arc<RwLock<Readiness>>,
}

impl AppState {
    /// State for a service whose resources are still loading.
    pub fn new() -> Self {
        Self {
            readiness: Arc::new(RwLock::new(Readiness::Loading)),
        }
    }

    /// State wrapping an already-built context.
    pub fn ready(context: Arc<AppContext>) -> Self {
        Self {
            readiness: Arc::new(RwLock::new(Readiness::Ready(context))),
        }
    }

    pub async fn set_ready(&self, context: Arc<AppContext>) {
        *self.readiness.write().await = Readiness::Ready(context);
    }

    pub async fn set_failed(&self, message: String) {
        *self.readiness.write().await = Readiness::Failed(message);
    }

    pub async fn is_ready(&self) -> bool {
        matches!(&*self.readiness.read().await, Readiness::Ready(_))
    }

    /// The context, or the 503 response a handler should return instead.
    async fn context(&self) -> std::result::Result<Arc<AppContext>, Response> {
        match &*self.readiness.read().await {
            Readiness::Ready(context) => Ok(context.clone()),
            Readiness::Loading => Err(error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "resources still loading",
                "service_unavailable",
            )),
            Readiness::Failed(message) => Err(error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                &format!("startup failed: {message}"),
                "service_unavailable",
            )),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct QuestionnaireRequest {
    pub answers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionnaireResponse {
    pub initial_message: String,
    pub chat_history: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    pub user_input: String,
    #[serde(default)]
    pub history: Vec<(String, String)>,
    /// Accepted for wire compatibility with existing clients; not used.
    #[serde(default)]
    pub initial_msg: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatTurnResponse {
    pub chat_history: Vec<(String, String)>,
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/questions", get(get_questions))
        .route("/submit", post(submit_questionnaire))
        .route("/chat", post(chat_with_bot))
        .route("/health", get(health_check))
        .layer(cors_layer(&config.server.allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.is_ready().await;
    Json(serde_json::json!({ "status": "ok", "ready": ready }))
}

/// Fixed question set, in enumeration order.
async fn get_questions() -> impl IntoResponse {
    Json(questionnaire::questions_response())
}

/// Questionnaire submission: zip answers against the question order, run one
/// intake completion over the therapist directory.
async fn submit_questionnaire(
    State(state): State<AppState>,
    Json(request): Json<QuestionnaireRequest>,
) -> Response {
    let context = match state.context().await {
        Ok(context) => context,
        Err(response) => return response,
    };

    let pairs = match questionnaire::zip_answers(&request.answers) {
        Ok(pairs) => pairs,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &e.to_string(), "invalid_request_error");
        }
    };

    let responses = questionnaire::responses_block(&pairs);
    let prompt = prompts::render_intake_prompt(&responses, &context.therapist_info);

    match context
        .llm
        .chat(ChatRequest::new(vec![ChatMessage::user(prompt)]))
        .await
    {
        Ok(response) => {
            let initial_message = response.content;
            Json(QuestionnaireResponse {
                initial_message: initial_message.clone(),
                chat_history: vec![(BOT_SPEAKER.to_string(), initial_message)],
            })
            .into_response()
        }
        Err(e) => {
            log::error!("Intake completion failed: {e}");
            error_response(StatusCode::BAD_GATEWAY, &e.to_string(), "upstream_error")
        }
    }
}

/// One chat turn: append the user utterance, run the retrieval chain, append
/// the bot reply, echo the whole history back.
async fn chat_with_bot(
    State(state): State<AppState>,
    Json(request): Json<ChatTurnRequest>,
) -> Response {
    let context = match state.context().await {
        Ok(context) => context,
        Err(response) => return response,
    };

    log::debug!(
        "Chat turn: {} prior entries, initial_msg supplied: {}",
        request.history.len(),
        request.initial_msg.is_some()
    );

    let mut history = request.history;
    history.push((USER_SPEAKER.to_string(), request.user_input.clone()));

    match context.chain.ask(&request.user_input).await {
        Ok(answer) => {
            history.push((BOT_SPEAKER.to_string(), answer));
            Json(ChatTurnResponse {
                chat_history: history,
            })
            .into_response()
        }
        Err(e) => {
            log::error!("Chat completion failed: {e}");
            error_response(StatusCode::BAD_GATEWAY, &e.to_string(), "upstream_error")
        }
    }
}

fn error_response(status: StatusCode, message: &str, error_type: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": {
                "message": message,
                "type": error_type
            }
        })),
    )
        .into_response()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::core::embeddings::{EmbeddingProvider, Result as EmbeddingResult};
    use crate::core::llm::{ChatResponse, Result as LlmResult};
    use crate::core::questionnaire::QUESTIONS;
    use crate::core::store::VectorStore;

    use super::*;

    const MOCK_REPLY: &str = "Namaste! I recommend Dr. Meera Sharma. Contact: meera@example.org";

    struct ZeroEmbedder;

    #[async_trait]
    impl EmbeddingProvider for ZeroEmbedder {
        async fn embed(&self, _text: &str) -> EmbeddingResult<Vec<f32>> {
            Ok(vec![0.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "zero"
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    struct FixedLlm;

    #[async_trait]
    impl LlmProvider for FixedLlm {
        fn id(&self) -> &str {
            "mock"
        }

        fn name(&self) -> &str {
            "Mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        async fn chat(&self, _request: ChatRequest) -> LlmResult<ChatResponse> {
            Ok(ChatResponse {
                content: MOCK_REPLY.to_string(),
                model: "mock-model".to_string(),
                finish_reason: Some("stop".to_string()),
            })
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    async fn ready_context(dir: &TempDir) -> Arc<AppContext> {
        let store_path = dir.path().join("store.db");
        let store = VectorStore::build_from_chunks(&store_path, &[], &ZeroEmbedder, "test")
            .await
            .unwrap();
        let llm: Arc<dyn LlmProvider> = Arc::new(FixedLlm);
        let chain = RetrievalChain::new(store, Arc::new(ZeroEmbedder), llm.clone(), 4);

        Arc::new(AppContext {
            therapists: vec![],
            therapist_info: "Name: Dr. Meera Sharma, Specialization: Anxiety, Experience: 12 years\nContact: meera@example.org\nApproach: CBT".to_string(),
            llm,
            chain,
        })
    }

    async fn ready_app(dir: &TempDir) -> Router {
        let context = ready_context(dir).await;
        router(AppState::ready(context), &AppConfig::default())
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_questions_endpoint_preserves_order() {
        let dir = TempDir::new().unwrap();
        let app = ready_app(&dir).await;

        let response = app
            .oneshot(Request::builder().uri("/questions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Raw body text keeps the serialized key order; positions must be
        // strictly increasing in QUESTIONS order.
        let text = body_text(response).await;
        let mut last = 0;
        for question in QUESTIONS {
            let position = text.find(question.prompt).expect("question missing");
            assert!(position >= last, "question order diverged");
            last = position;
        }
    }

    #[tokio::test]
    async fn test_submit_returns_initial_message_and_history() {
        let dir = TempDir::new().unwrap();
        let app = ready_app(&dir).await;

        let answers: Vec<String> = (0..QUESTIONS.len()).map(|i| format!("answer {i}")).collect();
        let response = app
            .oneshot(json_request("/submit", json!({ "answers": answers })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["initial_message"], MOCK_REPLY);
        assert_eq!(body["chat_history"], json!([["AntarVaani", MOCK_REPLY]]));
    }

    #[tokio::test]
    async fn test_submit_rejects_answer_count_mismatch() {
        let dir = TempDir::new().unwrap();
        let app = ready_app(&dir).await;

        let response = app
            .oneshot(json_request("/submit", json!({ "answers": ["only one"] })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn test_chat_appends_exactly_two_turns() {
        let dir = TempDir::new().unwrap();
        let app = ready_app(&dir).await;

        let response = app
            .oneshot(json_request(
                "/chat",
                json!({
                    "user_input": "hello",
                    "history": [["User", "hi"]],
                    "initial_msg": "welcome"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(
            body["chat_history"],
            json!([
                ["User", "hi"],
                ["User", "hello"],
                ["AntarVaani", MOCK_REPLY]
            ])
        );
    }

    #[tokio::test]
    async fn test_chat_with_empty_history() {
        let dir = TempDir::new().unwrap();
        let app = ready_app(&dir).await;

        let response = app
            .oneshot(json_request("/chat", json!({ "user_input": "hello" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(
            body["chat_history"],
            json!([["User", "hello"], ["AntarVaani", MOCK_REPLY]])
        );
    }

    #[tokio::test]
    async fn test_stateful_routes_503_while_loading() {
        let app = router(AppState::new(), &AppConfig::default());

        let response = app
            .clone()
            .oneshot(json_request("/chat", json!({ "user_input": "hello" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "resources still loading");

        // The static question set stays available while loading.
        let response = app
            .oneshot(Request::builder().uri("/questions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_failed_startup_surfaces_in_503() {
        let state = AppState::new();
        state.set_failed("missing GROQ_API_KEY".to_string()).await;
        let app = router(state, &AppConfig::default());

        let answers: Vec<String> = (0..QUESTIONS.len()).map(|_| "x".to_string()).collect();
        let response = app
            .oneshot(json_request("/submit", json!({ "answers": answers })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("missing GROQ_API_KEY"));
    }

    #[tokio::test]
    async fn test_health_reports_readiness() {
        let state = AppState::new();
        let app = router(state.clone(), &AppConfig::default());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["ready"], false);

        let dir = TempDir::new().unwrap();
        state.set_ready(ready_context(&dir).await).await;

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["ready"], true);
    }

    #[test]
    fn test_cors_layer_accepts_wildcard_and_list() {
        // Only checks construction does not panic on odd input.
        let _ = cors_layer(&["*".to_string()]);
        let _ = cors_layer(&["http://localhost:5173".to_string(), "not a header value\u{7f}".to_string()]);
    }
}

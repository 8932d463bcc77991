//! Integration tests against an in-process fake backend.
//!
//! The fake backend speaks the same JSON as the real one (it reuses the
//! client's DTOs) and checks the Basic-auth header on every request.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use tempfile::TempDir;

use lpbd_client::{
    config::{ClientConfig, Credentials},
    domain::{
        AnonymousId, BarGateway, GatewayError, Intent, NoticeLevel, OnboardingRequest, Phase,
        Render, machine::ENTRY_MESSAGE,
    },
    infrastructure::{
        dto::http::{
            ErrorResponseDto, MessageRequestDto, MessageResponseDto, OnboardRequestDto,
            OnboardResponseDto, SessionStartRequestDto, SessionStartResponseDto,
        },
        gateway::HttpBarGateway,
        identity::FileIdentityStore,
    },
    usecase::InteractionController,
};

/// "app:secret"
const EXPECTED_AUTH: &str = "Basic YXBwOnNlY3JldA==";

/// Requests seen by the fake backend, plus knobs for its replies.
#[derive(Default)]
struct Backend {
    onboard_requests: Mutex<Vec<OnboardRequestDto>>,
    message_requests: Mutex<Vec<MessageRequestDto>>,
    /// Count reported on the next chat reply.
    message_count: Mutex<u32>,
    /// Delay before answering onboarding requests.
    onboard_delay: Mutex<Option<Duration>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == EXPECTED_AUTH)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponseDto {
            detail: Some(serde_json::Value::String("Invalid credentials".to_string())),
        }),
    )
        .into_response()
}

async fn onboard(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<OnboardRequestDto>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let delay = *backend.onboard_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let opening = body.message.is_none();
    backend.onboard_requests.lock().unwrap().push(body);
    let response = if opening {
        OnboardResponseDto {
            message: "Why are you here?".to_string(),
            approved: false,
            continue_onboarding: true,
        }
    } else {
        OnboardResponseDto {
            message: "Fair enough. Go on in.".to_string(),
            approved: true,
            continue_onboarding: false,
        }
    };
    Json(response).into_response()
}

async fn start_session(headers: HeaderMap, Json(body): Json<SessionStartRequestDto>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(SessionStartResponseDto {
        session_id: format!("session-for-{}", body.anonymous_id),
        weather: Some("Rain against the windows".to_string()),
        available_agents: vec!["bart".to_string(), "bernie".to_string(), "jb".to_string()],
        timestamp: None,
    })
    .into_response()
}

async fn message(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<MessageRequestDto>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    backend.message_requests.lock().unwrap().push(body);
    let count = {
        let mut count = backend.message_count.lock().unwrap();
        *count += 1;
        *count
    };
    Json(MessageResponseDto {
        agent: "bart".to_string(),
        message: "What'll it be?".to_string(),
        timestamp: Some("2025-01-01T21:00:00Z".to_string()),
        agents_available: vec!["bart".to_string(), "bernie".to_string()],
        agents_muted: vec!["jb".to_string()],
        session_status: if count >= 30 { "ended" } else { "active" }.to_string(),
        message_count: count,
        message_limit: Some(30),
    })
    .into_response()
}

/// Fake backend bound to an ephemeral port
struct TestBackend {
    addr: SocketAddr,
    state: Arc<Backend>,
}

impl TestBackend {
    async fn start() -> Self {
        let state = Arc::new(Backend::default());
        let app = Router::new()
            .route("/api/onboard", post(onboard))
            .route("/session/start", post(start_session))
            .route("/message", post(message))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    fn config(&self, password: &str, identity_dir: &TempDir, timeout_secs: u64) -> ClientConfig {
        ClientConfig::new(
            &format!("http://{}", self.addr),
            Credentials {
                username: "app".to_string(),
                password: password.to_string(),
            },
            Some(identity_dir.path().join("anonymous_id")),
            timeout_secs,
        )
        .unwrap()
    }
}

fn controller(config: &ClientConfig) -> InteractionController {
    InteractionController::new(
        Arc::new(HttpBarGateway::new(config).unwrap()),
        Arc::new(FileIdentityStore::new(config.identity_file.clone())),
    )
    .unwrap()
}

fn notices(intents: &[Intent], level: NoticeLevel) -> Vec<String> {
    intents
        .iter()
        .filter_map(|i| match i {
            Intent::Notify(n) if n.level == level => Some(n.text.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_visit_from_knock_to_greeting() {
    // テスト項目: ノックから入店、挨拶までバックエンドと通信して進む
    // given (前提条件):
    let backend = TestBackend::start().await;
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&backend.config("secret", &dir, 5));

    // when (操作):
    controller.begin_onboarding().await;
    controller.submit_onboarding_reply("I need a quiet drink").await;
    let approved = controller.session().is_approved();
    controller.enter_chat().await;

    // then (期待する結果):
    assert!(approved);
    let anonymous_id = controller.session().anonymous_id.as_str().to_string();
    let onboard_requests = backend.state.onboard_requests.lock().unwrap().clone();
    assert_eq!(onboard_requests.len(), 2);
    assert_eq!(onboard_requests[0].anonymous_id, anonymous_id);
    assert_eq!(onboard_requests[0].message, None);
    assert_eq!(onboard_requests[1].message.as_deref(), Some("I need a quiet drink"));
    assert_eq!(
        onboard_requests[1].context.as_ref().map(|c| c.responses.clone()),
        Some(vec!["I need a quiet drink".to_string()])
    );

    let message_requests = backend.state.message_requests.lock().unwrap().clone();
    assert_eq!(message_requests.len(), 1);
    assert_eq!(message_requests[0].content, ENTRY_MESSAGE);
    assert_eq!(
        message_requests[0].session_id,
        format!("session-for-{}", anonymous_id)
    );
    assert!(message_requests[0].onboarding_context.is_some());

    assert!(matches!(
        controller.session().phase,
        Phase::ChatActive {
            awaiting: false,
            ..
        }
    ));
    assert_eq!(controller.session().message_count, 1);
}

#[tokio::test]
async fn test_session_ends_at_message_limit() {
    // テスト項目: メッセージ数が上限に達するとセッションが終了する
    // given (前提条件):
    let backend = TestBackend::start().await;
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&backend.config("secret", &dir, 5));
    controller.begin_onboarding().await;
    controller.submit_onboarding_reply("Just passing through").await;
    controller.enter_chat().await;
    *backend.state.message_count.lock().unwrap() = 28;

    // when (操作):
    controller.send_chat_message("One more").await;
    let last = controller.send_chat_message("And another").await;
    let after = controller.send_chat_message("Hello?").await;

    // then (期待する結果):
    assert!(matches!(controller.session().phase, Phase::ChatEnded { .. }));
    assert_eq!(controller.session().message_count, 30);
    assert!(last.contains(&Intent::Render(Render::Input { enabled: false })));
    assert_eq!(notices(&after, NoticeLevel::Warning).len(), 1);
    assert_eq!(backend.state.message_requests.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_rejected_credentials_surface_detail() {
    // テスト項目: 認証エラーの detail が通知として表示され状態は戻る
    // given (前提条件):
    let backend = TestBackend::start().await;
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&backend.config("wrong", &dir, 5));

    // when (操作):
    let intents = controller.begin_onboarding().await;

    // then (期待する結果):
    assert_eq!(
        notices(&intents, NoticeLevel::Error),
        vec!["Invalid credentials".to_string()]
    );
    assert_eq!(controller.session().phase, Phase::NotStarted);
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    // テスト項目: タイムアウトを超える応答は Timeout エラーになる
    // given (前提条件):
    let backend = TestBackend::start().await;
    *backend.state.onboard_delay.lock().unwrap() = Some(Duration::from_secs(3));
    let dir = TempDir::new().unwrap();
    let gateway = HttpBarGateway::new(&backend.config("secret", &dir, 1)).unwrap();

    // when (操作):
    let result = gateway
        .onboard(OnboardingRequest {
            anonymous_id: AnonymousId::new("visitor-1".to_string()).unwrap(),
            message: None,
            context: None,
        })
        .await;

    // then (期待する結果):
    assert_eq!(result, Err(GatewayError::Timeout));
}

#[tokio::test]
async fn test_identity_survives_restart() {
    // テスト項目: 匿名 ID は再起動後も同じで、リセットすると変わる
    // given (前提条件):
    let backend = TestBackend::start().await;
    let dir = TempDir::new().unwrap();
    let config = backend.config("secret", &dir, 5);
    let first = controller(&config).session().anonymous_id.clone();

    // when (操作):
    let mut second = controller(&config);
    let same = second.session().anonymous_id.clone();
    second.reset_client_identity().unwrap();

    // then (期待する結果):
    assert_eq!(first, same);
    assert_ne!(second.session().anonymous_id, first);
    assert_eq!(
        controller(&config).session().anonymous_id,
        second.session().anonymous_id
    );
}

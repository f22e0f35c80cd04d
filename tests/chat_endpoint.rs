//! End-to-end tests: the actix app relaying to a stub upstream bound on a local port.
#![cfg(feature = "server")]

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, http::StatusCode, test, web};
use chat_proxy::prompt::SystemPrompt;
use chat_proxy::server::configure;
use chat_proxy::{ChatMessage, ChatProxy, ChatSession, HttpChatTransport, ProxyConfig, SessionState};
use serde_json::{Value, json};
use std::sync::Mutex;

struct StubUpstream {
    status: u16,
    reply: Value,
    seen: Mutex<Vec<(Option<String>, Value)>>,
}

impl StubUpstream {
    fn new(
        status: u16,
        reply: Value,
    ) -> web::Data<Self> {
        web::Data::new(Self {
            status,
            reply,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn hi_there() -> web::Data<Self> {
        Self::new(
            200,
            json!({
                "id": "gen-1",
                "model": "openai/gpt-3.5-turbo",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "Hi there"}, "finish_reason": "stop"}
                ]
            }),
        )
    }

    fn seen(&self) -> Vec<(Option<String>, Value)> {
        self.seen.lock().unwrap().clone()
    }
}

async fn completions(
    req: HttpRequest,
    body: web::Json<Value>,
    stub: web::Data<StubUpstream>,
) -> HttpResponse {
    let auth = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.seen.lock().unwrap().push((auth, body.into_inner()));

    HttpResponse::build(StatusCode::from_u16(stub.status).unwrap()).json(stub.reply.clone())
}

/// Starts the stub and returns its base URL.
fn start_upstream(stub: web::Data<StubUpstream>) -> String {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(stub.clone())
            .route("/api/v1/chat/completions", web::post().to(completions))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{addr}/api/v1")
}

fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/v1")
}

fn proxy_for(base_url: &str) -> web::Data<ChatProxy> {
    let config = ProxyConfig::new("sk-integration").with_base_url(base_url);
    web::Data::new(ChatProxy::from_config(&config).unwrap())
}

#[actix_web::test]
async fn relays_first_choice_and_injects_system_prompt() {
    let stub = StubUpstream::hi_there();
    let base_url = start_upstream(stub.clone());
    let app = test::init_service(App::new().app_data(proxy_for(&base_url)).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({"messages": [
            {"role": "user", "content": "Hello"},
            {"role": "assistant", "content": "Hi! How can I help?"},
            {"role": "user", "content": "Tell me a joke"}
        ]}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"role": "assistant", "content": "Hi there"}));

    let seen = stub.seen();
    assert_eq!(seen.len(), 1);

    let (auth, outbound) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-integration"));
    assert_eq!(outbound["model"], "openai/gpt-3.5-turbo");

    let messages = outbound["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0], serde_json::to_value(SystemPrompt::message()).unwrap());
    assert_eq!(messages[1], json!({"role": "user", "content": "Hello"}));
    assert_eq!(messages[2], json!({"role": "assistant", "content": "Hi! How can I help?"}));
    assert_eq!(messages[3], json!({"role": "user", "content": "Tell me a joke"}));
}

#[actix_web::test]
async fn upstream_error_status_becomes_generic_500() {
    let stub = StubUpstream::new(401, json!({"error": {"message": "No auth credentials found", "code": 401}}));
    let base_url = start_upstream(stub);
    let app = test::init_service(App::new().app_data(proxy_for(&base_url)).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({"messages": [{"role": "user", "content": "Hello"}]}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Error calling OpenRouter API"}));
}

#[actix_web::test]
async fn response_without_choices_becomes_generic_500() {
    let stub = StubUpstream::new(200, json!({"id": "gen-2", "choices": []}));
    let base_url = start_upstream(stub);
    let app = test::init_service(App::new().app_data(proxy_for(&base_url)).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({"messages": [{"role": "user", "content": "Hello"}]}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn unreachable_upstream_becomes_generic_500() {
    let app = test::init_service(App::new().app_data(proxy_for(&closed_port_url())).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({"messages": [{"role": "user", "content": "Hello"}]}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Error calling OpenRouter API"}));
}

#[actix_web::test]
async fn session_round_trip_through_running_proxy() {
    let stub = StubUpstream::hi_there();
    let base_url = start_upstream(stub.clone());
    let proxy = proxy_for(&base_url);

    let server = HttpServer::new(move || App::new().app_data(proxy.clone()).configure(configure))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    let transport = HttpChatTransport::new(&format!("http://{addr}"));
    let mut session = ChatSession::new();

    session.set_input("Hello");
    assert!(session.submit(&transport).await);

    assert_eq!(
        session.messages(),
        &[ChatMessage::user("Hello"), ChatMessage::assistant("Hi there")]
    );
    assert_eq!(session.state(), &SessionState::Success(ChatMessage::assistant("Hi there")));

    // The page sends only the newest message; the proxy adds the instruction.
    let (_, outbound) = &stub.seen()[0];
    assert_eq!(outbound["messages"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn session_reports_proxy_failure() {
    let proxy = proxy_for(&closed_port_url());

    let server = HttpServer::new(move || App::new().app_data(proxy.clone()).configure(configure))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    let transport = HttpChatTransport::new(&format!("http://{addr}"));
    let mut session = ChatSession::new();

    session.set_input("Hello");
    session.submit(&transport).await;

    assert_eq!(session.messages().len(), 1);
    assert!(!session.is_pending());
    assert_eq!(
        session.last_error(),
        Some(&chat_proxy::ClientError::Server {
            status: 500,
            message: "Error calling OpenRouter API".to_string()
        })
    );
}

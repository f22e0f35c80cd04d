//! actix-web routes for the standalone server

use crate::chat::{ChatMessage, ChatRequest, ChatRole};
use crate::error::{ApiError, ErrorResponse};
use crate::proxy::ChatProxy;
use crate::transport::CHAT_PATH;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::Instrument;
use utoipa::OpenApi;

/// The chat page, embedded at compile time.
pub const INDEX_HTML: &str = include_str!("../static/index.html");

// Unlimited, so a large body never hits actix's plain-text 413.
const MAX_BODY_BYTES: usize = usize::MAX;

#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "First choice returned by the model", body = ChatMessage),
        (status = 405, description = "Any method other than POST", body = ErrorResponse),
        (status = 500, description = "The upstream call failed", body = ErrorResponse)
    )
)]
pub async fn chat(
    body: Result<web::Bytes, actix_web::Error>,
    proxy: web::Data<ChatProxy>,
) -> Result<HttpResponse, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    async move {
        let body = body.map_err(|e| {
            let err = ApiError::invalid_request(format!("Failed to read body: {e}"));
            tracing::error!("Chat request failed: {}", err);
            err
        })?;

        let reply = proxy.respond(&body).await?;
        Ok::<_, ApiError>(HttpResponse::Ok().json(reply))
    }
    .instrument(span)
    .await
}

pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    tracing::info!("Rejected {} {}", req.method(), req.path());
    Err(ApiError::method_not_allowed(req.method().as_str()))
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(INDEX_HTML)
}

/// Registers the chat endpoint and the page. Expects `web::Data<ChatProxy>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(CHAT_PATH)
            .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
            .route(web::post().to(chat))
            .default_service(web::to(method_not_allowed)),
    )
    .service(web::resource("/").route(web::get().to(index)));
}

#[derive(OpenApi)]
#[openapi(
    paths(chat),
    components(schemas(ChatRequest, ChatMessage, ChatRole, ErrorResponse))
)]
pub struct ApiDoc;

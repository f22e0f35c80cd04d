use actix_web::{App, HttpServer, web};
use chat_proxy::config::{ProxyConfig, ServerConfig};
use chat_proxy::proxy::ChatProxy;
use chat_proxy::server::{self, ApiDoc};
use tracing_subscriber::{EnvFilter, fmt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // A missing .env file is fine; variables may come from the real environment.
    dotenvy::dotenv().ok();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let proxy_config = ProxyConfig::from_env().map_err(std::io::Error::other)?;
    let server_config = ServerConfig::from_env().map_err(std::io::Error::other)?;

    tracing::info!("Loaded configuration: {:?}", proxy_config);

    let proxy = ChatProxy::from_config(&proxy_config).map_err(std::io::Error::other)?;
    let proxy = web::Data::new(proxy);

    tracing::info!(
        "Starting server at http://{}:{}/ (API docs at /swagger-ui/)",
        server_config.host,
        server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(proxy.clone())
            .configure(server::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()))
    })
    .bind((server_config.host.as_str(), server_config.port))?
    .run()
    .await
}

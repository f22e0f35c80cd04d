//! Vercel serverless function for the chat endpoint
//!
//! Mirrors `POST /api/chat` of the standalone server: the caller's messages are
//! prefixed with the system instruction and relayed to OpenRouter.

use chat_proxy::config::ProxyConfig;
use chat_proxy::proxy::ChatProxy;
use chat_proxy::vercel::handle_request;
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt};
use vercel_runtime::{Body, Error, Request, Response, run};

// Built once per cold start and reused by every invocation on this instance.
static PROXY: OnceLock<ChatProxy> = OnceLock::new();

#[tokio::main]
async fn main() -> Result<(), Error> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting chat serverless function");

    let config = ProxyConfig::from_env()?;
    let proxy = ChatProxy::from_config(&config)?;
    if PROXY.set(proxy).is_err() {
        return Err("chat proxy initialised twice".into());
    }

    run(handler).await
}

/// Handles incoming HTTP requests for the chat endpoint
///
/// # Errors
///
/// Returns an error if the proxy is not initialised or response building fails
pub async fn handler(req: Request) -> Result<Response<Body>, Error> {
    let proxy = PROXY.get().ok_or("chat proxy not initialised")?;
    handle_request(proxy, req).await
}

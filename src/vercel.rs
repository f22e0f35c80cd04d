//! Vercel serverless function adapter module
//!
//! Turns the framework-neutral `ProxyReply` into a `vercel_runtime` response.

use crate::proxy::{ChatProxy, ProxyReply};
use vercel_runtime::{Body, Error, Request, Response};

/// Builds the HTTP response for a proxy reply.
///
/// # Errors
///
/// Returns an error if the response cannot be built.
pub fn into_response(reply: &ProxyReply) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(reply.status_code)
        .header("Content-Type", "application/json")
        .body(reply.body.to_string().into())?)
}

/// Runs one serverless invocation through the proxy.
///
/// # Errors
///
/// Returns an error if the response cannot be built.
pub async fn handle_request(
    proxy: &ChatProxy,
    req: Request,
) -> Result<Response<Body>, Error> {
    tracing::info!("Received request: {} {}", req.method(), req.uri().path());

    let body: &[u8] = req.body();
    let reply = proxy.handle(req.method().as_str(), body).await;

    into_response(&reply)
}

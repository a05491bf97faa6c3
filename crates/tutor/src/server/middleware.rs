//! Request context and middleware for the tutor REST API
//!
//! Every request gets a [`RequestContext`] carrying a request id, injected
//! into the request extensions so handlers can tag their log lines with it.

use axum::{
  extract::Request,
  http::{Method, Uri},
  middleware::Next,
  response::Response,
};
use std::time::Instant;
use uuid::Uuid;

/// Request metadata available to every handler
#[derive(Debug, Clone)]
pub struct RequestContext {
  /// Unique ID for this request
  pub request_id: Uuid,
  pub method: Method,
  pub uri: Uri,
  /// Client user agent, if sent
  pub user_agent: Option<String>,
}

impl RequestContext {
  pub fn new(method: Method, uri: Uri, user_agent: Option<String>) -> Self {
    Self { request_id: Uuid::new_v4(), method, uri, user_agent }
  }

  pub fn path(&self) -> &str {
    self.uri.path()
  }
}

/// Middleware to inject RequestContext into all requests and log their outcome
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
  let user_agent = request
    .headers()
    .get(axum::http::header::USER_AGENT)
    .and_then(|value| value.to_str().ok())
    .map(str::to_string);
  let context = RequestContext::new(request.method().clone(), request.uri().clone(), user_agent);

  tracing::info!(
    request_id = %context.request_id,
    method = %context.method,
    path = context.path(),
    user_agent = context.user_agent.as_deref().unwrap_or("none"),
    "request started"
  );

  let start_time = Instant::now();
  request.extensions_mut().insert(context.clone());
  let response = next.run(request).await;

  // For streamed bodies this marks when headers went out, not when the body finished
  let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
  tracing::info!(
    request_id = %context.request_id,
    method = %context.method,
    path = context.path(),
    status = response.status().as_u16(),
    duration_ms,
    "request completed"
  );

  response
}

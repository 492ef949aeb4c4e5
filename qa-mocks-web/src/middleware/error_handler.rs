use axum::{extract::Request, middleware::Next, response::Response};
use tracing::error;

/// Log every 5xx leaving the service with its method and path
pub async fn error_handler_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    if response.status().is_server_error() {
        error!(%method, %path, status = %response.status(), "Server error occurred");
    }

    response
}

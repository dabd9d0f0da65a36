//! REST API for browsing and tagging the image library.
//!
//! Routes:
//! - `GET /category`, `POST /category`, `DELETE /category/:id`
//! - `GET /image?status=&count=&categories=&lastImage=&starred=`, `POST /image`
//! - `GET /health`

mod error;
mod handlers;
mod routes;

pub use error::ApiError;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::Gallery;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub gallery: Arc<Gallery>,
    /// Log every HTTP request.
    pub trace_requests: bool,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            gallery: Arc::new(Gallery::from_settings(settings)),
            trace_requests: settings.debug,
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

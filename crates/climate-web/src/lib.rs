//! # climate-web
//!
//! HTTP surface of the climate node on Linux hosts.
//!
//! ## Routes
//!
//! - `GET /` - placeholder page
//! - `GET /data` - current reading as JSON, always 200
//! - anything else - `404 Not found: <path>`
//!
//! Only `GET` is routed. Other methods on `/` and `/data` get axum's 405.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use climate_web::{create_router, shared};
//!
//! let app = create_router(shared(service));
//!
//! let listener = TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use climate_core::ReadingSource;
use climate_protocol::{ClimateService, CodecError, HttpReply, Route};
use tokio::sync::Mutex;

/// Service shared across axum handlers.
///
/// The mutex makes sure only one request reads the sensor at a time.
pub type SharedService<R> = Arc<Mutex<ClimateService<R>>>;

/// Wrap a service for use with [`create_router`].
pub fn shared<R>(service: ClimateService<R>) -> SharedService<R> {
    Arc::new(Mutex::new(service))
}

/// Create the router with both routes and the not-found fallback.
pub fn create_router<R>(service: SharedService<R>) -> Router
where
    R: ReadingSource + Send + 'static,
{
    Router::new()
        .route(Route::Root.path(), get(root_handler::<R>))
        .route(Route::Data.path(), get(data_handler::<R>))
        .fallback(fallback_handler::<R>)
        .with_state(service)
}

/// `GET /`
async fn root_handler<R>(State(service): State<SharedService<R>>) -> Response
where
    R: ReadingSource + Send + 'static,
{
    let service = service.lock().await;
    reply_response(service.root())
}

/// `GET /data`
async fn data_handler<R>(State(service): State<SharedService<R>>) -> Response
where
    R: ReadingSource + Send + 'static,
{
    let mut service = service.lock().await;
    match service.data() {
        Ok(reply) => reply_response(reply),
        Err(e) => codec_error_response(e),
    }
}

/// Anything the router did not match goes through the service's dispatcher.
async fn fallback_handler<R>(State(service): State<SharedService<R>>, uri: Uri) -> Response
where
    R: ReadingSource + Send + 'static,
{
    let mut service = service.lock().await;
    match service.dispatch(uri.path()) {
        Ok(reply) => reply_response(reply),
        Err(e) => codec_error_response(e),
    }
}

fn reply_response(reply: HttpReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, reply.content_type)], reply.body).into_response()
}

fn codec_error_response(e: CodecError) -> Response {
    tracing::error!("Failed to encode reading: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
}

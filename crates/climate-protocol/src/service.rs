//! HTTP responder logic shared by every platform.
//!
//! Framework code (axum on Linux, esp-idf-svc on ESP32) only translates its
//! request/response types to and from the types below.

use climate_core::ReadingSource;
use tracing::debug;

use crate::codec::{encode_reading, CodecError};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const HTML_CONTENT_TYPE: &str = "text/html";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Routes served by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `GET /` - placeholder page
    Root,
    /// `GET /data` - latest reading as JSON
    Data,
}

impl Route {
    pub const ALL: [Route; 2] = [Route::Root, Route::Data];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Data => "/data",
        }
    }

    /// Resolve a request target. The query string is ignored.
    pub fn from_path(target: &str) -> Option<Route> {
        let path = target.split_once('?').map_or(target, |(path, _)| path);
        Route::ALL.into_iter().find(|route| route.path() == path)
    }
}

/// A complete response, independent of any HTTP framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpReply {
    pub fn ok(content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.into(),
        }
    }

    /// Fallback for unknown paths, same text as the embedded web server's default.
    pub fn not_found(target: &str) -> Self {
        Self {
            status: 404,
            content_type: TEXT_CONTENT_TYPE,
            body: format!("Not found: {}", target),
        }
    }
}

/// The node's HTTP responder.
///
/// Owns its reading source exclusively. Platforms that can run handlers
/// concurrently wrap the service in a mutex so the sensor is never read by
/// two requests at once.
pub struct ClimateService<R> {
    node_name: String,
    source: R,
}

impl<R: ReadingSource> ClimateService<R> {
    pub fn new(node_name: impl Into<String>, source: R) -> Self {
        Self {
            node_name: node_name.into(),
            source,
        }
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Produce the reply for a known route.
    pub fn respond(&mut self, route: Route) -> Result<HttpReply, CodecError> {
        match route {
            Route::Root => Ok(self.root()),
            Route::Data => self.data(),
        }
    }

    /// Resolve and answer a request target, falling back to 404.
    pub fn dispatch(&mut self, target: &str) -> Result<HttpReply, CodecError> {
        match Route::from_path(target) {
            Some(route) => self.respond(route),
            None => {
                debug!("no route for {}", target);
                Ok(HttpReply::not_found(target))
            }
        }
    }

    /// Static placeholder page. Never touches the sensor.
    pub fn root(&self) -> HttpReply {
        HttpReply::ok(HTML_CONTENT_TYPE, root_page(&self.node_name))
    }

    /// Read the sensor and return the JSON body. Always 200, even when the
    /// read failed.
    pub fn data(&mut self) -> Result<HttpReply, CodecError> {
        let reading = self.source.read();
        let body = encode_reading(&reading)?;
        Ok(HttpReply::ok(JSON_CONTENT_TYPE, body))
    }
}

fn root_page(node_name: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>{name}</title></head>\n\
         <body>\n\
         <h1>{name}</h1>\n\
         <p>Temperature and humidity: <a href=\"/data\">/data</a></p>\n\
         </body>\n\
         </html>\n",
        name = escape_html(node_name)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

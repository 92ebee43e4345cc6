//! HTTP handlers for the ESP32 climate node.
//!
//! Registers `GET /` and `GET /data` on an `EspHttpServer`. Unknown paths
//! get ESP-IDF's built-in 404.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use climate_core::ReadingSource;
use climate_protocol::{ClimateService, HttpReply, Route};
use embedded_svc::{http::Method, io::Write};
use esp_idf_svc::http::server::{Configuration, EspHttpConnection, EspHttpServer, Request};
use log::info;

/// Service shared with the handler closures.
pub type SharedService<R> = Arc<Mutex<ClimateService<R>>>;

/// Start the HTTP server and register both routes.
///
/// The returned server must be kept alive.
pub fn start_http_server<R>(service: SharedService<R>, port: u16) -> Result<EspHttpServer<'static>>
where
    R: ReadingSource + Send + 'static,
{
    let conf = Configuration {
        http_port: port,
        stack_size: 10 * 1024,
        ..Default::default()
    };
    let mut server = EspHttpServer::new(&conf)?;

    for route in Route::ALL {
        let service = service.clone();
        server.fn_handler::<anyhow::Error, _>(route.path(), Method::Get, move |req| {
            let reply = {
                let mut service = service
                    .lock()
                    .map_err(|_| anyhow!("climate service lock poisoned"))?;
                service.respond(route)?
            };
            write_reply(req, &reply)
        })?;
    }

    info!("HTTP server started on port {}", port);
    Ok(server)
}

fn write_reply(req: Request<&mut EspHttpConnection<'_>>, reply: &HttpReply) -> Result<()> {
    req.into_response(reply.status, None, &[("Content-Type", reply.content_type)])?
        .write_all(reply.body.as_bytes())?;
    Ok(())
}

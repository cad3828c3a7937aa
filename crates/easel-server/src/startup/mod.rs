//! Application startup utilities module.

mod shutdown;
mod telemetry;

pub use shutdown::{ShutdownSignal, wait_for_shutdown_signal};
pub use telemetry::{get_subscriber, init_subscriber};

use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use crate::api;
use crate::model::common::AppState;

/// Creates and binds the HTTP server.
///
/// One server carries the whole surface: lock endpoints, maintenance,
/// the reference graphics API and the health probe, all under the
/// configured context path.
pub fn http_server(
    app_state: Arc<AppState>,
    context_path: String,
    address: String,
    port: u16,
) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::from(app_state.clone()))
            .service(
                web::scope(&context_path)
                    .service(api::lock::routes())
                    .service(api::maintenance::routes())
                    .service(api::graphic::routes())
                    .service(api::health::routes()),
            )
    })
    .bind((address, port))?
    .run())
}

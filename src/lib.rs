//! In-memory JSON key-value store served over HTTP.
//!
//! - [`store`] holds the concurrent map and its write semantics.
//! - [`api`] maps HTTP routes onto store operations.
//! - [`error`] renders request failures as JSON error envelopes.
//! - [`config`] and [`logging`] cover process setup.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;

use std::net::SocketAddr;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, middleware, web};

use crate::api::PayloadLimit;
use crate::config::Config;
use crate::store::KeyStore;

// Bind the HTTP server for the given store. Returns the server future (not yet
// polled) along with the addresses it is listening on.
pub fn bind_server(
    config: &Config,
    store: KeyStore,
) -> std::io::Result<(Server, Vec<SocketAddr>)> {
    let store = web::Data::new(store);
    let payload_limit = web::Data::new(PayloadLimit(config.payload_limit));

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(payload_limit.clone())
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    let server = server.bind(config.socket_addr())?;
    let addrs = server.addrs();
    Ok((server.run(), addrs))
}

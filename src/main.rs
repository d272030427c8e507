use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use jsonkv::bind_server;
use jsonkv::config::Config;
use jsonkv::logging::init_tracing;
use jsonkv::store::KeyStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::parse();

    // One store for the lifetime of the process, shared by every worker
    let store = KeyStore::new();

    let (server, addrs) = bind_server(&config, store)
        .inspect_err(|err| {
            error!(addr = %config.socket_addr(), error = %err, "failed to start listener")
        })
        .with_context(|| format!("failed to listen on {}", config.socket_addr()))?;
    for addr in &addrs {
        info!("jsonkv is starting on http://{addr}");
    }

    server.await.context("server exited with error")?;
    Ok(())
}

//! chatkv daemon: opens the store, serves it over HTTP, closes it on
//! Ctrl-C.

mod cli;

use std::error::Error;
use std::sync::Arc;

use chatkv_core::Store;
use chatkv_http::SharedState;
use clap::Parser;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();
    let store = Arc::new(Store::open(args.store_config())?);
    let state = Arc::new(SharedState::new(Arc::clone(&store)));

    let listener = TcpListener::bind(args.bind_addr()).await?;
    chatkv_http::serve(listener, state, shutdown_signal()).await?;

    if let Err(e) = store.close() {
        log::error!("Final flush failed, latest changes are not on disk: {}", e);
        return Err(e.into());
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

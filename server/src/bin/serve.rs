use anyhow::{Context, Result};
use lists_server::{app, config::Opt, logging::init_logging};
use structopt::StructOpt;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::from_args();
    init_logging(&opt.log)?;

    let store = opt.open_store().context("opening database")?;
    let addr = opt.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!(%addr, "listening");

    axum::serve(listener, app(store))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutting down"),
        Err(err) => {
            tracing::error!(error = %err, "cannot listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

use crate::application::bootstrap::Services;
use crate::config::Config;
use crate::interfaces::http::{router, AppState};
use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Top-level wiring: builds the Services and binds the HTTP listener.
/// `run` blocks until a shutdown signal (Ctrl-C) arrives, then cancels the
/// Market Simulator and lets in-flight requests drain.
pub struct Application {
    router: axum::Router,
    listener: TcpListener,
    services: Arc<Services>,
}

impl Application {
    pub async fn build(config: &Config) -> anyhow::Result<Self> {
        let services = Arc::new(Services::build(config).await?);

        let state = AppState {
            services: services.clone(),
            organizer_secret: Arc::new(config.organizer_secret.clone()),
            initial_cash: config.initial_cash,
        };

        let listener = TcpListener::bind(("0.0.0.0", config.port))
            .await
            .with_context(|| format!("failed to bind port {}", config.port))?;

        info!("listening on {}", listener.local_addr()?);

        Ok(Self {
            router: router(state),
            listener,
            services,
        })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let services = self.services.clone();
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server failed")?;
        services.shutdown();
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(err) => {
                error!("unable to listen for Ctrl-C signal: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("unable to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}

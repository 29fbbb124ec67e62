use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;

use crate::{
    config::AppConfig,
    infrastructure::{directories::ResolvedPaths, shutdown::Shutdown},
    ml,
    web::{self, AppContext},
};

pub struct SpamClassifierApp {
    config: Arc<AppConfig>,
    router: Router,
    shutdown: Shutdown,
}

impl SpamClassifierApp {
    /// Loads every artifact up front; any failure aborts startup.
    pub fn initialize(
        config: AppConfig,
        paths: &ResolvedPaths,
        shutdown: Shutdown,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let predictor = ml::load_artifacts(&paths.artifacts, config.preprocessing)
            .context("failed to load classifier artifacts")?;
        let context = AppContext::new(predictor).context("failed to compile page templates")?;

        tracing::info!(
            target: "startup",
            max_len = context.predictor.max_len(),
            padding = config.preprocessing.padding.as_str(),
            truncating = config.preprocessing.truncating.as_str(),
            "classifier ready"
        );

        Ok(Self {
            router: web::router(Arc::new(context)),
            config,
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let SpamClassifierApp {
            config,
            router,
            shutdown,
        } = self;

        let addr = config.server.bind_addr;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!(target: "http", %addr, "spam classifier listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.subscribe().notified())
            .await
            .context("http server failed")?;

        tracing::info!(target: "http", "server stopped");
        Ok(())
    }
}

use std::net::SocketAddr;

use anyhow::Context;
use axum::{Router, routing::get};
use axum_extra::extract::cookie::Key;
use parley_auth::{AuthState, oauth_router};
use parley_auth_memory::MemoryStores;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use url::Url;

use crate::{bootstrap, config::AppConfig, handlers};

pub struct ParleyServer {
    addr: SocketAddr,
    app: Router,
    stores: MemoryStores,
}

/// Assembles the full router over `stores`.
///
/// # Errors
///
/// Returns an error if the base URL does not parse.
pub fn build_app(cfg: &AppConfig, stores: &MemoryStores) -> anyhow::Result<Router> {
    let issuer = Url::parse(&cfg.base_url()).context("invalid base URL")?;
    let state = AuthState::new(
        stores.backends(),
        cfg.oauth.clone(),
        cookie_key(cfg),
        issuer,
    );

    // Outermost first: trace -> cors -> routes
    let middleware = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<axum::body::Body>| {
                    use tracing::field::Empty;
                    // Query strings can carry codes and PKCE values; log the path only.
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(CorsLayer::permissive());

    let app = Router::new()
        .route("/healthz", get(handlers::healthz))
        .merge(oauth_router(state))
        .layer(middleware);

    Ok(app)
}

/// Signing key for session cookies.
///
/// Without a configured secret the key is random and existing sessions are
/// lost on restart.
fn cookie_key(cfg: &AppConfig) -> Key {
    if let Some(secret) = &cfg.server.cookie_secret {
        match Key::try_from(secret.as_bytes()) {
            Ok(key) => return key,
            Err(e) => tracing::warn!(error = %e, "server.cookie_secret unusable, generating a key"),
        }
    } else {
        tracing::warn!("server.cookie_secret not set, generating a random key");
    }
    Key::generate()
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    stores: MemoryStores,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
            stores: MemoryStores::new(),
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Uses existing stores instead of empty ones.
    pub fn with_stores(mut self, stores: MemoryStores) -> Self {
        self.stores = stores;
        self
    }

    /// Seeds the stores and builds the router.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding fails or the router cannot be built.
    pub async fn build(self) -> anyhow::Result<ParleyServer> {
        let stats = bootstrap::seed(&self.stores, &self.config.bootstrap)
            .await
            .context("bootstrap seeding failed")?;
        tracing::info!(
            users = stats.users_created,
            clients = stats.clients_created,
            skipped = stats.skipped,
            "Bootstrap complete"
        );

        let app = build_app(&self.config, &self.stores)?;

        Ok(ParleyServer {
            addr: self.addr,
            app,
            stores: self.stores,
        })
    }
}

impl ParleyServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The stores behind the running router.
    pub fn stores(&self) -> &MemoryStores {
        &self.stores
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

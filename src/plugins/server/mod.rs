mod handlers;
mod pages;

use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use axum::{
  Router,
  routing::{get, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

/// Routes with tracing and CORS; rate limiting is added when serving since it
/// keys on the peer address.
pub fn router(app: Arc<AppState>) -> Router {
  Router::new()
    .route("/", get(handlers::index))
    .route(
      "/add_subscription",
      get(handlers::add_form).post(handlers::add),
    )
    .route("/list_subscriptions", get(handlers::list))
    .route(
      "/check_subscription_ui",
      get(handlers::check_form).post(handlers::check_ui),
    )
    .route("/check_subscription", get(handlers::check))
    .route(
      "/edit_subscription/{id}",
      get(handlers::edit_form).post(handlers::edit),
    )
    .route("/deactivate_subscription/{id}", post(handlers::deactivate))
    .route("/error", get(handlers::error))
    .route("/health", get(handlers::health))
    .layer(
      ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
          .allow_origin(Any)
          .allow_methods(Any)
          .allow_headers(Any),
      ),
    )
    .with_state(app)
}

#[async_trait]
impl super::Plugin for Plugin {
  fn name(&self) -> &'static str {
    "http"
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let config = &app.config;

    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(config.rate_per_second)
        .burst_size(config.rate_burst)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let limiter = governor_conf.limiter().clone();
    let addr = SocketAddr::new(config.host, config.port);

    let router = router(app.clone())
      .layer(GovernorLayer::new(governor_conf))
      .into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP Server listening on {addr}");

    let limiter = async {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        limiter.retain_recent();
      }
    };

    let server = async {
      axum::serve(listener, router).await.context("Axum server error")
    };

    tokio::select! {
      result = server => {
        match &result {
          Ok(_) => info!("Server stopped gracefully"),
          Err(err) => error!("Server stopped with error: {err}"),
        }
        result
      }
      _ = limiter => {
        error!("Rate limiter cleaner stopped unexpectedly!");
        Ok(())
      }
    }
  }
}

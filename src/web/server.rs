use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use super::{auth, routes};
use crate::config::Config;

/// State shared across all request handlers
pub struct AppState {
    pub config: Config,
}

/// Build the router. Sources are fixed for the process lifetime, so each
/// one gets its own `/logs-{name}` route; everything else lands on the
/// fallback. The auth layer covers the registered routes only, which
/// keeps unknown paths at a bare 404 no matter the credentials.
pub fn create_router(config: Config) -> Router {
    let state = Arc::new(AppState { config });

    let mut router = Router::new().route("/", get(routes::index));
    for name in state.config.sources.keys() {
        let source = name.clone();
        router = router.route(
            &format!("/logs-{name}"),
            get(
                move |state: State<Arc<AppState>>, query: Query<routes::TailQuery>| {
                    let source = source.clone();
                    async move { routes::view_log(state, query, source).await }
                },
            ),
        );
    }

    router
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process exits
pub async fn start(config: Config) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.port);
    let app = create_router(config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Log viewer listening");

    axum::serve(listener, app).await?;

    Ok(())
}

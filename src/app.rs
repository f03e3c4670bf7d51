use std::net::SocketAddr;

use axum::{extract::Request, routing::get, Router};
use tower::Layer;
use tower_http::{cors::CorsLayer, normalize_path::NormalizePathLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, categories, products, stock, suppliers, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(suppliers::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(stock::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        path = %req.uri().path(),
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let status = res.status();
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "request failed");
                        } else {
                            tracing::info!(%status, latency_ms, "request handled");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    // Trailing slashes are trimmed before routing, so /produtos/ and
    // /produtos hit the same handler. The layer has to wrap the router
    // rather than go through Router::layer, which runs after route matching.
    let app = NormalizePathLayer::trim_trailing_slash().layer(app);

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        axum::ServiceExt::<Request>::into_make_service(app),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::{Layer, ServiceExt};
    use tower_http::normalize_path::NormalizePathLayer;

    use super::build_app;
    use crate::config::JwtConfig;
    use crate::state::AppState;

    fn test_state() -> AppState {
        AppState::for_tests(JwtConfig {
            secret: "do-not-use-in-production".into(),
            issuer: "vendas-api".into(),
            audience: "vendas-api-users".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        })
    }

    #[tokio::test]
    async fn trailing_slash_reaches_the_same_route() {
        let app = NormalizePathLayer::trim_trailing_slash().layer(build_app(test_state()));

        let res = app
            .oneshot(Request::get("/health/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_a_plain_404() {
        let res = build_app(test_state())
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}

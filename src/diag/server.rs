//! HTTP endpoint exposing the registry dump.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use tracing::{error, info};

use super::{DiagError, ThreadRegistry};

/// Builds the router serving the dump at `endpoint`.
pub fn router(registry: Arc<ThreadRegistry>, endpoint: &str) -> Router {
    Router::new()
        .route(endpoint, get(handle_dump))
        .with_state(registry)
}

async fn handle_dump(State(registry): State<Arc<ThreadRegistry>>) -> String {
    registry.render_dump()
}

/// Binds `addr` and serves the dump from a dedicated thread.
///
/// Binding happens on the calling thread so an address conflict is reported
/// here instead of being lost in the background.
pub fn spawn_server(
    registry: Arc<ThreadRegistry>,
    addr: &str,
    endpoint: &str,
) -> Result<(SocketAddr, JoinHandle<()>), DiagError> {
    let listener = TcpListener::bind(addr).map_err(|source| DiagError::Bind {
        addr: addr.to_string(),
        source,
    })?;
    listener.set_nonblocking(true)?;
    let local_addr = listener.local_addr()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let app = router(Arc::clone(&registry), endpoint);

    let handle = thread::Builder::new()
        .name("rtmon-diag".to_string())
        .spawn(move || {
            let probe = registry.register("rtmon-diag");
            probe.set_state("serving");
            let _frame = probe.enter("rtmon::diag::server::spawn_server");

            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(l) => l,
                    Err(e) => {
                        error!("diag server: {}", e);
                        return;
                    }
                };
                info!(%local_addr, "diag server listening");
                if let Err(e) = axum::serve(listener, app).await {
                    error!("diag server stopped: {}", e);
                }
            });
        })?;

    Ok((local_addr, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_router_serves_dump() {
        let registry = ThreadRegistry::new();
        let _probe = registry.register("main");

        let response = router(Arc::clone(&registry), "/debug/grmon")
            .oneshot(
                Request::builder()
                    .uri("/debug/grmon")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("thread 1 [running]:"));
    }

    #[tokio::test]
    async fn test_router_unknown_path() {
        let registry = ThreadRegistry::new();
        let response = router(registry, "/debug/grmon")
            .oneshot(Request::builder().uri("/other").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_spawn_server_reports_bind_conflict() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap().to_string();
        let err = spawn_server(ThreadRegistry::new(), &addr, "/debug/grmon").unwrap_err();
        assert!(matches!(err, DiagError::Bind { .. }));
    }
}

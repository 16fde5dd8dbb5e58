//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use tokio::net::TcpListener;

/// A canned origin response: status, headers, body.
pub type CannedResponse = (u16, Vec<(&'static str, String)>, Vec<u8>);

/// Handle to a running mock origin.
pub struct MockOrigin {
    pub addr: SocketAddr,
    hits: Arc<AtomicU32>,
}

impl MockOrigin {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Number of requests the origin has served.
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a programmable mock origin on an ephemeral port. The closure
/// runs once per request; sleeping inside it simulates a slow origin.
pub async fn start_origin<F, Fut>(respond: F) -> MockOrigin
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: std::future::Future<Output = CannedResponse> + Send + 'static,
{
    let hits = Arc::new(AtomicU32::new(0));
    let hits_in_handler = hits.clone();

    let app = Router::new().fallback(move |_req: Request<Body>| {
        let respond = respond.clone();
        let hits = hits_in_handler.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            let (status, headers, body) = respond().await;

            let mut response = Response::new(Body::from(body));
            *response.status_mut() =
                StatusCode::from_u16(status).expect("valid status in test fixture");
            for (name, value) in headers {
                response.headers_mut().insert(
                    HeaderName::from_static(name),
                    HeaderValue::from_str(&value).expect("valid header in test fixture"),
                );
            }
            response
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    MockOrigin { addr, hits }
}

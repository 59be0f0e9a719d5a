//! Per-connection HTTP/1.1 serving
//!
//! Each accepted socket is driven by hyper's HTTP/1 connection state machine
//! (framing, keep-alive, pipelining, malformed-request replies) with the
//! shared `Router` as its service.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;
use crate::server::config::ServerConfig;
use crate::server::router::Router;
use crate::stats::ServerStats;

/// A single client connection
pub struct Connection {
    session_id: u64,
    peer_addr: SocketAddr,
    config: ServerConfig,
    router: Arc<Router>,
    stats: Arc<ServerStats>,
}

impl Connection {
    pub fn new(
        session_id: u64,
        peer_addr: SocketAddr,
        config: ServerConfig,
        router: Arc<Router>,
        stats: Arc<ServerStats>,
    ) -> Self {
        Self {
            session_id,
            peer_addr,
            config,
            router,
            stats,
        }
    }

    /// Serve requests on `stream` until the peer disconnects or asks to close
    ///
    /// Unparseable requests are answered by hyper (400 and close) and surface
    /// here as `Error::Http`, as does a request head that doesn't arrive
    /// within the idle timeout.
    pub async fn run<S>(self, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let session_id = self.session_id;
        let router = self.router;
        let stats = self.stats;

        let service = service_fn(move |req: Request<Incoming>| {
            let router = Arc::clone(&router);
            let stats = Arc::clone(&stats);

            async move {
                let method = req.method().clone();
                let path = req.uri().path().to_owned();

                let resp = router.handle(req).await;
                stats.record_response(resp.status());

                tracing::debug!(
                    session_id = session_id,
                    method = %method,
                    path = %path,
                    status = resp.status().as_u16(),
                    "Request served"
                );

                Ok::<_, Infallible>(resp)
            }
        });

        tracing::trace!(session_id = session_id, peer = %self.peer_addr, "Serving connection");

        http1::Builder::new()
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.idle_timeout)
            .keep_alive(true)
            .serve_connection(TokioIo::new(stream), service)
            .await?;

        Ok(())
    }
}

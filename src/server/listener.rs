//! HTTP server listener
//!
//! Handles TCP accept loop and spawns connection handlers.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::Result;
use crate::registry::UserRegistry;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::server::router::Router;
use crate::stats::{ServerStats, StatsSnapshot};

/// User registry HTTP server
pub struct UserServer {
    config: ServerConfig,
    router: Arc<Router>,
    stats: Arc<ServerStats>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl UserServer {
    /// Create a new server with its own empty registry
    pub fn new(config: ServerConfig) -> Self {
        Self::with_registry(config, Arc::new(UserRegistry::new()))
    }

    /// Create a new server backed by an existing registry
    pub fn with_registry(config: ServerConfig, registry: Arc<UserRegistry>) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        let router = Arc::new(Router::new(registry).max_body_size(config.max_body_size));

        Self {
            config,
            router,
            stats: Arc::new(ServerStats::new()),
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Get a reference to the user registry
    pub fn registry(&self) -> &Arc<UserRegistry> {
        self.router.registry()
    }

    /// Current server counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.serve(listener) => result,
        };

        let stats = self.stats();
        tracing::info!(
            connections = stats.connections_accepted,
            rejected = stats.connections_rejected,
            requests = stats.requests,
            responses_2xx = stats.responses_2xx,
            responses_4xx = stats.responses_4xx,
            responses_5xx = stats.responses_5xx,
            uptime_secs = stats.uptime.as_secs(),
            "Server stopped"
        );

        result
    }

    /// Accept connections from an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(addr = %addr, "User registry server listening");

        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit; the permit lives as long as the connection task
        let permit: Option<OwnedSemaphorePermit> = match self.connection_semaphore {
            Some(ref sem) => match Arc::clone(sem).try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    self.stats.record_rejected();
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            },
            None => None,
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        if let Err(e) = self.configure_socket(&socket) {
            tracing::error!(error = %e, "Failed to configure socket");
            return;
        }

        self.stats.record_accepted();

        let config = self.config.clone();
        let router = Arc::clone(&self.router);
        let stats = Arc::clone(&self.stats);

        tokio::spawn(async move {
            let _permit = permit;
            let connection = Connection::new(session_id, peer_addr, config, router, stats);

            match connection.run(socket).await {
                Ok(()) => {}
                Err(e) => {
                    tracing::debug!(
                        session_id = session_id,
                        error = %e,
                        "Connection error"
                    );
                }
            }

            tracing::debug!(session_id = session_id, "Connection closed");
        });
    }

    fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }
        Ok(())
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    async fn spawn_server(config: ServerConfig) -> (Arc<UserServer>, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(UserServer::new(config));

        let task_server = Arc::clone(&server);
        tokio::spawn(async move {
            let _ = task_server.serve(listener).await;
        });

        (server, addr)
    }

    async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_over_tcp() {
        let (server, addr) = spawn_server(ServerConfig::default()).await;

        let response = roundtrip(
            addr,
            "POST /user HTTP/1.1\r\nContent-Length: 14\r\nConnection: close\r\n\r\n{\"name\":\"Eve\"}",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 202 Accepted\r\n"));

        let response = roundtrip(addr, "GET /user/1 HTTP/1.0\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(response.ends_with("\r\n\r\n{\"name\":\"Eve\"}"));

        assert_eq!(server.registry().len().await, 1);

        let stats = server.stats();
        assert_eq!(stats.connections_accepted, 2);
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.responses_2xx, 2);
    }

    #[tokio::test]
    async fn test_malformed_request_gets_400() {
        let (_server, addr) = spawn_server(ServerConfig::default()).await;

        let response = roundtrip(addr, "HELLO\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn test_bare_lf_request_answered() {
        let (_server, addr) = spawn_server(ServerConfig::default()).await;

        let response = roundtrip(addr, "GET / HTTP/1.1\nConnection: close\n\n").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("Hello Client!"));
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let (server, addr) = spawn_server(ServerConfig::default().max_connections(1)).await;

        // Hold the only slot open with a keep-alive connection
        let mut held = TcpStream::connect(addr).await.unwrap();
        held.write_all(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await.unwrap();
        let mut buf = [0u8; 17];
        held.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"HTTP/1.1 200 OK\r\n");

        // Rejected connections are closed without a response
        let mut rejected = TcpStream::connect(addr).await.unwrap();
        let mut response = Vec::new();
        rejected.read_to_end(&mut response).await.unwrap();
        assert!(response.is_empty());
        assert_eq!(server.stats().connections_rejected, 1);
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let config = ServerConfig::default().bind("127.0.0.1:0".parse().unwrap());
        let server = UserServer::new(config);

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tx.send(()).unwrap();

        server
            .run_until(async {
                let _ = rx.await;
            })
            .await
            .unwrap();
    }

    #[test]
    fn test_shared_registry() {
        let registry = Arc::new(UserRegistry::new());
        let server = UserServer::with_registry(ServerConfig::default(), Arc::clone(&registry));

        assert!(Arc::ptr_eq(server.registry(), &registry));
        assert_eq!(server.bind_addr().port(), 8080);
    }
}

//! UDP Message Listener
//!
//! Local applications push agent messages as JSON datagrams. Each datagram
//! is one message, handed to the router without waiting for its outcome.

use std::net::SocketAddr;

use serde_json::Value;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::router::MessageRouter;

/// Largest datagram accepted
const MAX_DATAGRAM: usize = 65_507;

/// Receives agent messages over UDP
pub struct UdpListener {
    socket: UdpSocket,
    router: MessageRouter,
}

impl UdpListener {
    /// Bind the listener socket
    pub async fn bind(addr: SocketAddr, router: MessageRouter) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!("UDP listener bound to {}", socket.local_addr()?);
        Ok(Self { socket, router })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive datagrams until the socket fails
    pub async fn run(self) -> std::io::Result<()> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let (len, peer) = self.socket.recv_from(&mut buf).await?;
            let message: Value = match serde_json::from_slice(&buf[..len]) {
                Ok(m) => m,
                Err(e) => {
                    warn!(%peer, "Dropping malformed message: {}", e);
                    continue;
                }
            };

            debug!(%peer, "Received message");
            self.router.handle(message, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use tempfile::TempDir;

    use crate::config::AgentConfig;
    use crate::connector::LogConnector;
    use crate::store::SensorStore;

    #[tokio::test]
    async fn test_datagram_reaches_store() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SensorStore::init("device.json", &AgentConfig::with_data_directory(dir.path())).await);
        let router = MessageRouter::new(store.clone(), Arc::new(LogConnector));

        let listener = UdpListener::bind("127.0.0.1:0".parse().unwrap(), router).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(listener.run());

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"not json", addr).await.unwrap();
        let message = json!({ "n": "temp", "t": "temperature.v1.0" });
        client
            .send_to(message.to_string().as_bytes(), addr)
            .await
            .unwrap();

        for _ in 0..100 {
            if store.len() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(store.by_name(&json!("temp")).is_some());
    }
}

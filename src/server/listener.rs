use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;
use crate::http::connection::Connection;
use crate::http::handler::{self, Handler, SharedHandler};

/// The TCP server: binds the configured address and spawns one task per
/// accepted connection.
pub struct Server {
    config: Config,
    handler: SharedHandler,
}

impl Server {
    /// Creates a server that replies with the default JSON echo handler
    /// until [`handler`](Server::handler) replaces it.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            handler: handler::default_handler(),
        }
    }

    /// Registers the application handler.
    pub fn handler<H: Handler>(mut self, handler: H) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let addr = self.config.listen_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("Listening on {}", addr);

        loop {
            let (socket, peer) = listener.accept().await?;
            info!("Accepted connection from {}", peer);

            let handler = self.handler.clone();
            tokio::spawn(async move {
                let mut conn = Connection::new(socket, handler);
                if let Err(e) = conn.run().await {
                    error!("Connection error from {}: {}", peer, e);
                }
            });
        }
    }
}

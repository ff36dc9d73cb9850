use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::http::request::Request;
use crate::http::response::Response;

/// Type-erased future returned by a handler invocation.
pub type BoxFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// The application handler contract.
///
/// Implemented automatically for any
/// `async fn(Request, Response) -> anyhow::Result<()>` (and for closures
/// with the same shape). The handler owns the [`Response`] and replies by
/// calling `send`, `json` or `end` on it, synchronously or after awaiting
/// external work. Returning an error makes the connection emit a
/// `500 Internal Server Error` for this exchange.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request, res: Response) -> BoxFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn call(&self, req: Request, res: Response) -> BoxFuture {
        Box::pin(self(req, res))
    }
}

/// A handler shared across every connection of a server.
pub type SharedHandler = Arc<dyn Handler>;

async fn default_reply(req: Request, mut res: Response) -> anyhow::Result<()> {
    res.json(&serde_json::json!({
        "framework": "ember",
        "message": format!("Default handler: {} {}", req.method, req.path),
    }));
    Ok(())
}

/// The handler used when the application never registered one: replies
/// with a JSON echo of the request's method and path.
pub fn default_handler() -> SharedHandler {
    Arc::new(default_reply)
}

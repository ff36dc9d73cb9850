mod config;
mod server;
mod http;

use config::Config;
use http::request::Request;
use http::response::Response;
use server::listener::Server;

async fn demo(req: Request, mut res: Response) -> anyhow::Result<()> {
    if req.path == "/" {
        res.send("Hello from ember\n");
        return Ok(());
    }

    if req.path == "/json" {
        res.json(&serde_json::json!({
            "ok": true,
            "path": req.path,
            "method": req.method,
        }));
        return Ok(());
    }

    res.status(404).send("Not Found");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()>{
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load();
    let server = Server::new(cfg).handler(demo);

    tokio::select! {
        res = server.run() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

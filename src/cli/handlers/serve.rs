//! API server handlers

use crate::AppConfig;
use crate::Result;

pub async fn handle_serve(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
    cors: bool,
) -> Result<()> {
    use crate::api::serve_api;

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let cors = cors || config.server.cors;

    println!("🚀 Starting Support API Server");
    println!("==============================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });
    println!();

    serve_api(config, host, port, cors).await
}

//! Web server command.

use std::net::SocketAddr;

use console::style;

use crate::config::Config;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

/// Start the web server.
pub async fn cmd_serve(config: &Config, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind);
    let addr = resolve(&host, port).await?;

    if let Some(path) = &config.source_path {
        println!(
            "{} Using config {}",
            style("→").cyan(),
            style(path.display()).dim()
        );
    }
    println!(
        "{} Starting A11y Analyzer API at http://{}",
        style("→").cyan(),
        addr
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(config, addr).await
}

async fn resolve(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| anyhow::anyhow!("Could not resolve bind address {}:{}", host, port))
}

/// Parse a bind address that can be:
/// - Just a port: "8000" -> 127.0.0.1:8000
/// - Just a host: "0.0.0.0" -> 0.0.0.0:8000
/// - Host and port: "0.0.0.0:8000" -> 0.0.0.0:8000
fn parse_bind_address(bind: &str) -> (String, u16) {
    let bind = bind.trim();

    if let Ok(port) = bind.parse::<u16>() {
        return (DEFAULT_HOST.to_string(), port);
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            let host = host.trim_start_matches('[').trim_end_matches(']');
            return (host.to_string(), port);
        }
    }

    (bind.to_string(), DEFAULT_PORT)
}

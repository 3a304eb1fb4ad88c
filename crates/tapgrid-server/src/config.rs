use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};

/// Runtime configuration, from flags or `TAPGRID_*` environment variables.
#[derive(Debug, Clone, Parser)]
#[command(name = "tapgrid-server", about = "Leaderboard service for tapgrid")]
pub struct Config {
    /// Address the HTTP server listens on.
    #[arg(long, env = "TAPGRID_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// JSON document holding the leaderboard.
    #[arg(long, env = "TAPGRID_DATA_FILE", default_value = "data/leaderboard.json")]
    pub data_file: PathBuf,

    /// Single origin allowed by CORS. Any origin when unset.
    #[arg(long, env = "TAPGRID_ALLOW_ORIGIN")]
    pub allow_origin: Option<String>,
}

impl Config {
    pub fn cors_layer(&self) -> anyhow::Result<CorsLayer> {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

        Ok(match &self.allow_origin {
            Some(origin) => cors.allow_origin(
                HeaderValue::from_str(origin)
                    .with_context(|| format!("Invalid allowed origin: {origin}"))?,
            ),
            None => cors.allow_origin(Any),
        })
    }
}

use std::sync::Arc;

use anyhow::Result;
use reqwest::Client;

use crate::config::Config;

/// Shared per-process state handed to every handler. Nothing in here is
/// mutable across requests; the stock catalog is re-read per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(AppState {
            config: Arc::new(config),
            http,
        })
    }
}

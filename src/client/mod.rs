//! HTTP client for a running MLDB server.
//!
//! `PluginClient` is an explicit handle: the server address and timeout are
//! taken from a `ClientConfig` instead of ambient global state.

use std::time::Duration;

use reqwest::{header, Client, Method, Url};
use serde::Serialize;

use crate::config::ClientConfig;

pub mod errors;
pub mod models;

pub use errors::ClientError;
pub use models::{LogRecord, PerformResponse, RunOutput, RunRequest, ScriptException};

/// Route of the python plugin that executes a script and returns its logs.
pub const PYTHON_RUN_ROUTE: &str = "/v1/types/plugins/python/routes/run";

#[derive(Clone, Debug)]
pub struct PluginClient {
    http: Client,
    base_url: String,
    run_route: String,
}

impl PluginClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            run_route: config.run_route.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn run_route(&self) -> &str {
        &self.run_route
    }

    fn endpoint(&self, route: &str, params: &[(String, String)]) -> Result<Url, ClientError> {
        let raw = format!("{}{}", self.base_url, route);
        let mut url = Url::parse(&raw).map_err(|e| ClientError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        // An empty parameter list must not leave a dangling '?'
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    /// Sends one request and returns the status and the undecoded body.
    ///
    /// Non-2xx statuses are not errors here; the caller decides what to do
    /// with them.
    pub async fn perform<B>(
        &self,
        method: Method,
        route: &str,
        params: &[(String, String)],
        body: &B,
    ) -> Result<PerformResponse, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(route, params)?;
        log::debug!("{} {}", method, url);

        let transport = |source| ClientError::Transport {
            route: route.to_string(),
            source,
        };

        let response = self
            .http
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await.map_err(transport)?;

        log::debug!("{} answered {} ({} bytes)", route, status_code, text.len());

        Ok(PerformResponse {
            status_code,
            content_type,
            response: text,
        })
    }

    /// Runs a python script through the plugin run route.
    pub async fn run_python(&self, request: &RunRequest) -> Result<RunOutput, ClientError> {
        let response = self
            .perform(Method::POST, &self.run_route, &[], request)
            .await?;

        if !response.is_success() {
            log::warn!(
                "{} answered with status {}",
                self.run_route,
                response.status_code
            );
        }

        response.run_output()
    }
}

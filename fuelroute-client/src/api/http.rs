use anyhow::Context;
use fuelroute_common::ApiErrorBody;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::WorkflowError;

pub fn build_http_client(timeout_secs: u64, user_agent: &str) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()
        .context("Failed to build HTTP client")
}

/// Decode a success body, or turn a non-success response into an API error
/// carrying the server's `error`/`detail` message when it sent one.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    fallback: &str,
) -> Result<T, WorkflowError> {
    let status = response.status();

    if !status.is_success() {
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.message().map(str::to_string),
            Err(e) => {
                tracing::debug!("Unreadable error body for HTTP {}: {}", status, e);
                None
            }
        };
        return Err(WorkflowError::Api {
            status: Some(status.as_u16()),
            message: message.unwrap_or_else(|| fallback.to_string()),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| WorkflowError::from_transport(e, fallback))
}

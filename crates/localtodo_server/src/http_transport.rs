//! `DataTransport` over HTTP (reqwest).

use async_trait::async_trait;
use localtodo_core::api::{ErrorBody, SaveAck};
use localtodo_core::{ClientError, ClientResult, DataSnapshot, DataTransport, SaveRequest, DATA_ENDPOINT};
use log::debug;
use reqwest::{Client, Response};

pub const URL_ENV: &str = "LOCALTODO_URL";
pub const DEFAULT_URL: &str = "http://127.0.0.1:3000";

/// Talks to a running server at `<base_url>/api/data`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", base_url.trim().trim_end_matches('/'), DATA_ENDPOINT),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DataTransport for HttpTransport {
    async fn get_data(&self) -> ClientResult<DataSnapshot> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response)
            .await?
            .json::<DataSnapshot>()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))
    }

    async fn post_data(&self, request: &SaveRequest) -> ClientResult<()> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        let ack = ensure_success(response)
            .await?
            .json::<SaveAck>()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))?;
        if !ack.success {
            return Err(ClientError::Decode(
                "save reply reported success=false".to_string(),
            ));
        }
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    debug!(
        "event=http_request module=http_transport status=error error={}",
        err
    );
    ClientError::Transport(err.to_string())
}

async fn ensure_success(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // Error bodies are `{"error": ...}`; anything else keeps just the status.
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::HttpTransport;

    #[test]
    fn endpoint_joins_base_url_without_double_slash() {
        assert_eq!(
            HttpTransport::new("http://127.0.0.1:3000/").endpoint(),
            "http://127.0.0.1:3000/api/data"
        );
        assert_eq!(
            HttpTransport::new(" http://localhost:8080 ").endpoint(),
            "http://localhost:8080/api/data"
        );
    }
}

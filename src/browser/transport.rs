use async_trait::async_trait;
use gloo_net::http::Request;
use web_sys::RequestCredentials;

use crate::api::{ApiRequest, ApiResponse, Method, Transport, TransportError};

/// `fetch` through `gloo-net`. The body is read eagerly so responses can be
/// inspected more than once.
pub struct GlooTransport;

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
            Method::Put => Request::put(&request.url),
            Method::Delete => Request::delete(&request.url),
        }
        .credentials(RequestCredentials::Include);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let sent = match request.body {
            Some(body) => builder
                .body(body)
                .map_err(|error| TransportError::Build(error.to_string()))?
                .send()
                .await,
            None => builder.send().await,
        };
        let response = sent.map_err(|error| TransportError::Network(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| TransportError::Body(error.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}

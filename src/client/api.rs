//! HTTP transport to the API Gateway

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::{config::ClientConfig, models::NewBook};

/// Failure of a single request to the API Gateway
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Invalid API URL: {0}. Make sure the server is running and the API base URL is set correctly.")]
    InvalidUrl(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Network(String),

    #[error("{status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Failed to create HTTP client: {0}")]
    Setup(String),

    #[error("Request aborted: {0}")]
    Aborted(String),
}

impl ClientError {
    fn timeout(base_url: &Url, after: Duration) -> Self {
        ClientError::Timeout(format!(
            "Request timeout. The server at {base} did not respond within {secs} seconds.\
             \n1. Make sure the server is running\
             \n2. Check server logs for errors\
             \n3. Verify the server is accessible: curl {base}api/shelves\
             \n4. Check firewall settings on your computer",
            base = base_url,
            secs = after.as_secs(),
        ))
    }

    fn network(base_url: &Url, attempted: &Url) -> Self {
        ClientError::Network(format!(
            "Network request failed.\
             \n1. Make sure the server is running\
             \n2. Verify the server is listening on port {port}\
             \n3. Test connectivity: curl {base}api/shelves\
             \n4. Check the firewall allows port {port}\
             \n5. Verify the API base URL points at this computer\
             \n6. Ensure device and computer are on the same network\
             \n\nAttempted URL: {attempted}",
            base = base_url,
            port = base_url.port_or_known_default().unwrap_or(80),
            attempted = attempted,
        ))
    }

    /// True when the server answered with the given status
    pub fn is_status(&self, code: u16) -> bool {
        matches!(self, ClientError::Status { status, .. } if *status == code)
    }
}

/// The `error` field of a gateway error body, if the body is one
fn gateway_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .map(str::to_string)
}

/// Requests the catalog store makes. Records come back as raw JSON and are
/// normalized by [`crate::client::wire`] at the store boundary.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_shelves(&self) -> Result<Vec<Value>, ClientError>;
    async fn list_books(&self) -> Result<Vec<Value>, ClientError>;
    async fn create_book(&self, data: &NewBook) -> Result<Value, ClientError>;
    async fn delete_book(&self, id: &str) -> Result<(), ClientError>;
    async fn update_book_notes(&self, id: &str, notes: &str) -> Result<Value, ClientError>;
    async fn update_book_read_status(&self, id: &str, is_read: bool) -> Result<Value, ClientError>;
    async fn update_book_shelf(&self, id: &str, shelf_id: &str) -> Result<Value, ClientError>;
    async fn create_shelf(&self, name: &str) -> Result<Value, ClientError>;
    async fn delete_shelf(&self, id: &str) -> Result<(), ClientError>;
    async fn clear_library(&self) -> Result<(), ClientError>;
}

/// `reqwest` implementation of [`CatalogApi`]
#[derive(Clone)]
pub struct HttpCatalogApi {
    client: Client,
    base_url: Url,
    request_timeout: Duration,
    connectivity_timeout: Duration,
}

impl HttpCatalogApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base = config.resolved_base_url();
        let base_url = Url::parse(&base).map_err(|_| ClientError::InvalidUrl(base.clone()))?;
        let client = Client::builder()
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;

        tracing::info!("[Config] API base URL: {}", base_url);

        Ok(Self {
            client,
            base_url,
            request_timeout: config.request_timeout(),
            connectivity_timeout: config.connectivity_timeout(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, route: &str) -> Result<Url, ClientError> {
        let route = if route.starts_with('/') {
            route.to_string()
        } else {
            format!("/{}", route)
        };
        self.base_url
            .join(&route)
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))
    }

    fn classify(&self, err: reqwest::Error, url: &Url, after: Duration) -> ClientError {
        if err.is_timeout() {
            ClientError::timeout(&self.base_url, after)
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::network(&self.base_url, url)
        }
    }

    async fn send(&self, method: Method, route: &str, body: Option<Value>) -> Result<Response, ClientError> {
        let url = self.endpoint(route)?;
        tracing::debug!("[API] {} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .timeout(self.request_timeout);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, %method, %url, "API request error");
            self.classify(e, &url, self.request_timeout)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let body = match gateway_message(&text) {
            Some(message) => message,
            None if text.is_empty() => status.canonical_reason().unwrap_or_default().to_string(),
            None => text,
        };
        tracing::warn!(status = status.as_u16(), %url, "API request rejected");
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn send_json(&self, method: Method, route: &str, body: Option<Value>) -> Result<Value, ClientError> {
        let response = self.send(method, route, body).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn send_list(&self, route: &str) -> Result<Vec<Value>, ClientError> {
        match self.send_json(Method::GET, route, None).await? {
            Value::Array(items) => Ok(items),
            other => Err(ClientError::Decode(format!("expected an array, got {}", other))),
        }
    }

    /// Quick GET against the shelves endpoint with the short probe timeout
    pub async fn check_connectivity(&self) -> bool {
        let url = match self.endpoint("/api/shelves") {
            Ok(url) => url,
            Err(_) => return false,
        };
        tracing::info!("[Connectivity Test] Testing connection to {}", url);

        match self
            .client
            .get(url)
            .timeout(self.connectivity_timeout)
            .send()
            .await
        {
            Ok(response) => {
                tracing::info!("[Connectivity Test] Success! Status: {}", response.status());
                response.status().is_success()
            }
            Err(e) => {
                tracing::error!("[Connectivity Test] Failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list_shelves(&self) -> Result<Vec<Value>, ClientError> {
        self.send_list("/api/shelves").await
    }

    async fn list_books(&self) -> Result<Vec<Value>, ClientError> {
        self.send_list("/api/books").await
    }

    async fn create_book(&self, data: &NewBook) -> Result<Value, ClientError> {
        let body = serde_json::to_value(data).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.send_json(Method::POST, "/api/books", Some(body)).await
    }

    async fn delete_book(&self, id: &str) -> Result<(), ClientError> {
        self.send(Method::DELETE, &format!("/api/books/{}", id), None).await?;
        Ok(())
    }

    async fn update_book_notes(&self, id: &str, notes: &str) -> Result<Value, ClientError> {
        self.send_json(
            Method::PATCH,
            &format!("/api/books/{}/notes", id),
            Some(json!({ "notes": notes })),
        )
        .await
    }

    async fn update_book_read_status(&self, id: &str, is_read: bool) -> Result<Value, ClientError> {
        self.send_json(
            Method::PATCH,
            &format!("/api/books/{}/read-status", id),
            Some(json!({ "isRead": is_read })),
        )
        .await
    }

    async fn update_book_shelf(&self, id: &str, shelf_id: &str) -> Result<Value, ClientError> {
        self.send_json(
            Method::PATCH,
            &format!("/api/books/{}/shelf", id),
            Some(json!({ "shelfId": shelf_id })),
        )
        .await
    }

    async fn create_shelf(&self, name: &str) -> Result<Value, ClientError> {
        self.send_json(Method::POST, "/api/shelves", Some(json!({ "name": name })))
            .await
    }

    async fn delete_shelf(&self, id: &str) -> Result<(), ClientError> {
        self.send(Method::DELETE, &format!("/api/shelves/{}", id), None).await?;
        Ok(())
    }

    async fn clear_library(&self) -> Result<(), ClientError> {
        self.send(Method::DELETE, "/api/library", None).await?;
        Ok(())
    }
}

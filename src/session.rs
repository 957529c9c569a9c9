use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{Credentials, Endpoints, Settings};
use crate::error::HarvestError;

/// The two calls the harvest stages make against the backend.
///
/// Any transport error or non-2xx status comes back as `Err`; callers decide
/// whether to absorb it.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Search products by term. Returns the decoded JSON body, whatever its shape.
    async fn search(&self, term: &str) -> Result<Value>;

    /// Marketing price for a product id, trimmed.
    async fn price(&self, id: &str) -> Result<String>;
}

/// Logged-in HTTP session. Cookies from the handshake ride along on every request.
pub struct Session {
    client: Client,
    endpoints: Endpoints,
}

impl Session {
    /// Two-step login: post the user alone, then user + password.
    /// Only the second response has to be 2xx.
    pub async fn authenticate(
        creds: &Credentials,
        endpoints: &Endpoints,
        settings: &Settings,
    ) -> Result<Self, HarvestError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(settings.request_timeout)
            .build()
            .map_err(HarvestError::authentication)?;

        let session = Self {
            client,
            endpoints: endpoints.clone(),
        };

        // On failure `session` drops here, releasing the client.
        session
            .login(creds)
            .await
            .map_err(HarvestError::authentication)?;

        info!("[LOGIN] Logged in successfully as {}", creds.username);
        Ok(session)
    }

    async fn login(&self, creds: &Credentials) -> Result<()> {
        debug!("Login step 1: {}", self.endpoints.login);
        self.client
            .post(&self.endpoints.login)
            .form(&[("user", creds.username.as_str())])
            .send()
            .await
            .context("login step 1 request failed")?;

        debug!("Login step 2: {}", self.endpoints.login);
        self.client
            .post(&self.endpoints.login)
            .form(&[
                ("user", creds.username.as_str()),
                ("password", creds.password.as_str()),
            ])
            .send()
            .await
            .context("login step 2 request failed")?
            .error_for_status()?;

        Ok(())
    }

    /// End the session. Consumes it, so it can only happen once.
    pub fn close(self) {}
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("Session released");
    }
}

#[async_trait]
impl CatalogApi for Session {
    async fn search(&self, term: &str) -> Result<Value> {
        let body = self
            .client
            .post(&self.endpoints.search)
            .form(&[("param", term)])
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        serde_json::from_slice(&body).with_context(|| format!("search '{}' returned invalid JSON", term))
    }

    async fn price(&self, id: &str) -> Result<String> {
        let text = self
            .client
            .post(&self.endpoints.price)
            .form(&[("id", id)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text.trim().to_string())
    }
}

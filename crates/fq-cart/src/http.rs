//! HTTP cart client
//!
//! Speaks the storefront's AJAX cart endpoints:
//! - `GET  {base}/cart.js` for the snapshot
//! - `POST {base}/cart/change.js` for line changes

use crate::error::CartError;
use crate::service::CartService;
use crate::types::{Cart, ChangeLine};
use reqwest::header::ACCEPT;
use std::time::Duration;
use url::Url;

const CART_PATH: &str = "cart.js";
const CHANGE_PATH: &str = "cart/change.js";

/// Cart service backed by a storefront's HTTP endpoints
#[derive(Debug, Clone)]
pub struct HttpCartService {
    client: reqwest::Client,
    cart_url: Url,
    change_url: Url,
}

impl HttpCartService {
    /// Create client for a storefront
    ///
    /// # Arguments
    /// * `base_url` - Storefront root, e.g. `https://shop.example/`
    /// * `timeout` - Per-request timeout
    ///
    /// # Errors
    /// - `CartError::InvalidBaseUrl` if the base cannot hold endpoint paths
    /// - `CartError::Transport` if the HTTP client cannot be built
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CartError> {
        let (cart_url, change_url) = endpoints(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CartError::transport(&e))?;

        Ok(Self {
            client,
            cart_url,
            change_url,
        })
    }

    /// Snapshot endpoint
    #[inline]
    #[must_use]
    pub fn cart_url(&self) -> &Url {
        &self.cart_url
    }

    /// Change endpoint
    #[inline]
    #[must_use]
    pub fn change_url(&self) -> &Url {
        &self.change_url
    }

    async fn read_snapshot(response: reqwest::Response) -> Result<Cart, CartError> {
        let status = response.status();
        if !status.is_success() {
            return Err(CartError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CartError::transport(&e))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait::async_trait]
impl CartService for HttpCartService {
    async fn fetch_cart(&self) -> Result<Cart, CartError> {
        tracing::debug!(url = %self.cart_url, "fetching cart");

        let response = self
            .client
            .get(self.cart_url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| CartError::transport(&e))?;

        Self::read_snapshot(response).await
    }

    async fn change_line(&self, change: ChangeLine) -> Result<Cart, CartError> {
        tracing::debug!(url = %self.change_url, key = %change.id, "changing cart line");

        let response = self
            .client
            .post(self.change_url.clone())
            .header(ACCEPT, "application/json")
            .json(&change)
            .send()
            .await
            .map_err(|e| CartError::transport(&e))?;

        Self::read_snapshot(response).await
    }
}

/// Resolve both endpoints against a storefront root
///
/// A base without a trailing slash is treated as a directory so that a
/// storefront mounted under a path prefix keeps that prefix.
fn endpoints(base_url: &str) -> Result<(Url, Url), CartError> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }

    let base =
        Url::parse(&base).map_err(|e| CartError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
    if base.cannot_be_a_base() {
        return Err(CartError::InvalidBaseUrl(base_url.to_string()));
    }

    let join = |path: &str| {
        base.join(path)
            .map_err(|e| CartError::InvalidBaseUrl(format!("{base_url}: {e}")))
    };
    Ok((join(CART_PATH)?, join(CHANGE_PATH)?))
}

//! Cart service seam
//!
//! The reconciliation core talks to the cart only through this trait, so the
//! HTTP client can be swapped for scripted or mocked carts in tests.

use crate::error::CartError;
use crate::types::{Cart, ChangeLine};
use std::sync::Arc;

/// Remote cart operations
///
/// Both operations return a full cart snapshot. Implementations must not
/// retry on their own; recovery is the caller's decision.
#[async_trait::async_trait]
pub trait CartService: Send + Sync {
    /// Read the current cart
    async fn fetch_cart(&self) -> Result<Cart, CartError>;

    /// Change one line and return the resulting cart
    async fn change_line(&self, change: ChangeLine) -> Result<Cart, CartError>;
}

#[async_trait::async_trait]
impl<T: CartService + ?Sized> CartService for Arc<T> {
    async fn fetch_cart(&self) -> Result<Cart, CartError> {
        (**self).fetch_cart().await
    }

    async fn change_line(&self, change: ChangeLine) -> Result<Cart, CartError> {
        (**self).change_line(change).await
    }
}

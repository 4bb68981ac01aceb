//! Remote cart model for fractional-quantity purchases
//!
//! The storefront cart is the source of truth. This crate only describes it:
//! - Cart snapshots and lines as the cart service returns them
//! - The "Units" property convention that marks a line as fractional
//! - The match rule that binds a product/variant pair to one cart line
//! - The `CartService` seam and its HTTP implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use fq_cart::{CartService, HttpCartService, ProductId, VariantId};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), fq_cart::CartError> {
//! let service = HttpCartService::new("https://shop.example/", Duration::from_secs(10))?;
//! let cart = service.fetch_cart().await?;
//!
//! if let Some(line) = cart.find_fractional(ProductId(100), VariantId(10)) {
//!     println!("{} units under key {}", line.units().unwrap_or("?"), line.key);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod http;
pub mod service;
pub mod types;

pub use error::CartError;
pub use http::HttpCartService;
pub use service::CartService;
pub use types::{Cart, CartLine, ChangeLine, LineKey, ProductId, Properties, VariantId, UNITS};

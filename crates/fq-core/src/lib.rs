//! Fractional quantity form core
//!
//! Keeps one product form in step with a remote cart that can change under
//! it:
//! - Clamps the fractional field to its minimum
//! - Looks the current product/variant up in the cart
//! - Switches the form between add and update presentation
//! - Pushes updates and follows the line key the cart hands back
//! - Resynchronizes from the cart whenever an update fails
//!
//! # Example
//!
//! ```rust,ignore
//! use fq_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(cart: Arc<dyn fq_cart::CartService>) {
//! let page = Arc::new(
//!     MemoryForm::builder()
//!         .product("100")
//!         .variant("10")
//!         .section("main")
//!         .fractional_input("1", Some("0.01"))
//!         .build(),
//! );
//! let drawer = Arc::new(RecordingDrawer::new());
//!
//! if let Some(component) = FractionalQuantity::new(StorefrontConfig::new(), cart, page, drawer) {
//!     let bus = VariantBus::default();
//!     let bridge = EventBridge::attach(Arc::new(component), &bus);
//!     bridge.dispatch(FormEvent::UpdateActivated);
//!     bridge.detach().await;
//! }
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod bridge;
pub mod component;
pub mod config;
pub mod context;
pub mod drawer;
pub mod error;
pub mod mode;
pub mod surface;
pub mod validator;

pub use bridge::{BridgeHandle, EventBridge, FormEvent, VariantBus};
pub use component::FractionalQuantity;
pub use config::StorefrontConfig;
pub use context::{ProductContext, SectionId, VariantChange};
pub use drawer::{CartDrawer, RecordingDrawer};
pub use error::ConfigError;
pub use mode::{ControlPhase, FormMode, FormState};
pub use surface::{ControlState, ElementId, FormSurface, MemoryForm, PageAnchors};
pub use validator::{validate, Validation, DEFAULT_MIN};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosting the form core
    pub use crate::{
        CartDrawer, EventBridge, FormEvent, FormMode, FormSurface, FractionalQuantity,
        MemoryForm, RecordingDrawer, StorefrontConfig, VariantBus, VariantChange,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

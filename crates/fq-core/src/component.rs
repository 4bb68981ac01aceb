//! Fractional quantity component
//!
//! Owns the product context and the form's line binding, and runs the two
//! remote round trips:
//! - Cart lookup: read the cart, reset, rebind if a matching line exists
//! - Update: change the bound line, follow its key, open the drawer
//!
//! Lookups are stamped with a generation. Only the completion of the latest
//! lookup may touch the form; an older one that lands late is dropped.

use crate::config::StorefrontConfig;
use crate::context::{ProductContext, VariantChange};
use crate::drawer::CartDrawer;
use crate::mode::{ControlPhase, FormMode, FormState};
use crate::surface::FormSurface;
use crate::validator::{self, Validation};
use fq_cart::{CartService, ChangeLine, LineKey};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug)]
struct Shared {
    context: ProductContext,
    form: FormState,
    generation: u64,
}

/// Form core for one product section
pub struct FractionalQuantity {
    config: StorefrontConfig,
    cart: Arc<dyn CartService>,
    surface: Arc<dyn FormSurface>,
    drawer: Arc<dyn CartDrawer>,
    shared: Mutex<Shared>,
}

impl std::fmt::Debug for FractionalQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FractionalQuantity")
            .field("config", &self.config)
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

impl FractionalQuantity {
    /// Create the component for a page
    ///
    /// Returns `None` when the page lacks the fractional input or a numeric
    /// product id. The page then keeps its plain add-to-cart behaviour.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        cart: Arc<dyn CartService>,
        surface: Arc<dyn FormSurface>,
        drawer: Arc<dyn CartDrawer>,
    ) -> Option<Self> {
        let anchors = surface.anchors();
        let Some(context) = ProductContext::from_anchors(&anchors) else {
            tracing::debug!(?anchors, "fractional form anchors missing; component inert");
            return None;
        };

        tracing::debug!(
            product = %context.product_id(),
            variant = ?context.variant_id(),
            "fractional form attached"
        );

        Some(Self {
            config,
            cart,
            surface,
            drawer,
            shared: Mutex::new(Shared {
                context,
                form: FormState::new(),
                generation: 0,
            }),
        })
    }

    /// Current product context
    #[must_use]
    pub fn context(&self) -> ProductContext {
        self.shared.lock().context.clone()
    }

    /// Current form mode
    #[must_use]
    pub fn mode(&self) -> FormMode {
        self.shared.lock().form.mode()
    }

    /// Key of the bound cart line
    #[must_use]
    pub fn cart_item_key(&self) -> Option<LineKey> {
        self.shared.lock().form.cart_item_key().cloned()
    }

    /// Phase of the update control, if one exists
    #[must_use]
    pub fn control_phase(&self) -> Option<ControlPhase> {
        self.shared.lock().form.control_phase()
    }

    /// Generation of the latest cart lookup
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.shared.lock().generation
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Clamp the fractional field to its minimum
    pub fn validate_input(&self) {
        let raw = self.surface.fractional_value();
        let min = self.surface.fractional_min();
        if let Validation::Clamped { value } =
            validator::validate(&raw, min.as_deref(), self.config.default_min)
        {
            tracing::debug!(%raw, %value, "fractional input clamped");
            self.surface.set_fractional_value(&value);
        }
    }

    /// Tear the form down to add-to-cart
    pub fn reset_form(&self) {
        self.shared.lock().form.reset_form(&*self.surface);
    }

    /// Follow a variant switch without touching the cart
    pub fn apply_variant_change(&self, change: VariantChange) {
        self.shared.lock().context.apply_variant_change(change);
    }

    /// Follow a variant switch and look the new variant up
    pub async fn handle_variant_change(&self, change: VariantChange) {
        self.apply_variant_change(change);
        self.refresh_from_cart().await;
    }

    /// Resynchronize the form with the remote cart
    ///
    /// A failed read leaves the form in add-to-cart mode.
    pub async fn refresh_from_cart(&self) {
        let generation = {
            let mut shared = self.shared.lock();
            shared.generation += 1;
            shared.generation
        };

        let result = self.cart.fetch_cart().await;

        let mut shared = self.shared.lock();
        if shared.generation != generation {
            tracing::debug!(
                generation,
                latest = shared.generation,
                "discarding stale cart lookup"
            );
            return;
        }

        let Shared { context, form, .. } = &mut *shared;
        form.reset_form(&*self.surface);

        match result {
            Ok(cart) => {
                if let Some(line) = context.find_line(&cart) {
                    form.enter_update_mode(&*self.surface, line, &self.config.update_label);
                    tracing::info!(
                        key = %line.key,
                        units = line.units().unwrap_or_default(),
                        "form bound to existing cart line"
                    );
                }
            }
            Err(error) => {
                tracing::warn!(%error, "failed to fetch cart; form left in add mode");
            }
        }
    }

    /// Push the field's amount to the bound cart line
    ///
    /// No-op when the form is unbound or an update is already in flight. On
    /// failure the control is restored first and the form is then rebuilt
    /// from a fresh cart lookup.
    pub async fn submit_update(&self) {
        let (key, control, units) = {
            let mut shared = self.shared.lock();
            let Some((key, control)) = shared.form.begin_update(&*self.surface) else {
                tracing::debug!("update activation ignored");
                return;
            };
            (key, control, self.surface.fractional_value())
        };

        let change = ChangeLine::units(key.clone(), self.config.line_quantity, units);
        match self.cart.change_line(change).await {
            Ok(cart) => {
                {
                    let mut shared = self.shared.lock();
                    let Shared { context, form, .. } = &mut *shared;
                    if form.finish_update(&*self.surface, control, &self.config.update_label) {
                        if let Some(line) = context.find_line(&cart) {
                            form.reanchor(&*self.surface, line.key.clone());
                        }
                    } else {
                        tracing::debug!(%key, "form rebound while update was in flight");
                    }
                }

                tracing::info!(%key, "cart line updated");
                self.drawer.open(&cart);
                self.surface.set_heading_text(&self.config.updated_heading);
            }
            Err(error) => {
                tracing::warn!(%key, %error, "failed to update cart line; resynchronizing");
                self.shared
                    .lock()
                    .form
                    .finish_update(&*self.surface, control, &self.config.update_label);
                self.refresh_from_cart().await;
            }
        }
    }
}

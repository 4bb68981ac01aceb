//! Page surface seam
//!
//! The product page is a collaborator: the core never assumes a DOM, it only
//! asks the surface to read anchors, read and write the fractional field, and
//! create or remove the few elements it owns.

pub mod memory;

pub use memory::{MemoryForm, MemoryFormBuilder};

use fq_cart::LineKey;

/// Class names and element ids of the storefront theme
pub mod selectors {
    /// Fractional input id for a section
    #[must_use]
    pub fn fractional_input_id(section: &str) -> String {
        format!("FractionalQuantity-{section}")
    }

    /// Product form id for a section
    #[must_use]
    pub fn product_form_id(section: &str) -> String {
        format!("product-form-{section}")
    }

    /// Form class marking update mode
    pub const UPDATE_MODE_CLASS: &str = "fractional-update-mode";
    /// Primary add-to-cart control
    pub const SUBMIT: &str = ".product-form__submit";
    /// Express checkout block
    pub const DYNAMIC_CHECKOUT: &str = ".shopify-payment-button";
    /// Container the update control is inserted after
    pub const QUANTITY_CONTAINER: &str = ".product-form__quantity";
    /// Classes of the status message blocks cleared on reset
    pub const STATUS_MESSAGE_CLASSES: [&str; 2] =
        ["update-success-message", "update-error-message"];

    /// Whether an element class marks a status message block
    #[must_use]
    pub fn is_status_message(class: &str) -> bool {
        STATUS_MESSAGE_CLASSES.contains(&class)
    }
    /// Classes of the injected update control
    pub const UPDATE_CONTROL_CLASSES: [&str; 5] = [
        "update-cart-button",
        "button",
        "button--full-width",
        "product-form__submit",
        "cart-update",
    ];
    /// Class of the injected hidden key input
    pub const KEY_FIELD_CLASS: &str = "cart-item-key-input";
    /// Name of the injected hidden key input
    pub const KEY_FIELD_NAME: &str = "cartItemKey";
    /// Cart drawer heading whose text is rewritten after an update
    pub const CART_HEADING: &str = ".cart-notification__heading";
    /// Loading class on the update control
    pub const LOADING_CLASS: &str = "loading";
}

/// Handle of an element the core created on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw identifiers read from the page at construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAnchors {
    /// `data-product-id` of the product block
    pub product_id: Option<String>,
    /// Value of the form's `id` input
    pub variant_id: Option<String>,
    /// `data-section` of the product section
    pub section_id: Option<String>,
    /// Whether the section's fractional input exists
    pub has_fractional_input: bool,
}

/// Presentation of the update control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    /// Whether activation is blocked
    pub disabled: bool,
    /// Whether the loading indicator is shown
    pub loading: bool,
    /// Visible label
    pub label: String,
}

impl ControlState {
    /// Enabled control showing its label
    #[inline]
    #[must_use]
    pub fn idle(label: impl Into<String>) -> Self {
        Self {
            disabled: false,
            loading: false,
            label: label.into(),
        }
    }

    /// Disabled control showing only the loading indicator
    #[inline]
    #[must_use]
    pub fn loading() -> Self {
        Self {
            disabled: true,
            loading: true,
            label: String::new(),
        }
    }
}

/// Product page as seen by the form core
///
/// All methods take `&self`; implementations synchronize internally. Calls on
/// elements that no longer exist are no-ops.
pub trait FormSurface: Send + Sync {
    /// Read the page anchors
    fn anchors(&self) -> PageAnchors;

    /// Current fractional field text
    fn fractional_value(&self) -> String;

    /// Overwrite fractional field text
    fn set_fractional_value(&self, value: &str);

    /// Field's `min` attribute
    fn fractional_min(&self) -> Option<String>;

    /// Toggle the update-mode class on the product form
    fn set_update_marker(&self, on: bool);

    /// Show or hide the primary add-to-cart control
    fn set_submit_visible(&self, visible: bool);

    /// Show or hide the express checkout block, if the page has one
    fn set_dynamic_checkout_visible(&self, visible: bool);

    /// Remove every update status message
    fn clear_status_messages(&self);

    /// Insert the update control after the quantity container
    fn insert_update_control(&self, state: &ControlState) -> ElementId;

    /// Restyle the update control
    fn set_control_state(&self, control: ElementId, state: &ControlState);

    /// Append the hidden key input to the product form
    fn insert_key_field(&self, key: &LineKey) -> ElementId;

    /// Rewrite the hidden key input
    fn set_key_field(&self, field: ElementId, key: &LineKey);

    /// Remove an element the core created
    fn remove_element(&self, element: ElementId);

    /// Replace the cart heading text, keeping its icon
    fn set_heading_text(&self, text: &str);
}

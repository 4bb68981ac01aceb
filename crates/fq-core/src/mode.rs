//! Form mode controller
//!
//! The form is either selling a new line or bound to an existing one. Being
//! bound means owning three things at once: the cached line key, the update
//! control and the hidden key field. They live together in `LinkedState`, so
//! none of them can exist without the others, and `reset_form` is the only
//! way to drop them.

use crate::surface::{ControlState, ElementId, FormSurface};
use fq_cart::{CartLine, LineKey};

/// Presentation mode of the product form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormMode {
    /// Default add-to-cart presentation
    New,
    /// Bound to an existing cart line
    Updating,
}

/// Activity of the update control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPhase {
    /// Ready for activation
    Idle,
    /// A change request is in flight
    Loading,
}

/// Update control owned by the form
#[derive(Debug)]
struct UpdateControl {
    element: ElementId,
    phase: ControlPhase,
}

/// Binding to an existing cart line
#[derive(Debug)]
struct LinkedState {
    key: LineKey,
    control: UpdateControl,
    key_field: ElementId,
}

/// Line-binding state of one product form
#[derive(Debug, Default)]
pub struct FormState {
    linked: Option<LinkedState>,
}

impl FormState {
    /// Create unbound state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> FormMode {
        if self.linked.is_some() {
            FormMode::Updating
        } else {
            FormMode::New
        }
    }

    /// Key of the bound line
    #[inline]
    #[must_use]
    pub fn cart_item_key(&self) -> Option<&LineKey> {
        self.linked.as_ref().map(|l| &l.key)
    }

    /// Phase of the update control, if one exists
    #[inline]
    #[must_use]
    pub fn control_phase(&self) -> Option<ControlPhase> {
        self.linked.as_ref().map(|l| l.control.phase)
    }

    /// Tear the form back down to add-to-cart
    ///
    /// Safe in any state; elements that are already gone are skipped.
    pub fn reset_form(&mut self, surface: &dyn FormSurface) {
        surface.set_update_marker(false);
        surface.set_dynamic_checkout_visible(true);
        surface.set_submit_visible(true);
        surface.clear_status_messages();

        if let Some(linked) = self.linked.take() {
            surface.remove_element(linked.key_field);
            surface.remove_element(linked.control.element);
            tracing::debug!(key = %linked.key, "form unbound from cart line");
        }
    }

    /// Bind the form to a fractional cart line
    ///
    /// Any previous binding is torn down first, so the page never holds more
    /// than one update control or key field.
    pub fn enter_update_mode(&mut self, surface: &dyn FormSurface, line: &CartLine, label: &str) {
        if self.linked.is_some() {
            self.reset_form(surface);
        }

        if let Some(units) = line.units() {
            surface.set_fractional_value(units);
        }
        surface.set_update_marker(true);
        surface.set_dynamic_checkout_visible(false);
        surface.set_submit_visible(false);

        let control = surface.insert_update_control(&ControlState::idle(label));
        let key_field = surface.insert_key_field(&line.key);

        self.linked = Some(LinkedState {
            key: line.key.clone(),
            control: UpdateControl {
                element: control,
                phase: ControlPhase::Idle,
            },
            key_field,
        });
    }

    /// Move the update control to loading
    ///
    /// Returns the key to change and the control to restore afterwards, or
    /// `None` when the form is unbound or an update is already in flight.
    pub fn begin_update(&mut self, surface: &dyn FormSurface) -> Option<(LineKey, ElementId)> {
        let linked = self.linked.as_mut()?;
        if linked.control.phase == ControlPhase::Loading {
            return None;
        }

        linked.control.phase = ControlPhase::Loading;
        surface.set_control_state(linked.control.element, &ControlState::loading());
        Some((linked.key.clone(), linked.control.element))
    }

    /// Return the update control to idle
    ///
    /// Returns `false` when the control was replaced or removed while the
    /// request was in flight; the current binding is then left untouched.
    pub fn finish_update(
        &mut self,
        surface: &dyn FormSurface,
        control: ElementId,
        label: &str,
    ) -> bool {
        match self.linked.as_mut() {
            Some(linked) if linked.control.element == control => {
                linked.control.phase = ControlPhase::Idle;
                surface.set_control_state(control, &ControlState::idle(label));
                true
            }
            _ => false,
        }
    }

    /// Follow the bound line to a new key
    pub fn reanchor(&mut self, surface: &dyn FormSurface, key: LineKey) {
        let Some(linked) = self.linked.as_mut() else {
            return;
        };
        if linked.key == key {
            return;
        }

        tracing::debug!(from = %linked.key, to = %key, "cart line key rotated");
        surface.set_key_field(linked.key_field, &key);
        linked.key = key;
    }
}

//! In-memory product page
//!
//! Models just enough of the storefront's product section to host the form
//! core without a browser: section-keyed inputs, the product form's class
//! list, visibility of the purchase controls, and the elements the core
//! injects. Used by the probe binary and by tests.

use super::selectors;
use super::{ControlState, ElementId, FormSurface, PageAnchors};
use fq_cart::LineKey;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};

/// A text input on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    /// Current text
    pub value: String,
    /// `min` attribute
    pub min: Option<String>,
}

/// Element injected by the form core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Injected {
    /// The update button
    UpdateControl {
        /// Class list
        classes: Vec<String>,
        /// Presentation
        state: ControlState,
        /// Selector of the element it follows
        after: String,
    },
    /// The hidden cart key input
    KeyField {
        /// `name` attribute
        name: String,
        /// Class list
        class: String,
        /// Carried key
        value: String,
    },
}

/// Visible page state, without element handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Fractional field text
    pub fractional_value: String,
    /// Product form classes
    pub form_classes: Vec<String>,
    /// Primary submit visibility
    pub submit_visible: bool,
    /// Express checkout visibility, if present
    pub dynamic_checkout_visible: Option<bool>,
    /// Status message classes still on the page
    pub status_messages: Vec<String>,
    /// Update controls in insertion order
    pub update_controls: Vec<ControlState>,
    /// Hidden key values in insertion order
    pub key_fields: Vec<String>,
    /// Cart heading text
    pub heading_text: String,
}

#[derive(Debug, Clone)]
struct Page {
    product_id: Option<String>,
    variant_id: Option<String>,
    section_id: Option<String>,
    inputs: BTreeMap<String, InputField>,
    form_classes: BTreeSet<String>,
    submit_visible: bool,
    dynamic_checkout_visible: Option<bool>,
    status_messages: Vec<String>,
    injected: BTreeMap<ElementId, Injected>,
    heading_icon: Option<String>,
    heading_text: String,
    next_element: u64,
}

impl Page {
    fn fractional(&self) -> Option<&InputField> {
        let section = self.section_id.as_deref()?;
        self.inputs.get(&selectors::fractional_input_id(section))
    }

    fn fractional_mut(&mut self) -> Option<&mut InputField> {
        let id = selectors::fractional_input_id(self.section_id.as_deref()?);
        self.inputs.get_mut(&id)
    }

    fn insert(&mut self, element: Injected) -> ElementId {
        self.next_element += 1;
        let id = ElementId(self.next_element);
        self.injected.insert(id, element);
        id
    }
}

/// In-memory product page
#[derive(Debug)]
pub struct MemoryForm {
    page: Mutex<Page>,
}

impl MemoryForm {
    /// Start describing a page
    #[inline]
    #[must_use]
    pub fn builder() -> MemoryFormBuilder {
        MemoryFormBuilder::default()
    }

    /// Capture visible state
    #[must_use]
    pub fn snapshot(&self) -> PageSnapshot {
        let page = self.page.lock();
        let mut update_controls = Vec::new();
        let mut key_fields = Vec::new();
        for element in page.injected.values() {
            match element {
                Injected::UpdateControl { state, .. } => update_controls.push(state.clone()),
                Injected::KeyField { value, .. } => key_fields.push(value.clone()),
            }
        }

        PageSnapshot {
            fractional_value: page.fractional().map(|f| f.value.clone()).unwrap_or_default(),
            form_classes: page.form_classes.iter().cloned().collect(),
            submit_visible: page.submit_visible,
            dynamic_checkout_visible: page.dynamic_checkout_visible,
            status_messages: page.status_messages.clone(),
            update_controls,
            key_fields,
            heading_text: page.heading_text.clone(),
        }
    }

    /// Injected elements by handle
    #[must_use]
    pub fn injected(&self) -> Vec<(ElementId, Injected)> {
        self.page
            .lock()
            .injected
            .iter()
            .map(|(id, element)| (*id, element.clone()))
            .collect()
    }

    /// Update controls currently on the page
    #[must_use]
    pub fn update_controls(&self) -> Vec<ControlState> {
        self.snapshot().update_controls
    }

    /// Hidden key values currently on the page
    #[must_use]
    pub fn key_fields(&self) -> Vec<String> {
        self.snapshot().key_fields
    }

    /// Whether the product form carries the update-mode class
    #[must_use]
    pub fn has_update_marker(&self) -> bool {
        self.page
            .lock()
            .form_classes
            .contains(selectors::UPDATE_MODE_CLASS)
    }

    /// Cart heading icon and text
    #[must_use]
    pub fn heading(&self) -> (Option<String>, String) {
        let page = self.page.lock();
        (page.heading_icon.clone(), page.heading_text.clone())
    }

    /// Simulate the theme rendering a status message
    pub fn push_status_message(&self, class: impl Into<String>) {
        self.page.lock().status_messages.push(class.into());
    }
}

impl FormSurface for MemoryForm {
    fn anchors(&self) -> PageAnchors {
        let page = self.page.lock();
        PageAnchors {
            product_id: page.product_id.clone(),
            variant_id: page.variant_id.clone(),
            section_id: page.section_id.clone(),
            has_fractional_input: page.fractional().is_some(),
        }
    }

    fn fractional_value(&self) -> String {
        self.page
            .lock()
            .fractional()
            .map(|f| f.value.clone())
            .unwrap_or_default()
    }

    fn set_fractional_value(&self, value: &str) {
        if let Some(field) = self.page.lock().fractional_mut() {
            field.value = value.to_string();
        }
    }

    fn fractional_min(&self) -> Option<String> {
        self.page.lock().fractional().and_then(|f| f.min.clone())
    }

    fn set_update_marker(&self, on: bool) {
        let mut page = self.page.lock();
        if on {
            page.form_classes
                .insert(selectors::UPDATE_MODE_CLASS.to_string());
        } else {
            page.form_classes.remove(selectors::UPDATE_MODE_CLASS);
        }
    }

    fn set_submit_visible(&self, visible: bool) {
        self.page.lock().submit_visible = visible;
    }

    fn set_dynamic_checkout_visible(&self, visible: bool) {
        let mut page = self.page.lock();
        if page.dynamic_checkout_visible.is_some() {
            page.dynamic_checkout_visible = Some(visible);
        }
    }

    fn clear_status_messages(&self) {
        self.page
            .lock()
            .status_messages
            .retain(|class| !selectors::is_status_message(class));
    }

    fn insert_update_control(&self, state: &ControlState) -> ElementId {
        self.page.lock().insert(Injected::UpdateControl {
            classes: selectors::UPDATE_CONTROL_CLASSES
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
            state: state.clone(),
            after: selectors::QUANTITY_CONTAINER.to_string(),
        })
    }

    fn set_control_state(&self, control: ElementId, new_state: &ControlState) {
        if let Some(Injected::UpdateControl { state, .. }) =
            self.page.lock().injected.get_mut(&control)
        {
            *state = new_state.clone();
        }
    }

    fn insert_key_field(&self, key: &LineKey) -> ElementId {
        self.page.lock().insert(Injected::KeyField {
            name: selectors::KEY_FIELD_NAME.to_string(),
            class: selectors::KEY_FIELD_CLASS.to_string(),
            value: key.to_string(),
        })
    }

    fn set_key_field(&self, field: ElementId, key: &LineKey) {
        if let Some(Injected::KeyField { value, .. }) = self.page.lock().injected.get_mut(&field) {
            *value = key.to_string();
        }
    }

    fn remove_element(&self, element: ElementId) {
        self.page.lock().injected.remove(&element);
    }

    fn set_heading_text(&self, text: &str) {
        self.page.lock().heading_text = format!(" {text}");
    }
}

/// Builder for `MemoryForm`
#[derive(Debug, Clone, Default)]
pub struct MemoryFormBuilder {
    product_id: Option<String>,
    variant_id: Option<String>,
    section_id: Option<String>,
    fractional: Option<InputField>,
    dynamic_checkout: bool,
    heading_icon: Option<String>,
    heading_text: String,
}

impl MemoryFormBuilder {
    /// With `data-product-id`
    #[must_use]
    pub fn product(mut self, id: impl Into<String>) -> Self {
        self.product_id = Some(id.into());
        self
    }

    /// With the form's variant `id` input
    #[must_use]
    pub fn variant(mut self, id: impl Into<String>) -> Self {
        self.variant_id = Some(id.into());
        self
    }

    /// With `data-section`
    #[must_use]
    pub fn section(mut self, id: impl Into<String>) -> Self {
        self.section_id = Some(id.into());
        self
    }

    /// With the section's fractional input
    #[must_use]
    pub fn fractional_input(mut self, value: impl Into<String>, min: Option<&str>) -> Self {
        self.fractional = Some(InputField {
            value: value.into(),
            min: min.map(str::to_string),
        });
        self
    }

    /// With an express checkout block
    #[must_use]
    pub fn dynamic_checkout(mut self) -> Self {
        self.dynamic_checkout = true;
        self
    }

    /// With a cart drawer heading
    #[must_use]
    pub fn heading(mut self, icon: impl Into<String>, text: impl Into<String>) -> Self {
        self.heading_icon = Some(icon.into());
        self.heading_text = text.into();
        self
    }

    /// Build the page
    #[must_use]
    pub fn build(self) -> MemoryForm {
        let mut inputs = BTreeMap::new();
        if let (Some(section), Some(field)) = (&self.section_id, self.fractional) {
            inputs.insert(selectors::fractional_input_id(section), field);
        }

        MemoryForm {
            page: Mutex::new(Page {
                product_id: self.product_id,
                variant_id: self.variant_id,
                section_id: self.section_id,
                inputs,
                form_classes: BTreeSet::new(),
                submit_visible: true,
                dynamic_checkout_visible: self.dynamic_checkout.then_some(true),
                status_messages: Vec::new(),
                injected: BTreeMap::new(),
                heading_icon: self.heading_icon,
                heading_text: self.heading_text,
                next_element: 0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> MemoryForm {
        MemoryForm::builder()
            .product("100")
            .variant("10")
            .section("main")
            .fractional_input("1", Some("0.01"))
            .dynamic_checkout()
            .heading("svg:check", " Item added")
            .build()
    }

    #[test]
    fn anchors_resolve_section_input() {
        let anchors = page().anchors();
        assert_eq!(anchors.product_id.as_deref(), Some("100"));
        assert_eq!(anchors.section_id.as_deref(), Some("main"));
        assert!(anchors.has_fractional_input);
    }

    #[test]
    fn input_without_section_is_unreachable() {
        let form = MemoryForm::builder()
            .product("100")
            .fractional_input("1", None)
            .build();
        assert!(!form.anchors().has_fractional_input);
        assert_eq!(form.fractional_value(), "");
    }

    #[test]
    fn injected_elements_lifecycle() {
        let form = page();
        let control = form.insert_update_control(&ControlState::idle("Update"));
        let field = form.insert_key_field(&LineKey::from("abc"));
        assert_eq!(form.injected().len(), 2);

        form.set_control_state(control, &ControlState::loading());
        form.set_key_field(field, &LineKey::from("xyz"));
        assert_eq!(form.update_controls(), vec![ControlState::loading()]);
        assert_eq!(form.key_fields(), vec!["xyz".to_string()]);

        form.remove_element(control);
        form.remove_element(control);
        form.remove_element(field);
        assert!(form.injected().is_empty());
    }

    #[test]
    fn status_messages_cleared_by_class() {
        let form = page();
        form.push_status_message("update-success-message");
        form.push_status_message("shipping-banner");
        form.push_status_message("update-error-message");

        form.clear_status_messages();
        assert_eq!(form.snapshot().status_messages, vec!["shipping-banner"]);
    }

    #[test]
    fn heading_keeps_icon() {
        let form = page();
        form.set_heading_text("Item updated");

        let (icon, text) = form.heading();
        assert_eq!(icon.as_deref(), Some("svg:check"));
        assert_eq!(text, " Item updated");
    }

    #[test]
    fn missing_dynamic_checkout_stays_missing() {
        let form = MemoryForm::builder().section("main").build();
        form.set_dynamic_checkout_visible(true);
        assert_eq!(form.snapshot().dynamic_checkout_visible, None);
    }
}

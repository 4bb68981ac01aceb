//! Product context
//!
//! The identifiers that decide which cart line the form is about. Read once
//! from the page; afterwards only variant-change notifications move them.

use crate::surface::PageAnchors;
use fq_cart::{Cart, CartLine, ProductId, VariantId};
use serde::Deserialize;

/// Theme section hosting the form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionId(String);

impl SectionId {
    /// Borrow the raw section id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Variant switch broadcast by the theme
///
/// Decodes from the notification detail `{"variant": {"id": ...}}`; a detail
/// without a variant is not a variant change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "VariantDetail")]
pub struct VariantChange {
    /// Newly selected variant
    pub variant_id: VariantId,
}

impl VariantChange {
    /// Create notification payload
    #[inline]
    #[must_use]
    pub fn new(variant_id: VariantId) -> Self {
        Self { variant_id }
    }
}

#[derive(Deserialize)]
struct VariantDetail {
    variant: Option<VariantRef>,
}

#[derive(Deserialize)]
struct VariantRef {
    id: VariantId,
}

impl TryFrom<VariantDetail> for VariantChange {
    type Error = &'static str;

    fn try_from(detail: VariantDetail) -> Result<Self, Self::Error> {
        detail
            .variant
            .map(|v| Self::new(v.id))
            .ok_or("variant change without a variant")
    }
}

/// Identifiers of the product the form sells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductContext {
    product_id: ProductId,
    variant_id: Option<VariantId>,
    section_id: Option<SectionId>,
}

impl ProductContext {
    /// Build from page anchors
    ///
    /// Returns `None` when the page lacks the fractional input or a numeric
    /// product id; such a page gets no form behaviour at all. A missing or
    /// unreadable variant is tolerated and simply matches no cart line.
    #[must_use]
    pub fn from_anchors(anchors: &PageAnchors) -> Option<Self> {
        if !anchors.has_fractional_input {
            return None;
        }
        let product_id = anchors.product_id.as_deref()?.parse().ok()?;

        Some(Self {
            product_id,
            variant_id: anchors.variant_id.as_deref().and_then(|v| v.parse().ok()),
            section_id: anchors.section_id.clone().map(SectionId),
        })
    }

    /// Create from known identifiers
    #[inline]
    #[must_use]
    pub fn new(product_id: ProductId, variant_id: Option<VariantId>) -> Self {
        Self {
            product_id,
            variant_id,
            section_id: None,
        }
    }

    /// Product id
    #[inline]
    #[must_use]
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Currently selected variant
    #[inline]
    #[must_use]
    pub fn variant_id(&self) -> Option<VariantId> {
        self.variant_id
    }

    /// Hosting section
    #[inline]
    #[must_use]
    pub fn section_id(&self) -> Option<&SectionId> {
        self.section_id.as_ref()
    }

    /// Follow a variant switch
    #[inline]
    pub fn apply_variant_change(&mut self, change: VariantChange) {
        self.variant_id = Some(change.variant_id);
    }

    /// Fractional line this context is bound to in a snapshot
    #[must_use]
    pub fn find_line<'a>(&self, cart: &'a Cart) -> Option<&'a CartLine> {
        cart.find_fractional(self.product_id, self.variant_id?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fq_cart::{LineKey, Properties};

    fn anchors() -> PageAnchors {
        PageAnchors {
            product_id: Some("100".to_string()),
            variant_id: Some("10".to_string()),
            section_id: Some("main".to_string()),
            has_fractional_input: true,
        }
    }

    #[test]
    fn context_from_complete_anchors() {
        let ctx = ProductContext::from_anchors(&anchors()).unwrap();
        assert_eq!(ctx.product_id(), ProductId(100));
        assert_eq!(ctx.variant_id(), Some(VariantId(10)));
        assert_eq!(ctx.section_id().map(SectionId::as_str), Some("main"));
    }

    #[test]
    fn missing_required_anchors_yield_none() {
        let mut no_input = anchors();
        no_input.has_fractional_input = false;
        assert!(ProductContext::from_anchors(&no_input).is_none());

        let mut no_product = anchors();
        no_product.product_id = None;
        assert!(ProductContext::from_anchors(&no_product).is_none());

        let mut bad_product = anchors();
        bad_product.product_id = Some("gift-card".to_string());
        assert!(ProductContext::from_anchors(&bad_product).is_none());
    }

    #[test]
    fn missing_variant_matches_nothing() {
        let mut no_variant = anchors();
        no_variant.variant_id = None;
        let ctx = ProductContext::from_anchors(&no_variant).unwrap();

        let cart = Cart::new(vec![CartLine {
            key: LineKey::from("abc"),
            product_id: ProductId(100),
            variant_id: VariantId(10),
            quantity: 1,
            properties: Properties::with_units("2.5"),
        }]);
        assert!(ctx.find_line(&cart).is_none());
    }

    #[test]
    fn variant_change_moves_variant_only() {
        let mut ctx = ProductContext::from_anchors(&anchors()).unwrap();
        ctx.apply_variant_change(VariantChange::new(VariantId(11)));

        assert_eq!(ctx.product_id(), ProductId(100));
        assert_eq!(ctx.variant_id(), Some(VariantId(11)));
    }

    #[test]
    fn variant_change_from_notification_detail() {
        let change: VariantChange =
            serde_json::from_str(r#"{"variant": {"id": 11, "title": "500g"}}"#).unwrap();
        assert_eq!(change.variant_id, VariantId(11));

        assert!(serde_json::from_str::<VariantChange>(r#"{"variant": null}"#).is_err());
        assert!(serde_json::from_str::<VariantChange>("{}").is_err());
    }
}

//! Cart snapshot types
//!
//! Mirrors the subset of the storefront cart payload the form cares about:
//! - Opaque line keys
//! - Numeric product and variant identifiers
//! - Free-form line properties, with "Units" carrying the fractional amount

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Line property that carries the fractional amount
pub const UNITS: &str = "Units";

/// Opaque cart line key
///
/// Issued by the cart service. A key is not stable across property changes,
/// so holders must re-read it from the snapshot returned by every mutation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineKey(String);

impl LineKey {
    /// Wrap a key issued by the cart service
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the raw key
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LineKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storefront product identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

/// Storefront variant identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(pub u64);

macro_rules! numeric_id {
    ($ty:ident) => {
        impl FromStr for $ty {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(ProductId);
numeric_id!(VariantId);

/// Line item properties
///
/// The cart service sends `null` for a line without properties and is loose
/// about value types, so decoding accepts both and stringifies scalars.
/// Values a storefront script would read as unset (`null`, `false`, `0`)
/// are dropped while decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
    /// Create empty property set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Property set holding only a fractional amount
    #[inline]
    #[must_use]
    pub fn with_units(units: impl Into<String>) -> Self {
        let mut props = Self::new();
        props.insert(UNITS, units);
        props
    }

    /// Insert or replace a property
    #[inline]
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Look up a property
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Fractional amount, if the line carries a non-empty one
    #[inline]
    #[must_use]
    pub fn units(&self) -> Option<&str> {
        self.get(UNITS).filter(|units| !units.is_empty())
    }

    /// Number of properties
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no properties are set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate properties in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
        let props = raw
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(name, value)| match value {
                serde_json::Value::Null | serde_json::Value::Bool(false) => None,
                serde_json::Value::Number(n) if is_zero(&n) => None,
                serde_json::Value::String(s) => Some((name, s)),
                other => Some((name, other.to_string())),
            })
            .collect();
        Ok(Self(props))
    }
}

#[allow(clippy::float_cmp)]
fn is_zero(n: &serde_json::Number) -> bool {
    n.as_f64() == Some(0.0)
}

/// One line of the remote cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line key
    pub key: LineKey,
    /// Product this line belongs to
    pub product_id: ProductId,
    /// Variant this line belongs to
    pub variant_id: VariantId,
    /// Integer line quantity
    #[serde(default)]
    pub quantity: u32,
    /// Custom line properties
    #[serde(default)]
    pub properties: Properties,
}

impl CartLine {
    /// Fractional amount carried by this line
    #[inline]
    #[must_use]
    pub fn units(&self) -> Option<&str> {
        self.properties.units()
    }

    /// Whether this line is the fractional line for a product/variant pair
    #[inline]
    #[must_use]
    pub fn is_fractional_for(&self, product: ProductId, variant: VariantId) -> bool {
        self.product_id == product && self.variant_id == variant && self.units().is_some()
    }
}

/// Cart snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Lines in cart order
    #[serde(default)]
    pub items: Vec<CartLine>,
}

impl Cart {
    /// Create snapshot from lines
    #[inline]
    #[must_use]
    pub fn new(items: Vec<CartLine>) -> Self {
        Self { items }
    }

    /// First fractional line for a product/variant pair
    ///
    /// The cart is expected to hold at most one such line per variant. When it
    /// holds more, the first in cart order wins.
    #[must_use]
    pub fn find_fractional(&self, product: ProductId, variant: VariantId) -> Option<&CartLine> {
        self.items
            .iter()
            .find(|line| line.is_fractional_for(product, variant))
    }

    /// Whether the cart has no lines
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Change request for one cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeLine {
    /// Key of the line to change
    pub id: LineKey,
    /// New integer line quantity
    pub quantity: u32,
    /// Properties to set on the line
    pub properties: Properties,
}

impl ChangeLine {
    /// Request that rewrites a line's fractional amount
    #[inline]
    #[must_use]
    pub fn units(id: LineKey, quantity: u32, units: impl Into<String>) -> Self {
        Self {
            id,
            quantity,
            properties: Properties::with_units(units),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SNAPSHOT: &str = r#"{
        "token": "c1",
        "item_count": 3,
        "items": [
            {"key": "11:aa", "product_id": 100, "variant_id": 11, "quantity": 1,
             "properties": {"Units": "1.5"}, "title": "Cheddar"},
            {"key": "10:bb", "product_id": 100, "variant_id": 10, "quantity": 2,
             "properties": null},
            {"key": "10:cc", "product_id": 100, "variant_id": 10, "quantity": 1,
             "properties": {"Units": "2.5", "Note": 7}}
        ]
    }"#;

    #[test]
    fn decode_storefront_snapshot() {
        let cart: Cart = serde_json::from_str(SNAPSHOT).unwrap();

        assert_eq!(cart.items.len(), 3);
        assert!(cart.items[1].properties.is_empty());
        assert_eq!(cart.items[2].properties.get("Note"), Some("7"));
        assert_eq!(cart.items[2].units(), Some("2.5"));
    }

    #[test]
    fn find_fractional_matches_product_variant_and_units() {
        let cart: Cart = serde_json::from_str(SNAPSHOT).unwrap();

        let line = cart.find_fractional(ProductId(100), VariantId(10)).unwrap();
        assert_eq!(line.key, LineKey::from("10:cc"));

        assert!(cart.find_fractional(ProductId(101), VariantId(10)).is_none());
        assert!(cart.find_fractional(ProductId(100), VariantId(12)).is_none());
    }

    #[test]
    fn find_fractional_first_match_wins() {
        let line = |key: &str, units: &str| CartLine {
            key: LineKey::from(key),
            product_id: ProductId(1),
            variant_id: VariantId(2),
            quantity: 1,
            properties: Properties::with_units(units),
        };
        let cart = Cart::new(vec![line("first", "1"), line("second", "2")]);

        let found = cart.find_fractional(ProductId(1), VariantId(2)).unwrap();
        assert_eq!(found.key.as_str(), "first");
    }

    #[test]
    fn empty_units_is_not_fractional() {
        let props = Properties::with_units("");
        assert_eq!(props.units(), None);
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn unset_units_values_are_not_fractional() {
        let cart: Cart = serde_json::from_str(
            r#"{"items": [
                {"key": "zero", "product_id": 100, "variant_id": 10, "properties": {"Units": 0}},
                {"key": "off", "product_id": 100, "variant_id": 10, "properties": {"Units": false}},
                {"key": "blank", "product_id": 100, "variant_id": 10, "properties": {"Units": ""}},
                {"key": "real", "product_id": 100, "variant_id": 10, "properties": {"Units": 1.25}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(cart.items[0].units(), None);
        assert_eq!(cart.items[1].units(), None);
        assert_eq!(cart.items[2].units(), None);

        let line = cart.find_fractional(ProductId(100), VariantId(10)).unwrap();
        assert_eq!(line.key.as_str(), "real");
        assert_eq!(line.units(), Some("1.25"));
    }

    #[test]
    fn change_line_wire_shape() {
        let change = ChangeLine::units(LineKey::from("abc"), 1, "3.0");
        let json = serde_json::to_value(&change).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"id": "abc", "quantity": 1, "properties": {"Units": "3.0"}})
        );
    }

    #[test]
    fn numeric_ids_parse_from_page_attributes() {
        assert_eq!(" 100 ".parse::<ProductId>().unwrap(), ProductId(100));
        assert!("abc".parse::<VariantId>().is_err());
        assert_eq!(VariantId(42).to_string(), "42");
    }
}

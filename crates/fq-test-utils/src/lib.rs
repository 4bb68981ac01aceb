//! Testing utilities for the fractional quantity workspace
//!
//! Shared fakes and fixtures: a scripted cart that rotates line keys the way
//! the storefront does, and a ready-made product page.

#![allow(missing_docs)]

use async_trait::async_trait;
use fq_cart::{
    Cart, CartError, CartLine, CartService, ChangeLine, LineKey, ProductId, Properties, VariantId,
};
use fq_core::{FractionalQuantity, MemoryForm, RecordingDrawer, StorefrontConfig};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::oneshot;

pub fn fractional_line(key: &str, product: u64, variant: u64, units: &str) -> CartLine {
    CartLine {
        key: LineKey::from(key),
        product_id: ProductId(product),
        variant_id: VariantId(variant),
        quantity: 1,
        properties: Properties::with_units(units),
    }
}

pub fn plain_line(key: &str, product: u64, variant: u64, quantity: u32) -> CartLine {
    CartLine {
        key: LineKey::from(key),
        product_id: ProductId(product),
        variant_id: VariantId(variant),
        quantity,
        properties: Properties::new(),
    }
}

pub fn product_page(product: u64, variant: u64) -> MemoryForm {
    MemoryForm::builder()
        .product(product.to_string())
        .variant(variant.to_string())
        .section("template--main")
        .fractional_input("1", Some("0.01"))
        .dynamic_checkout()
        .heading("svg:icon-checkmark", " Item added to your cart")
        .build()
}

#[derive(Debug, Default)]
struct Inner {
    lines: Vec<CartLine>,
    revision: u64,
    fetches: usize,
    failing_fetches: usize,
    failing_changes: usize,
    changes: Vec<ChangeLine>,
    paused: bool,
    gates: BTreeMap<usize, oneshot::Sender<()>>,
}

/// In-memory cart with storefront key semantics
///
/// Changing a line's properties issues a new key, unknown keys are rejected
/// with status 400, and quantity 0 removes the line. Fetches can be paused
/// and released one by one to force completion order.
#[derive(Debug, Default)]
pub struct ScriptedCart {
    inner: Mutex<Inner>,
}

impl ScriptedCart {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                lines,
                ..Inner::default()
            }),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Cart {
        Cart::new(self.inner.lock().lines.clone())
    }

    /// Replace cart contents, as another tab would
    pub fn set_lines(&self, lines: Vec<CartLine>) {
        self.inner.lock().lines = lines;
    }

    pub fn fail_next_fetch(&self) {
        self.inner.lock().failing_fetches += 1;
    }

    pub fn fail_next_change(&self) {
        self.inner.lock().failing_changes += 1;
    }

    pub fn fetch_count(&self) -> usize {
        self.inner.lock().fetches
    }

    pub fn changes(&self) -> Vec<ChangeLine> {
        self.inner.lock().changes.clone()
    }

    /// Hold every later fetch until released
    pub fn pause_fetches(&self) {
        self.inner.lock().paused = true;
    }

    /// Let the n-th fetch (1-based) complete
    pub fn release_fetch(&self, n: usize) {
        if let Some(gate) = self.inner.lock().gates.remove(&n) {
            let _ = gate.send(());
        }
    }

    /// Release everything held and stop pausing
    pub fn resume_fetches(&self) {
        let mut inner = self.inner.lock();
        inner.paused = false;
        for (_, gate) in std::mem::take(&mut inner.gates) {
            let _ = gate.send(());
        }
    }

    /// Yield until at least `n` fetches have been issued
    pub async fn wait_for_fetches(&self, n: usize) {
        while self.fetch_count() < n {
            tokio::task::yield_now().await;
        }
    }

    fn scripted_failure() -> CartError {
        CartError::Transport("scripted failure".to_string())
    }
}

#[async_trait]
impl CartService for ScriptedCart {
    async fn fetch_cart(&self) -> Result<Cart, CartError> {
        let (result, gate) = {
            let mut inner = self.inner.lock();
            inner.fetches += 1;
            let result = if inner.failing_fetches > 0 {
                inner.failing_fetches -= 1;
                Err(Self::scripted_failure())
            } else {
                Ok(Cart::new(inner.lines.clone()))
            };

            let gate = if inner.paused {
                let (tx, rx) = oneshot::channel();
                let n = inner.fetches;
                inner.gates.insert(n, tx);
                Some(rx)
            } else {
                None
            };
            (result, gate)
        };

        if let Some(gate) = gate {
            let _ = gate.await;
        }
        result
    }

    async fn change_line(&self, change: ChangeLine) -> Result<Cart, CartError> {
        let mut inner = self.inner.lock();
        inner.changes.push(change.clone());

        if inner.failing_changes > 0 {
            inner.failing_changes -= 1;
            return Err(Self::scripted_failure());
        }

        let Some(idx) = inner.lines.iter().position(|l| l.key == change.id) else {
            return Err(CartError::Status { status: 400 });
        };

        if change.quantity == 0 {
            inner.lines.remove(idx);
        } else {
            inner.revision += 1;
            let revision = inner.revision;
            let line = &mut inner.lines[idx];
            line.quantity = change.quantity;
            if line.properties != change.properties {
                line.properties = change.properties;
                line.key = LineKey::new(format!("{}:r{revision}", line.variant_id));
            }
        }

        Ok(Cart::new(inner.lines.clone()))
    }
}

/// Component wired to a scripted cart, a product page and a recording drawer
pub struct Harness {
    pub cart: Arc<ScriptedCart>,
    pub page: Arc<MemoryForm>,
    pub drawer: Arc<RecordingDrawer>,
    pub component: Arc<FractionalQuantity>,
}

impl Harness {
    pub fn new(lines: Vec<CartLine>, product: u64, variant: u64) -> Self {
        Self::with_page(lines, product_page(product, variant))
    }

    pub fn with_page(lines: Vec<CartLine>, page: MemoryForm) -> Self {
        let cart = Arc::new(ScriptedCart::new(lines));
        let page = Arc::new(page);
        let drawer = Arc::new(RecordingDrawer::new());
        let component = FractionalQuantity::new(
            StorefrontConfig::default(),
            cart.clone(),
            page.clone(),
            drawer.clone(),
        )
        .expect("fixture page carries all anchors");

        Self {
            cart,
            page,
            drawer,
            component: Arc::new(component),
        }
    }
}

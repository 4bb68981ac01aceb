//! Cart drawer collaborator

use fq_cart::Cart;
use parking_lot::Mutex;

/// Notification UI shown after a successful cart mutation
///
/// Implementations mark the drawer open (the theme reads an `open`
/// attribute) and then run its open routine with the new cart.
pub trait CartDrawer: Send + Sync {
    /// Present the drawer for a cart snapshot
    fn open(&self, cart: &Cart);
}

/// Drawer that records every opening
#[derive(Debug, Default)]
pub struct RecordingDrawer {
    opened: Mutex<Vec<Cart>>,
}

impl RecordingDrawer {
    /// Create empty recorder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of openings
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.opened.lock().len()
    }

    /// Cart passed to the latest opening
    #[must_use]
    pub fn last_cart(&self) -> Option<Cart> {
        self.opened.lock().last().cloned()
    }

    /// Whether the drawer has been opened at all
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open_count() > 0
    }
}

impl CartDrawer for RecordingDrawer {
    fn open(&self, cart: &Cart) {
        tracing::debug!(lines = cart.items.len(), "cart drawer opened");
        self.opened.lock().push(cart.clone());
    }
}

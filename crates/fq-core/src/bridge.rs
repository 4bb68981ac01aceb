//! Event bridge
//!
//! Connects the page to the component. Field edits and update activations
//! arrive on a per-form channel; variant switches arrive on the page-wide
//! `VariantBus`, which the bridge subscribes to on attach and leaves on
//! detach. Every cart round trip runs as its own task, so events keep
//! flowing while a request is in flight.

use crate::component::FractionalQuantity;
use crate::context::VariantChange;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinHandle, JoinSet};

/// Page events routed to one form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    /// Fractional field committed a change
    FieldChanged,
    /// Key released in the fractional field
    FieldKeyUp,
    /// Update control activated
    UpdateActivated,
}

/// Page-wide variant change notifications
#[derive(Debug, Clone)]
pub struct VariantBus {
    sender: broadcast::Sender<VariantChange>,
}

impl VariantBus {
    /// Create bus retaining up to `capacity` undelivered notifications
    #[inline]
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Broadcast a variant switch
    ///
    /// Returns the number of forms that will see it.
    pub fn publish(&self, change: VariantChange) -> usize {
        self.sender.send(change).unwrap_or(0)
    }

    /// Register a listener
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<VariantChange> {
        self.sender.subscribe()
    }

    /// Number of registered listeners
    #[inline]
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for VariantBus {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Wiring between a page and its component
pub struct EventBridge;

impl EventBridge {
    /// Subscribe a component to page events and run the initial lookup
    #[must_use]
    pub fn attach(component: Arc<FractionalQuantity>, bus: &VariantBus) -> BridgeHandle {
        let (events, rx) = mpsc::unbounded_channel();
        let variants = bus.subscribe();
        let task = tokio::spawn(run(Arc::clone(&component), rx, variants));

        BridgeHandle {
            component,
            events,
            task,
        }
    }
}

/// Live bridge for one form
#[derive(Debug)]
pub struct BridgeHandle {
    component: Arc<FractionalQuantity>,
    events: mpsc::UnboundedSender<FormEvent>,
    task: JoinHandle<()>,
}

impl BridgeHandle {
    /// Deliver a page event
    ///
    /// Returns `false` once the bridge has stopped.
    pub fn dispatch(&self, event: FormEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Component driven by this bridge
    #[inline]
    #[must_use]
    pub fn component(&self) -> &Arc<FractionalQuantity> {
        &self.component
    }

    /// Stop listening and wait for in-flight cart requests to settle
    pub async fn detach(self) {
        drop(self.events);
        if let Err(error) = self.task.await {
            tracing::error!(%error, "event bridge task failed");
        }
    }
}

async fn run(
    component: Arc<FractionalQuantity>,
    mut events: mpsc::UnboundedReceiver<FormEvent>,
    variants: broadcast::Receiver<VariantChange>,
) {
    let mut variants = Some(variants);
    let mut in_flight = JoinSet::new();

    let c = Arc::clone(&component);
    in_flight.spawn(async move { c.refresh_from_cart().await });

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(FormEvent::FieldChanged | FormEvent::FieldKeyUp) => component.validate_input(),
                Some(FormEvent::UpdateActivated) => {
                    let c = Arc::clone(&component);
                    in_flight.spawn(async move { c.submit_update().await });
                }
                None => break,
            },
            change = next_variant(&mut variants) => match change {
                Ok(change) => {
                    tracing::debug!(variant = %change.variant_id, "variant changed");
                    component.apply_variant_change(change);
                    let c = Arc::clone(&component);
                    in_flight.spawn(async move { c.refresh_from_cart().await });
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "variant notifications dropped");
                }
                Err(RecvError::Closed) => variants = None,
            },
            Some(done) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(error) = done {
                    tracing::error!(%error, "cart task failed");
                }
            }
        }
    }

    drop(variants);
    while let Some(done) = in_flight.join_next().await {
        if let Err(error) = done {
            tracing::error!(%error, "cart task failed");
        }
    }
}

async fn next_variant(
    variants: &mut Option<broadcast::Receiver<VariantChange>>,
) -> Result<VariantChange, RecvError> {
    match variants {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

//! Event hooks for the fallback chain.
//!
//! Provides an optional, non-intrusive way to observe orchestration. The
//! chain emits an event when it attempts a provider, when a provider fails,
//! when it pauses for a rate limit, and when a call succeeds or every tier is
//! exhausted. Implement [`EventHandler`] to receive them.

use crate::error::ProviderErrorKind;
use std::sync::Arc;
use std::time::Duration;

/// Events emitted by [`FallbackChain`](crate::fallback::FallbackChain).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A provider is about to be called.
    Attempt {
        /// Provider name.
        provider: String,
        /// Zero-based tier index.
        tier: usize,
    },
    /// A provider call failed.
    ProviderFailed {
        provider: String,
        kind: ProviderErrorKind,
        message: String,
    },
    /// The chain is pausing after the last tier was rate limited.
    RateLimitWait {
        provider: String,
        wait: Duration,
    },
    /// A provider returned text.
    Succeeded {
        provider: String,
    },
    /// Every tier failed.
    Exhausted {
        /// Number of providers attempted.
        attempts: usize,
    },
}

/// Handler for fallback lifecycle events.
///
/// This is entirely optional; the chain works without one.
///
/// # Example
///
/// ```
/// use content_planner::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         match event {
///             Event::Attempt { provider, .. } => println!("[try] {}", provider),
///             Event::Succeeded { provider } => println!("[ok] {}", provider),
///             _ => {} // ProviderFailed, RateLimitWait, Exhausted
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called when the chain emits an event.
    fn on_event(&self, event: Event);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: Event) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
///
/// # Example
///
/// ```
/// use content_planner::events::{Event, FnEventHandler};
/// use std::sync::Arc;
///
/// let handler = Arc::new(FnEventHandler(|event: Event| {
///     if let Event::RateLimitWait { provider, wait } = event {
///         eprintln!("{} throttled for {:?}", provider, wait);
///     }
/// }));
/// ```
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}

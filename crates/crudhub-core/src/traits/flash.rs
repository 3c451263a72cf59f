//! Flash message sink.

use crate::types::flash::{FlashKind, FlashMessage};

/// Receives flash messages recorded by an action.
///
/// Passed to each action call so that the controller never reaches into a
/// session store on its own.
pub trait FlashSink: Send + Sync {
    /// Queue `message` under `kind`.
    fn add(&self, kind: FlashKind, message: String);

    /// Remove and return the queued messages so the page rendered by the
    /// current action can show them. Write-only sinks return nothing.
    fn take_pending(&self) -> Vec<FlashMessage> {
        Vec::new()
    }
}

//! Cancellation scopes for in-flight operations.

use std::sync::Arc;
use tokio::sync::watch;

/// Cancellation token shared by every request issued on behalf of one
/// logical operation or view.
///
/// Clones observe the same state. Once cancelled a scope stays cancelled.
#[derive(Clone, Debug)]
pub struct Scope {
    tx: Arc<watch::Sender<bool>>,
}

impl Scope {
    /// Create a new, live scope.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Cancel every request tied to this scope.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the scope is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // the sender lives in self, so wait_for only ends on cancel
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Tie the scope to a value's lifetime: dropping the guard cancels it.
    pub fn guard(&self) -> ScopeGuard {
        ScopeGuard { scope: self.clone() }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

/// A RAII guard that cancels its scope on drop.
#[derive(Debug)]
pub struct ScopeGuard {
    scope: Scope,
}

impl ScopeGuard {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

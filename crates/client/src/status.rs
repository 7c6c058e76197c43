//! Loading/error bookkeeping shared by the stores.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// `loading` + `error` as exposed to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationStatus {
    pub loading: bool,
    pub error: Option<String>,
}

/// State types that embed an `OperationStatus`.
pub(crate) trait HasStatus {
    fn status_mut(&mut self) -> &mut OperationStatus;
}

/// Lock a store mutex, recovering the data if a panicking thread poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks an operation as in flight for as long as it is alive.
///
/// Creating it sets `loading` and clears `error`; dropping it clears
/// `loading` on every exit path, including early returns and panics.
pub(crate) struct InFlight<'a, S: HasStatus> {
    state: &'a Mutex<S>,
}

impl<'a, S: HasStatus> InFlight<'a, S> {
    pub(crate) fn begin(state: &'a Mutex<S>) -> Self {
        {
            let mut guard = lock(state);
            let status = guard.status_mut();
            status.loading = true;
            status.error = None;
        }
        Self { state }
    }

    /// Record a failure message; the flag is still cleared on drop.
    pub(crate) fn fail(&self, message: impl Into<String>) {
        lock(self.state).status_mut().error = Some(message.into());
    }
}

impl<S: HasStatus> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        lock(self.state).status_mut().loading = false;
    }
}

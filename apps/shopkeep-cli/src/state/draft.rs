//! # Draft State
//!
//! The order being assembled at the counter, plus the flag that keeps a
//! second submission from starting while one is in flight.
//!
//! ## Lifecycle
//! ```text
//! add lines / set discount, debt, customer
//!        │
//!        ▼
//! submit ──► flag already set? ──► CheckoutError::InProgress
//!        │
//!        ▼
//! checkout::submit(snapshot of draft)
//!        │
//!        ├── Ok(receipt) ──► draft reset (back to empty)
//!        └── Err(_) ───────► draft kept for correction or retry
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use shopkeep_core::OrderDraft;
use shopkeep_db::{checkout, CheckoutError, CheckoutPolicy, StoreBackend, SubmissionReceipt};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct DraftState {
    draft: Arc<Mutex<OrderDraft>>,
    submitting: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DraftState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, OrderDraft> {
        // A panic mid-edit leaves a structurally valid draft.
        self.draft.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Executes a function with read access to the draft.
    pub fn with_draft<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&OrderDraft) -> R,
    {
        f(&self.lock())
    }

    /// Executes a function with write access to the draft.
    pub fn with_draft_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut OrderDraft) -> R,
    {
        f(&mut self.lock())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Submits a snapshot of the draft and resets it on success.
    pub async fn submit<B>(
        &self,
        backend: &B,
        policy: CheckoutPolicy,
    ) -> Result<SubmissionReceipt, CheckoutError>
    where
        B: StoreBackend + ?Sized,
    {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CheckoutError::InProgress);
        }
        let _in_flight = InFlight(&self.submitting);

        let snapshot = self.with_draft(OrderDraft::clone);
        let receipt = checkout::submit(backend, &snapshot, policy).await?;

        self.with_draft_mut(OrderDraft::reset);
        debug!(order_number = receipt.order.order_number, "Draft cleared after submission");

        Ok(receipt)
    }
}

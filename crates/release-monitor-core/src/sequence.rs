use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic request counter used to drop responses that arrive after a
/// newer request of the same kind was issued.
///
/// Callers take a ticket and check it while holding the state lock they are
/// about to mutate, so issuing and checking never interleave.
#[derive(Debug, Default)]
pub(crate) struct RequestSequence(AtomicU64);

impl RequestSequence {
    pub(crate) fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }
}

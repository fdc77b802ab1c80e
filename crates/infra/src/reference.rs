//! Reference id generation.
//!
//! A reference id correlates every ledger leg of one logical mutation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use stockpile_inventory::ReferenceKind;

pub trait ReferenceIdGenerator: Send + Sync {
    /// A new id, unique per call.
    fn generate(&self, kind: ReferenceKind) -> String;
}

impl<G> ReferenceIdGenerator for Arc<G>
where
    G: ReferenceIdGenerator + ?Sized,
{
    fn generate(&self, kind: ReferenceKind) -> String {
        (**self).generate(kind)
    }
}

/// `TRF-<uuid v7 simple>`; time-ordered, unique across processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidReferenceIds;

impl ReferenceIdGenerator for UuidReferenceIds {
    fn generate(&self, kind: ReferenceKind) -> String {
        format!("{}-{}", kind.prefix(), Uuid::now_v7().simple())
    }
}

/// `TRF-000001`; deterministic, unique within one generator. Tests and demos.
#[derive(Debug, Default)]
pub struct SequentialReferenceIds {
    next: AtomicU64,
}

impl SequentialReferenceIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReferenceIdGenerator for SequentialReferenceIds {
    fn generate(&self, kind: ReferenceKind) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{n:06}", kind.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_ids_carry_prefix_and_are_unique() {
        let ids: HashSet<String> = (0..100)
            .map(|_| UuidReferenceIds.generate(ReferenceKind::Transfer))
            .collect();
        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(|id| id.starts_with("TRF-") && id.len() == 4 + 32));
    }

    #[test]
    fn sequential_ids_count_up_across_kinds() {
        let g = SequentialReferenceIds::new();
        assert_eq!(g.generate(ReferenceKind::Adjustment), "ADJ-000001");
        assert_eq!(g.generate(ReferenceKind::Receipt), "RCV-000002");
    }
}

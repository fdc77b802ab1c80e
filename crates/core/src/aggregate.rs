//! Versioned root entities and optimistic concurrency expectations.

/// Root entity marker + minimal interface.
///
/// Every mutable record that is written under optimistic concurrency exposes its
/// identity and the version it was read at.
pub trait AggregateRoot {
    /// Strongly-typed identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the record's state.
    ///
    /// `0` means "never persisted"; every committed write bumps it by one.
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for a record write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (useful for migrations, fixtures, etc.).
    Any,
    /// Require the record to be at an exact version (`Exact(0)` = must not exist yet).
    Exact(u64),
}

impl ExpectedVersion {
    /// Expectation for a record that must not exist yet.
    pub const ABSENT: ExpectedVersion = ExpectedVersion::Exact(0);

    /// Expectation derived from a record as it was read.
    pub fn of<A: AggregateRoot>(record: &A) -> Self {
        ExpectedVersion::Exact(record.version())
    }

    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_version_matches_only_itself() {
        assert!(ExpectedVersion::Exact(3).matches(3));
        assert!(!ExpectedVersion::Exact(3).matches(4));
        assert!(ExpectedVersion::Any.matches(42));
        assert!(ExpectedVersion::ABSENT.matches(0));
    }
}

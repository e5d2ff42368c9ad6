//! Entity identifiers

use std::cell::Cell;
use std::fmt;

/// Entity identifier
///
/// Entities should be referenced by id rather than by holding on to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// The only id that is never handed out
    pub const INVALID: Self = Self(0);

    /// Wrap a raw id
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id
    pub const fn get(self) -> u32 {
        self.0
    }

    /// False only for [`EntityId::INVALID`]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out unique, strictly increasing entity ids
///
/// Owned by the entity manager rather than being process-global, so every
/// manager (and every test) starts its own sequence.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: Cell<u32>,
}

impl IdAllocator {
    /// Create an allocator whose first id is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused id
    ///
    /// Exhausting the 32-bit space wraps around; that is not expected to
    /// happen within a session. The invalid id is skipped either way.
    pub fn next_id(&self) -> EntityId {
        let mut next = self.last.get().wrapping_add(1);
        if next == EntityId::INVALID.0 {
            next += 1;
        }
        self.last.set(next);
        EntityId(next)
    }

    /// Most recently issued id, or the invalid id before the first call
    pub fn last_issued(&self) -> EntityId {
        EntityId(self.last.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let ids = IdAllocator::new();
        assert_eq!(ids.last_issued(), EntityId::INVALID);
        assert_eq!(ids.next_id(), EntityId::new(1));
        assert_eq!(ids.next_id(), EntityId::new(2));
        assert_eq!(ids.last_issued(), EntityId::new(2));
    }

    #[test]
    fn test_wraparound_skips_invalid() {
        let ids = IdAllocator { last: Cell::new(u32::MAX) };
        let next = ids.next_id();
        assert!(next.is_valid());
        assert_eq!(next, EntityId::new(1));
    }

    #[test]
    fn test_allocators_are_independent() {
        let a = IdAllocator::new();
        let b = IdAllocator::new();
        a.next_id();
        a.next_id();
        assert_eq!(b.next_id(), EntityId::new(1));
    }
}

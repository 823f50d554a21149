//! Identifiers and simple allocators for stage entities.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Position of an Animation in the append-only timeline.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SegmentId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic allocator for ObjectId.
/// Ids are never reused, so a removed object's id stays dangling.
#[derive(Default, Debug, Clone)]
pub struct IdAllocator {
    next_object: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_object(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object);
        self.next_object = self.next_object.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_object(), ObjectId(0));
        assert_eq!(alloc.alloc_object(), ObjectId(1));
    }

    #[test]
    fn object_id_display() {
        assert_eq!(ObjectId(7).to_string(), "#7");
    }
}

//! Managed heap behind raw pointers.
//!
//! A pointer is an allocation id plus a byte offset, never a machine
//! address. Every access is checked against the live allocation, so use
//! after free, double free and out-of-bounds ranges become runtime errors
//! instead of undefined behavior.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::errors::{invalid_memory_access, EvalError};

/// Identity of one allocation. Ids are never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AllocId(u32);

/// A raw pointer: `(allocation, offset)` or null.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pointer {
    alloc: Option<AllocId>,
    offset: i64,
}

impl Pointer {
    pub const NULL: Pointer = Pointer {
        alloc: None,
        offset: 0,
    };

    pub fn is_null(self) -> bool {
        self.alloc.is_none()
    }

    pub fn offset(self) -> i64 {
        self.offset
    }

    /// Byte-offset arithmetic. Only the offset moves; bounds are checked
    /// on access.
    #[must_use]
    pub fn offset_by(self, delta: i64) -> Pointer {
        Pointer {
            alloc: self.alloc,
            offset: self.offset.wrapping_add(delta),
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alloc {
            None => f.write_str("<ptr null>"),
            Some(AllocId(id)) => write!(f, "<ptr #{id}{:+}>", self.offset),
        }
    }
}

/// Allocation table owned by an interpreter.
#[derive(Default)]
pub struct Heap {
    allocations: FxHashMap<AllocId, Vec<u8>>,
    next_id: u32,
}

impl Heap {
    pub fn new() -> Self {
        Heap::default()
    }

    /// Allocate `size` zeroed bytes.
    pub fn alloc(&mut self, size: usize) -> Pointer {
        self.next_id += 1;
        let id = AllocId(self.next_id);
        self.allocations.insert(id, vec![0; size]);
        tracing::trace!(id = self.next_id, size, "alloc");
        Pointer {
            alloc: Some(id),
            offset: 0,
        }
    }

    /// Resize an allocation in place; growth is zero-filled. A null
    /// pointer allocates fresh storage.
    pub fn realloc(&mut self, ptr: Pointer, size: usize) -> Result<Pointer, EvalError> {
        let Some(id) = ptr.alloc else {
            return Ok(self.alloc(size));
        };
        if ptr.offset != 0 {
            return Err(invalid_memory_access(format!(
                "realloc of interior pointer {ptr}"
            )));
        }
        let bytes = self
            .allocations
            .get_mut(&id)
            .ok_or_else(|| invalid_memory_access(format!("realloc of freed pointer {ptr}")))?;
        bytes.resize(size, 0);
        Ok(ptr)
    }

    /// Release an allocation. Freeing null is a no-op.
    pub fn free(&mut self, ptr: Pointer) -> Result<(), EvalError> {
        let Some(id) = ptr.alloc else {
            return Ok(());
        };
        if ptr.offset != 0 {
            return Err(invalid_memory_access(format!(
                "free of interior pointer {ptr}"
            )));
        }
        if self.allocations.remove(&id).is_none() {
            return Err(invalid_memory_access(format!("double free of {ptr}")));
        }
        Ok(())
    }

    /// Fill `len` bytes starting at `ptr` with `byte`.
    pub fn memset(&mut self, ptr: Pointer, byte: u8, len: usize) -> Result<(), EvalError> {
        let (id, range) = self.checked_range(ptr, len)?;
        if let Some(bytes) = self.allocations.get_mut(&id) {
            bytes[range].fill(byte);
        }
        Ok(())
    }

    /// Copy `len` bytes from `src` to `dest`. Overlapping ranges in the
    /// same allocation behave like `memmove`.
    pub fn memcpy(&mut self, dest: Pointer, src: Pointer, len: usize) -> Result<(), EvalError> {
        let (src_id, src_range) = self.checked_range(src, len)?;
        let (dest_id, dest_range) = self.checked_range(dest, len)?;
        if src_id == dest_id {
            if let Some(bytes) = self.allocations.get_mut(&dest_id) {
                bytes.copy_within(src_range, dest_range.start);
            }
            return Ok(());
        }
        let copied = self.read(src, len)?;
        if let Some(bytes) = self.allocations.get_mut(&dest_id) {
            bytes[dest_range].copy_from_slice(&copied);
        }
        Ok(())
    }

    /// Read `len` bytes starting at `ptr`.
    pub fn read(&self, ptr: Pointer, len: usize) -> Result<Vec<u8>, EvalError> {
        let (id, range) = self.checked_range(ptr, len)?;
        Ok(self
            .allocations
            .get(&id)
            .map(|bytes| bytes[range].to_vec())
            .unwrap_or_default())
    }

    /// Size of the live allocation `ptr` points into.
    pub fn allocation_size(&self, ptr: Pointer) -> Option<usize> {
        self.allocations.get(&ptr.alloc?).map(Vec::len)
    }

    /// Number of live allocations.
    pub fn live_allocations(&self) -> usize {
        self.allocations.len()
    }

    fn checked_range(
        &self,
        ptr: Pointer,
        len: usize,
    ) -> Result<(AllocId, std::ops::Range<usize>), EvalError> {
        let Some(id) = ptr.alloc else {
            return Err(invalid_memory_access("null pointer dereference"));
        };
        let Some(bytes) = self.allocations.get(&id) else {
            return Err(invalid_memory_access(format!("use of freed pointer {ptr}")));
        };
        let start = usize::try_from(ptr.offset).ok();
        let end = start.and_then(|start| start.checked_add(len));
        match (start, end) {
            (Some(start), Some(end)) if end <= bytes.len() => Ok((id, start..end)),
            _ => Err(invalid_memory_access(format!(
                "{len} bytes at {ptr} exceed allocation of {} bytes",
                bytes.len()
            ))),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn alloc_is_zeroed() {
        let mut heap = Heap::new();
        let ptr = heap.alloc(4);
        assert_eq!(heap.read(ptr, 4).unwrap(), vec![0; 4]);
        assert_eq!(heap.live_allocations(), 1);
    }

    #[test]
    fn memset_and_memcpy_between_allocations() {
        let mut heap = Heap::new();
        let a = heap.alloc(4);
        let b = heap.alloc(4);
        heap.memset(a, 7, 4).unwrap();
        heap.memcpy(b.offset_by(1), a, 2).unwrap();
        assert_eq!(heap.read(b, 4).unwrap(), vec![0, 7, 7, 0]);
    }

    #[test]
    fn memcpy_within_one_allocation_overlaps_safely() {
        let mut heap = Heap::new();
        let p = heap.alloc(4);
        heap.memset(p, 1, 1).unwrap();
        heap.memset(p.offset_by(1), 2, 1).unwrap();
        heap.memcpy(p.offset_by(1), p, 2).unwrap();
        assert_eq!(heap.read(p, 4).unwrap(), vec![1, 1, 2, 0]);
    }

    #[test]
    fn out_of_bounds_ranges_fail() {
        let mut heap = Heap::new();
        let p = heap.alloc(4);
        assert!(heap.memset(p, 0, 5).is_err());
        assert!(heap.memset(p.offset_by(3), 0, 2).is_err());
        assert!(heap.memset(p.offset_by(-1), 0, 1).is_err());
        assert!(heap.memset(p.offset_by(4), 0, 0).is_ok());
    }

    #[test]
    fn use_after_free_and_double_free_fail() {
        let mut heap = Heap::new();
        let p = heap.alloc(2);
        heap.free(p).unwrap();
        assert!(heap.memset(p, 0, 1).is_err());
        assert!(heap.free(p).is_err());
        assert_eq!(heap.live_allocations(), 0);
    }

    #[test]
    fn realloc_keeps_identity_and_zero_fills() {
        let mut heap = Heap::new();
        let p = heap.alloc(2);
        heap.memset(p, 9, 2).unwrap();
        let q = heap.realloc(p, 4).unwrap();
        assert_eq!(p, q);
        assert_eq!(heap.read(q, 4).unwrap(), vec![9, 9, 0, 0]);
        assert_eq!(heap.allocation_size(q), Some(4));
    }

    #[test]
    fn null_pointer_handling() {
        let mut heap = Heap::new();
        assert!(heap.free(Pointer::NULL).is_ok());
        assert!(heap.memset(Pointer::NULL, 0, 1).is_err());
        let fresh = heap.realloc(Pointer::NULL, 3).unwrap();
        assert!(!fresh.is_null());
    }

    #[test]
    fn pointer_display() {
        let mut heap = Heap::new();
        let p = heap.alloc(8);
        assert_eq!(p.offset_by(3).to_string(), "<ptr #1+3>");
        assert_eq!(p.offset_by(-2).to_string(), "<ptr #1-2>");
        assert_eq!(Pointer::NULL.to_string(), "<ptr null>");
    }
}

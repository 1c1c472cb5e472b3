//! Page-aligned RAM backing store

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use op_core::error::MemoryError;

use crate::constants::PAGE_SIZE;

/// Zero-filled, page-aligned byte buffer owned exclusively by one memory system
///
/// The allocation is released exactly once, when the buffer is dropped.
pub struct Ram {
    ptr: NonNull<u8>,
    layout: Layout,
}

// The buffer is plain owned bytes; aliasing is governed by `&`/`&mut` borrows.
unsafe impl Send for Ram {}
unsafe impl Sync for Ram {}

impl Ram {
    /// Allocate `size` zeroed bytes aligned to a page boundary
    pub fn new(size: usize) -> Result<Self, MemoryError> {
        let layout = Layout::from_size_align(size, PAGE_SIZE)
            .map_err(|_| MemoryError::AllocationFailed { size })?;

        if size == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                layout,
            });
        }

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(MemoryError::AllocationFailed { size })?;

        Ok(Self { ptr, layout })
    }

    /// Size in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    /// Whether the buffer holds no bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid for len bytes (or dangling with len 0), initialised by alloc_zeroed.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len()) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and &mut self guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len()) }
    }
}

impl Drop for Ram {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: ptr was returned by alloc_zeroed with this exact layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
        }
    }
}

impl std::fmt::Debug for Ram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ram").field("size", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ram_zeroed_and_aligned() {
        let ram = Ram::new(3 * PAGE_SIZE + 17).unwrap();
        assert_eq!(ram.len(), 3 * PAGE_SIZE + 17);
        assert_eq!(ram.as_slice().as_ptr() as usize % PAGE_SIZE, 0);
        assert!(ram.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_ram_empty() {
        let mut ram = Ram::new(0).unwrap();
        assert!(ram.is_empty());
        assert!(ram.as_mut_slice().is_empty());
    }

    #[test]
    fn test_ram_impossible_size() {
        assert_eq!(
            Ram::new(usize::MAX).unwrap_err(),
            MemoryError::AllocationFailed { size: usize::MAX }
        );
    }
}

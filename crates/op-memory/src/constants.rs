//! Translation constants

/// log2 of the page size
pub const PAGE_SHIFT: u32 = 12;
/// Standard page size (4 KB)
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;
/// Offset bits within a page
pub const PAGE_MASK: u64 = (PAGE_SIZE as u64) - 1;

/// Number of entries in each TLB
pub const TLB_SIZE: usize = 64;
/// Mask applied to the virtual page number to select a TLB slot
pub const TLB_MASK: u64 = (TLB_SIZE as u64) - 1;

/// Pages identity-mapped into both TLBs at construction
pub const IDENTITY_MAPPED_PAGES: u64 = 16;

pub use op_core::config::DEFAULT_RAM_SIZE;

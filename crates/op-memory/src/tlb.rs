//! Direct-mapped software TLB
//!
//! Each virtual page maps to exactly one slot, `(vaddr >> PAGE_SHIFT) & TLB_MASK`.
//! Inserting a page whose slot is occupied by a different page silently
//! replaces the old mapping; there is no other eviction policy.

use crate::constants::{PAGE_MASK, PAGE_SHIFT, TLB_MASK, TLB_SIZE};
use crate::pages::PermissionFlags;

/// Which TLB a translation goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlbKind {
    /// Instruction fetches
    Instruction,
    /// Loads and stores
    Data,
}

/// A single TLB slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TlbEntry {
    /// Page-aligned virtual address tag
    pub vaddr_tag: u64,
    /// Page-aligned physical base
    pub paddr_base: u64,
    /// Recorded (never enforced) permissions
    pub flags: PermissionFlags,
    /// Entry holds a live mapping
    pub valid: bool,
}

impl TlbEntry {
    /// Whether this entry maps the page containing `vaddr`
    #[inline]
    pub fn maps(&self, vaddr: u64) -> bool {
        self.valid && self.vaddr_tag == vaddr & !PAGE_MASK
    }
}

/// Fixed-size direct-mapped TLB
#[derive(Debug, Clone)]
pub struct Tlb {
    entries: [TlbEntry; TLB_SIZE],
}

impl Tlb {
    /// Create a TLB with every entry invalid
    pub fn new() -> Self {
        Self {
            entries: [TlbEntry::default(); TLB_SIZE],
        }
    }

    /// Slot index for a virtual address
    #[inline]
    pub fn index(vaddr: u64) -> usize {
        ((vaddr >> PAGE_SHIFT) & TLB_MASK) as usize
    }

    /// Look up a virtual address.
    /// Returns Some(physical_addr) on hit, None on miss.
    #[inline]
    pub fn lookup(&self, vaddr: u64) -> Option<u64> {
        let entry = &self.entries[Self::index(vaddr)];
        if entry.maps(vaddr) {
            Some(entry.paddr_base | (vaddr & PAGE_MASK))
        } else {
            None
        }
    }

    /// Install a mapping for the page containing `vaddr`, overwriting the slot.
    ///
    /// Returns the valid entry that was displaced when it mapped a different page.
    pub fn insert(&mut self, vaddr: u64, paddr: u64, flags: PermissionFlags) -> Option<TlbEntry> {
        let entry = &mut self.entries[Self::index(vaddr)];
        let evicted = (entry.valid && !entry.maps(vaddr)).then_some(*entry);

        *entry = TlbEntry {
            vaddr_tag: vaddr & !PAGE_MASK,
            paddr_base: paddr & !PAGE_MASK,
            flags,
            valid: true,
        };

        evicted
    }

    /// Invalidate every entry
    pub fn flush(&mut self) {
        for entry in &mut self.entries {
            entry.valid = false;
        }
    }

    /// Entry stored in a slot
    #[inline]
    pub fn entry(&self, index: usize) -> &TlbEntry {
        &self.entries[index & TLB_MASK as usize]
    }

    /// Number of valid entries
    pub fn valid_count(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }
}

impl Default for Tlb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_ignores_page_offset() {
        assert_eq!(Tlb::index(0x5000), 5);
        assert_eq!(Tlb::index(0x5FFF), 5);
        assert_eq!(Tlb::index(0x45000), 5);
        assert_eq!(Tlb::index(0x3F000), 63);
        assert_eq!(Tlb::index(0x40000), 0);
    }

    #[test]
    fn test_lookup_empty() {
        let tlb = Tlb::new();
        assert_eq!(tlb.lookup(0), None);
        assert_eq!(tlb.valid_count(), 0);
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut tlb = Tlb::new();
        assert_eq!(tlb.insert(0x1234, 0x9000, PermissionFlags::RW), None);

        let entry = tlb.entry(1);
        assert_eq!(entry.vaddr_tag, 0x1000);
        assert_eq!(entry.paddr_base, 0x9000);
        assert_eq!(entry.flags, PermissionFlags::RW);

        assert_eq!(tlb.lookup(0x1000), Some(0x9000));
        assert_eq!(tlb.lookup(0x1ABC), Some(0x9ABC));
        assert_eq!(tlb.lookup(0x2000), None);
    }

    #[test]
    fn test_conflict_overwrites() {
        let mut tlb = Tlb::new();
        tlb.insert(0x2000, 0x2000, PermissionFlags::RWX);

        // Same slot (page 2 and page 66), different page
        let evicted = tlb.insert(0x42000, 0x42000, PermissionFlags::RWX).unwrap();
        assert_eq!(evicted.vaddr_tag, 0x2000);

        assert_eq!(tlb.lookup(0x2000), None);
        assert_eq!(tlb.lookup(0x42010), Some(0x42010));
    }

    #[test]
    fn test_reinsert_same_page_is_not_eviction() {
        let mut tlb = Tlb::new();
        tlb.insert(0x3000, 0x3000, PermissionFlags::READ);
        assert_eq!(tlb.insert(0x3FFF, 0x3000, PermissionFlags::RWX), None);
        assert_eq!(tlb.entry(3).flags, PermissionFlags::RWX);
    }

    #[test]
    fn test_flush() {
        let mut tlb = Tlb::new();
        for page in 0..8u64 {
            tlb.insert(page << PAGE_SHIFT, page << PAGE_SHIFT, PermissionFlags::RW);
        }
        assert_eq!(tlb.valid_count(), 8);

        tlb.flush();
        assert_eq!(tlb.valid_count(), 0);
        assert_eq!(tlb.lookup(0x3000), None);
    }
}

//! Memory system: RAM plus instruction and data TLBs

use std::ops::Range;

use op_core::config::MemoryConfig;
use op_core::error::MemoryError;
use op_core::{mmu_debug, mmu_trace};

use crate::constants::{IDENTITY_MAPPED_PAGES, PAGE_SHIFT};
use crate::pages::PermissionFlags;
use crate::ram::Ram;
use crate::tlb::{Tlb, TlbKind};

/// Guest memory for one emulated machine
///
/// Translation mutates TLB state and the hit/miss counters even on reads, so
/// every accessor takes `&mut self`. Sharing one instance between threads
/// needs an external lock.
///
/// Accesses that fall outside RAM are degraded rather than faulted: reads
/// return zero and writes are discarded. Permission flags recorded in the
/// TLBs are not enforced.
#[derive(Debug)]
pub struct MemorySystem {
    /// Flat physical memory
    ram: Ram,
    /// Instruction TLB
    itlb: Tlb,
    /// Data TLB
    dtlb: Tlb,
    /// Translations satisfied by a TLB entry
    tlb_hits: u64,
    /// Translations that fell back to identity mapping
    tlb_misses: u64,
}

impl MemorySystem {
    /// Create a memory system with `size` bytes of zeroed RAM
    ///
    /// The first 16 pages are identity-mapped in both TLBs: read/execute in
    /// the instruction TLB, read/write in the data TLB.
    pub fn new(size: usize) -> Result<Self, MemoryError> {
        let ram = Ram::new(size)?;

        let mut itlb = Tlb::new();
        let mut dtlb = Tlb::new();
        for page in 0..IDENTITY_MAPPED_PAGES {
            let addr = page << PAGE_SHIFT;
            itlb.insert(addr, addr, PermissionFlags::RX);
            dtlb.insert(addr, addr, PermissionFlags::RW);
        }

        mmu_debug!("Memory system initialized: {} bytes of RAM", size);

        Ok(Self {
            ram,
            itlb,
            dtlb,
            tlb_hits: 0,
            tlb_misses: 0,
        })
    }

    /// Create a memory system sized from configuration
    pub fn from_config(config: &MemoryConfig) -> Result<Self, MemoryError> {
        Self::new(config.ram_size)
    }

    /// Translate a virtual address through the selected TLB
    ///
    /// On a miss the address is identity-mapped and an RWX entry is written
    /// into its slot, replacing whatever page occupied it.
    pub fn translate(&mut self, vaddr: u64, kind: TlbKind) -> u64 {
        let tlb = match kind {
            TlbKind::Instruction => &mut self.itlb,
            TlbKind::Data => &mut self.dtlb,
        };

        if let Some(paddr) = tlb.lookup(vaddr) {
            self.tlb_hits += 1;
            return paddr;
        }

        self.tlb_misses += 1;
        let paddr = vaddr;
        if let Some(evicted) = tlb.insert(vaddr, paddr, PermissionFlags::RWX) {
            mmu_trace!(
                "{:?} TLB miss at 0x{:x}, evicted page 0x{:x} from slot {}",
                kind,
                vaddr,
                evicted.vaddr_tag,
                Tlb::index(vaddr)
            );
        } else {
            mmu_trace!("{:?} TLB miss at 0x{:x}", kind, vaddr);
        }
        paddr
    }

    /// Byte range of RAM covered by an access, if it lies entirely inside RAM
    #[inline]
    fn physical_range(&self, paddr: u64, width: usize) -> Option<Range<usize>> {
        let start = usize::try_from(paddr).ok()?;
        let end = start.checked_add(width)?;
        (end <= self.ram.len()).then_some(start..end)
    }

    #[inline]
    fn load<const N: usize>(&mut self, vaddr: u64, kind: TlbKind) -> [u8; N] {
        let paddr = self.translate(vaddr, kind);
        match self.physical_range(paddr, N) {
            Some(range) => self.ram.as_slice()[range].try_into().unwrap_or([0; N]),
            None => {
                mmu_trace!("Out-of-range {}-byte read at 0x{:x} returns zero", N, vaddr);
                [0; N]
            }
        }
    }

    #[inline]
    fn store<const N: usize>(&mut self, vaddr: u64, bytes: [u8; N]) {
        let paddr = self.translate(vaddr, TlbKind::Data);
        match self.physical_range(paddr, N) {
            Some(range) => self.ram.as_mut_slice()[range].copy_from_slice(&bytes),
            None => {
                mmu_trace!("Out-of-range {}-byte write at 0x{:x} discarded", N, vaddr);
            }
        }
    }

    /// Read a byte
    pub fn read8(&mut self, vaddr: u64) -> u8 {
        u8::from_be_bytes(self.load(vaddr, TlbKind::Data))
    }

    /// Read a big-endian halfword
    pub fn read16(&mut self, vaddr: u64) -> u16 {
        u16::from_be_bytes(self.load(vaddr, TlbKind::Data))
    }

    /// Read a big-endian word
    pub fn read32(&mut self, vaddr: u64) -> u32 {
        u32::from_be_bytes(self.load(vaddr, TlbKind::Data))
    }

    /// Read a big-endian doubleword
    pub fn read64(&mut self, vaddr: u64) -> u64 {
        u64::from_be_bytes(self.load(vaddr, TlbKind::Data))
    }

    /// Fetch an instruction word through the instruction TLB
    pub fn fetch32(&mut self, vaddr: u64) -> u32 {
        u32::from_be_bytes(self.load(vaddr, TlbKind::Instruction))
    }

    /// Write a byte
    pub fn write8(&mut self, vaddr: u64, value: u8) {
        self.store(vaddr, value.to_be_bytes());
    }

    /// Write a big-endian halfword
    pub fn write16(&mut self, vaddr: u64, value: u16) {
        self.store(vaddr, value.to_be_bytes());
    }

    /// Write a big-endian word
    pub fn write32(&mut self, vaddr: u64, value: u32) {
        self.store(vaddr, value.to_be_bytes());
    }

    /// Write a big-endian doubleword
    pub fn write64(&mut self, vaddr: u64, value: u64) {
        self.store(vaddr, value.to_be_bytes());
    }

    /// Invalidate both TLBs. RAM and counters are left untouched.
    pub fn flush(&mut self) {
        self.itlb.flush();
        self.dtlb.flush();
        mmu_debug!("TLBs flushed");
    }

    /// Number of translations that hit
    pub fn tlb_hits(&self) -> u64 {
        self.tlb_hits
    }

    /// Number of translations that missed
    pub fn tlb_misses(&self) -> u64 {
        self.tlb_misses
    }

    /// Size of RAM in bytes
    pub fn ram_size(&self) -> usize {
        self.ram.len()
    }

    /// Raw view of physical memory
    pub fn ram(&self) -> &[u8] {
        self.ram.as_slice()
    }

    /// Instruction TLB
    pub fn itlb(&self) -> &Tlb {
        &self.itlb
    }

    /// Data TLB
    pub fn dtlb(&self) -> &Tlb {
        &self.dtlb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PAGE_SIZE, TLB_SIZE};

    fn create_test_memory() -> MemorySystem {
        MemorySystem::new(1024 * 1024).unwrap()
    }

    #[test]
    fn test_identity_seeding() {
        let mem = create_test_memory();

        assert_eq!(mem.itlb().valid_count(), 16);
        assert_eq!(mem.dtlb().valid_count(), 16);

        for page in 0..16 {
            let i = mem.itlb().entry(page);
            let d = mem.dtlb().entry(page);
            assert_eq!(i.vaddr_tag, (page * PAGE_SIZE) as u64);
            assert_eq!(i.paddr_base, i.vaddr_tag);
            assert_eq!(i.flags, PermissionFlags::RX);
            assert_eq!(d.flags, PermissionFlags::RW);
        }
        for page in 16..TLB_SIZE {
            assert!(!mem.itlb().entry(page).valid);
            assert!(!mem.dtlb().entry(page).valid);
        }

        assert_eq!(mem.tlb_hits(), 0);
        assert_eq!(mem.tlb_misses(), 0);
    }

    #[test]
    fn test_translate_hit_and_miss() {
        let mut mem = create_test_memory();

        assert_eq!(mem.translate(0x1234, TlbKind::Data), 0x1234);
        assert_eq!((mem.tlb_hits(), mem.tlb_misses()), (1, 0));

        assert_eq!(mem.translate(0x20010, TlbKind::Data), 0x20010);
        assert_eq!((mem.tlb_hits(), mem.tlb_misses()), (1, 1));
        assert_eq!(mem.dtlb().entry(32).flags, PermissionFlags::RWX);

        assert_eq!(mem.translate(0x20FF0, TlbKind::Data), 0x20FF0);
        assert_eq!((mem.tlb_hits(), mem.tlb_misses()), (2, 1));
    }

    #[test]
    fn test_tlbs_are_independent() {
        let mut mem = create_test_memory();

        mem.translate(0x30000, TlbKind::Instruction);
        assert!(mem.itlb().entry(48).valid);
        assert!(!mem.dtlb().entry(48).valid);

        mem.translate(0x30000, TlbKind::Data);
        assert_eq!(mem.tlb_misses(), 2);
    }

    #[test]
    fn test_big_endian_layout() {
        let mut mem = create_test_memory();

        mem.write32(0x100, 0x0102_0304);
        assert_eq!(&mem.ram()[0x100..0x104], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(mem.read8(0x100), 0x01);
        assert_eq!(mem.read16(0x102), 0x0304);
        assert_eq!(mem.read32(0x100), 0x0102_0304);
    }

    #[test]
    fn test_fetch32() {
        let mut mem = create_test_memory();
        mem.write32(0x2000, 0x3860_0005);
        assert_eq!(mem.fetch32(0x2000), 0x3860_0005);
    }

    #[test]
    fn test_straddling_end_of_ram() {
        let mut mem = MemorySystem::new(PAGE_SIZE).unwrap();

        mem.write32(0xFFC, 0xAABB_CCDD);
        assert_eq!(mem.read32(0xFFC), 0xAABB_CCDD);

        // Last byte would land one past the end
        mem.write32(0xFFD, 0x1122_3344);
        assert_eq!(mem.read32(0xFFD), 0);
        assert_eq!(mem.read8(0xFFF), 0xDD);
        assert_eq!(mem.read64(0xFFC), 0);
    }

    #[test]
    fn test_flush_keeps_ram_and_counters() {
        let mut mem = create_test_memory();
        mem.write64(0x800, 0x1122_3344_5566_7788);
        let (hits, misses) = (mem.tlb_hits(), mem.tlb_misses());

        mem.flush();
        assert_eq!(mem.itlb().valid_count(), 0);
        assert_eq!(mem.dtlb().valid_count(), 0);
        assert_eq!((mem.tlb_hits(), mem.tlb_misses()), (hits, misses));

        assert_eq!(mem.read64(0x800), 0x1122_3344_5566_7788);
        assert_eq!(mem.tlb_misses(), misses + 1);
    }

    #[test]
    fn test_allocation_failure() {
        let err = MemorySystem::new(usize::MAX).unwrap_err();
        assert_eq!(err, MemoryError::AllocationFailed { size: usize::MAX });
    }

    #[test]
    fn test_from_config() {
        let config = MemoryConfig { ram_size: 2 * PAGE_SIZE };
        let mem = MemorySystem::from_config(&config).unwrap();
        assert_eq!(mem.ram_size(), 2 * PAGE_SIZE);
    }
}

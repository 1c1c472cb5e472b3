//! Guest memory for oxidized-ppc
//!
//! A flat, page-aligned RAM backing store reached through two direct-mapped
//! software TLBs (instruction and data). All multi-byte accesses present
//! PowerPC big-endian semantics regardless of the host byte order.

pub mod constants;
pub mod pages;
pub mod ram;
pub mod system;
pub mod tlb;

pub use op_core::error::MemoryError;
pub use pages::PermissionFlags;
pub use system::MemorySystem;
pub use tlb::{Tlb, TlbEntry, TlbKind};

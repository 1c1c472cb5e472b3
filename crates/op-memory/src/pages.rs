//! Page permission flags

use bitflags::bitflags;

bitflags! {
    /// Access permissions recorded in a TLB entry
    ///
    /// These are stored for diagnostics only: translation and the sized
    /// accessors never check them, so a write through an entry without
    /// `WRITE` still succeeds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PermissionFlags: u32 {
        /// Page is readable
        const READ  = 0b001;
        /// Page is writable
        const WRITE = 0b010;
        /// Page is executable
        const EXEC  = 0b100;

        /// Read and write access
        const RW  = Self::READ.bits() | Self::WRITE.bits();
        /// Read and execute access
        const RX  = Self::READ.bits() | Self::EXEC.bits();
        /// Read, write, and execute access
        const RWX = Self::READ.bits() | Self::WRITE.bits() | Self::EXEC.bits();
    }
}

impl Default for PermissionFlags {
    fn default() -> Self {
        Self::empty()
    }
}

//! Debugging tools for oxidized-ppc
//!
//! Currently a PPU disassembler that renders decoded instructions as
//! assembler-style text.

pub mod disassembler;

pub use disassembler::{DisassembledInstruction, PpuDisassembler};

//! PowerPC instruction decoding for oxidized-ppc
//!
//! Classifies 32-bit instruction words into their encoding form using ordered
//! mask/match tables and extracts the operand fields that form defines. The
//! decoder is stateless and total: every word decodes, unassigned encodings
//! come back as [`InstructionForm::Unknown`].

pub mod decoder;
pub mod tables;

pub use decoder::{DecodedInstruction, InstructionForm, PpuDecoder, UNKNOWN_MNEMONIC};
pub use tables::DecodeEntry;

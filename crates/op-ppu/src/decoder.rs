//! PPU instruction decoder

use std::fmt;

use crate::tables;

/// Mnemonic reported for words no table entry accepts
pub const UNKNOWN_MNEMONIC: &str = "unknown";

/// Decoded PPU instruction
///
/// Only the fields defined by `form` carry meaning; everything else holds its
/// default. Check `form` before reading operands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DecodedInstruction {
    /// Raw instruction word
    pub raw: u32,
    /// Instruction form
    pub form: InstructionForm,
    /// Primary opcode (bits 0-5)
    pub op: u8,
    /// Extended opcode (opcodes 19, 31, 59 and 63 only)
    pub xo: u16,

    /// Target/source GPR
    pub rt: u8,
    /// First operand GPR
    pub ra: u8,
    /// Second operand GPR
    pub rb: u8,
    /// Condition register bit fields (BO/BI for B-form)
    pub bt: u8,
    pub ba: u8,
    pub bb: u8,
    /// Floating-point registers
    pub frt: u8,
    pub fra: u8,
    pub frb: u8,
    pub frc: u8,
    /// Unsigned 16-bit immediate
    pub imm: u16,
    /// Signed 16-bit immediate / displacement
    pub simm: i16,
    /// Sign-extended, word-aligned branch displacement or absolute target
    pub addr: i32,
    /// Special purpose register number
    pub spr: u16,
    /// Rotate amount and mask bounds
    pub sh: u8,
    pub mb: u8,
    pub me: u8,

    /// Record bit (Rc)
    pub rc: bool,
    /// Overflow enable (OE)
    pub oe: bool,
    /// Link bit (LK)
    pub lk: bool,
    /// Absolute address (AA)
    pub aa: bool,
}

impl DecodedInstruction {
    /// Display mnemonic, looked up from `raw` and `op`
    pub fn name(&self) -> &'static str {
        PpuDecoder::instruction_name(self)
    }

    /// Whether any table entry accepted the word
    pub fn is_known(&self) -> bool {
        self.form != InstructionForm::Unknown
    }
}

/// PPU instruction forms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InstructionForm {
    /// I-Form: Branch instructions
    I,
    /// B-Form: Conditional branch
    B,
    /// SC-Form: System call
    SC,
    /// D-Form: Load/store with displacement, immediate arithmetic
    D,
    /// DS-Form: Load/store double with displacement
    DS,
    /// X-Form: Register-register operations, indexed load/store
    X,
    /// XL-Form: CR logical, branch conditional to LR/CTR
    XL,
    /// XFX-Form: Move to/from special registers
    XFX,
    /// XFL-Form: Move to FPSCR
    XFL,
    /// A-Form: Floating-point arithmetic
    A,
    /// M-Form: Rotate and mask
    M,
    /// MD-Form: Rotate and mask (64-bit)
    MD,
    /// MDS-Form: Rotate and mask shift (64-bit)
    MDS,
    /// Unknown form
    #[default]
    Unknown,
}

impl InstructionForm {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::I => "I",
            Self::B => "B",
            Self::SC => "SC",
            Self::D => "D",
            Self::DS => "DS",
            Self::X => "X",
            Self::XL => "XL",
            Self::XFX => "XFX",
            Self::XFL => "XFL",
            Self::A => "A",
            Self::M => "M",
            Self::MD => "MD",
            Self::MDS => "MDS",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for InstructionForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PPU instruction decoder
pub struct PpuDecoder;

impl PpuDecoder {
    /// Decode a 32-bit PPU instruction
    pub fn decode(raw: u32) -> DecodedInstruction {
        let op = Self::primary_opcode(raw);

        let Some(entry) = tables::lookup(raw, op) else {
            return DecodedInstruction {
                raw,
                op,
                xo: Self::extended_opcode(raw, op, InstructionForm::Unknown),
                ..Default::default()
            };
        };

        let form = entry.form;
        let (rt, ra, simm) = Self::d_form(raw);
        let mut inst = DecodedInstruction {
            raw,
            form,
            op,
            xo: Self::extended_opcode(raw, op, form),
            rt,
            ra,
            rb: field(raw, 11, 5),
            rc: raw & 1 != 0,
            simm,
            imm: (raw & 0xFFFF) as u16,
            ..Default::default()
        };

        match form {
            InstructionForm::I => {
                let (li, aa, lk) = Self::i_form(raw);
                inst.addr = li;
                inst.aa = aa;
                inst.lk = lk;
            }
            InstructionForm::B => {
                let (bo, bi, bd, aa, lk) = Self::b_form(raw);
                inst.bt = bo;
                inst.ba = bi;
                inst.bb = field(raw, 11, 5);
                inst.addr = bd;
                inst.aa = aa;
                inst.lk = lk;
            }
            InstructionForm::DS => {
                let (_, _, ds) = Self::ds_form(raw);
                inst.simm = ds;
            }
            InstructionForm::X => {
                let (_, _, _, _, oe, rc) = Self::x_form(raw);
                inst.oe = oe;
                inst.rc = rc;
            }
            InstructionForm::XL => {
                let (bt, ba, bb, _, lk) = Self::xl_form(raw);
                inst.bt = bt;
                inst.ba = ba;
                inst.bb = bb;
                inst.lk = lk;
            }
            InstructionForm::XFX => {
                let (_, spr, _) = Self::xfx_form(raw);
                inst.spr = spr;
            }
            InstructionForm::A => {
                let (frt, fra, frb, frc, _, rc) = Self::a_form(raw);
                inst.frt = frt;
                inst.fra = fra;
                inst.frb = frb;
                inst.frc = frc;
                inst.rc = rc;
            }
            InstructionForm::M => {
                let (_, _, sh, mb, me, rc) = Self::m_form(raw);
                inst.sh = sh;
                inst.mb = mb;
                inst.me = me;
                inst.rc = rc;
            }
            // D reuses the common fields; 64-bit rotates and FPSCR moves
            // have no dedicated fields yet.
            InstructionForm::SC
            | InstructionForm::D
            | InstructionForm::XFL
            | InstructionForm::MD
            | InstructionForm::MDS
            | InstructionForm::Unknown => {}
        }

        inst
    }

    /// Mnemonic for a decoded instruction, or [`UNKNOWN_MNEMONIC`]
    ///
    /// The tables are searched again from `raw`, with the family table picked
    /// by `op`; the stored `form` is not consulted.
    pub fn instruction_name(inst: &DecodedInstruction) -> &'static str {
        tables::lookup(inst.raw, inst.op).map_or(UNKNOWN_MNEMONIC, |entry| entry.mnemonic)
    }

    /// Primary opcode (bits 0-5)
    #[inline]
    pub const fn primary_opcode(raw: u32) -> u8 {
        field(raw, 26, 6)
    }

    /// Extended opcode for the opcode families that have one
    #[inline]
    fn extended_opcode(raw: u32, op: u8, form: InstructionForm) -> u16 {
        match (op, form) {
            (59 | 63, InstructionForm::A) => ((raw >> 1) & 0x1F) as u16,
            (19 | 31 | 59 | 63, _) => ((raw >> 1) & 0x3FF) as u16,
            _ => 0,
        }
    }

    /// Extract D-form fields
    #[inline]
    pub fn d_form(raw: u32) -> (u8, u8, i16) {
        let rt = field(raw, 21, 5);
        let ra = field(raw, 16, 5);
        let d = (raw & 0xFFFF) as i16;
        (rt, ra, d)
    }

    /// Extract DS-form fields (displacement is a multiple of 4)
    #[inline]
    pub fn ds_form(raw: u32) -> (u8, u8, i16) {
        let rt = field(raw, 21, 5);
        let ra = field(raw, 16, 5);
        let ds = (raw & 0xFFFC) as i16;
        (rt, ra, ds)
    }

    /// Extract X-form fields
    #[inline]
    pub fn x_form(raw: u32) -> (u8, u8, u8, u16, bool, bool) {
        let rt = field(raw, 21, 5);
        let ra = field(raw, 16, 5);
        let rb = field(raw, 11, 5);
        let oe = (raw >> 10) & 1 != 0;
        let xo = ((raw >> 1) & 0x3FF) as u16;
        let rc = raw & 1 != 0;
        (rt, ra, rb, xo, oe, rc)
    }

    /// Extract XL-form fields
    #[inline]
    pub fn xl_form(raw: u32) -> (u8, u8, u8, u16, bool) {
        let bt = field(raw, 21, 5);
        let ba = field(raw, 16, 5);
        let bb = field(raw, 11, 5);
        let xo = ((raw >> 1) & 0x3FF) as u16;
        let lk = raw & 1 != 0;
        (bt, ba, bb, xo, lk)
    }

    /// Extract XFX-form fields
    ///
    /// The SPR number is stored with its halves swapped: the low five bits
    /// sit in bits 16-20 of the word, the high five in bits 11-15.
    #[inline]
    pub fn xfx_form(raw: u32) -> (u8, u16, u16) {
        let rt = field(raw, 21, 5);
        let spr = ((raw >> 16) & 0x1F) as u16 | ((((raw >> 11) & 0x1F) as u16) << 5);
        let xo = ((raw >> 1) & 0x3FF) as u16;
        (rt, spr, xo)
    }

    /// Extract I-form fields (branch)
    #[inline]
    pub fn i_form(raw: u32) -> (i32, bool, bool) {
        let li = ((raw >> 2) & 0xFFFFFF) as i32;
        // Sign extend from 24 bits
        let li = if li & 0x800000 != 0 {
            li | !0xFFFFFF
        } else {
            li
        } << 2;
        let aa = (raw >> 1) & 1 != 0;
        let lk = raw & 1 != 0;
        (li, aa, lk)
    }

    /// Extract B-form fields (conditional branch)
    #[inline]
    pub fn b_form(raw: u32) -> (u8, u8, i32, bool, bool) {
        let bo = field(raw, 21, 5);
        let bi = field(raw, 16, 5);
        // 14-bit displacement already sits word-aligned in the low halfword
        let bd = (raw & 0xFFFC) as u16 as i16 as i32;
        let aa = (raw >> 1) & 1 != 0;
        let lk = raw & 1 != 0;
        (bo, bi, bd, aa, lk)
    }

    /// Extract A-form fields (floating-point)
    #[inline]
    pub fn a_form(raw: u32) -> (u8, u8, u8, u8, u16, bool) {
        let frt = field(raw, 21, 5);
        let fra = field(raw, 16, 5);
        let frb = field(raw, 11, 5);
        let frc = field(raw, 6, 5);
        let xo = ((raw >> 1) & 0x1F) as u16;
        let rc = raw & 1 != 0;
        (frt, fra, frb, frc, xo, rc)
    }

    /// Extract M-form fields (rotate)
    #[inline]
    pub fn m_form(raw: u32) -> (u8, u8, u8, u8, u8, bool) {
        let rs = field(raw, 21, 5);
        let ra = field(raw, 16, 5);
        let sh = field(raw, 11, 5);
        let mb = field(raw, 6, 5);
        let me = field(raw, 1, 5);
        let rc = raw & 1 != 0;
        (rs, ra, sh, mb, me, rc)
    }
}

/// `width`-bit field starting `shift` bits above the least significant bit
#[inline]
const fn field(raw: u32, shift: u32, width: u32) -> u8 {
    ((raw >> shift) & ((1 << width) - 1)) as u8
}

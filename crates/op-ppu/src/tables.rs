//! Instruction decode tables
//!
//! Each table is scanned front to back and the first entry whose mask/match
//! pair accepts the word wins, so overlapping entries must be ordered from
//! most to least specific.

use crate::decoder::InstructionForm::{self, *};

/// Primary opcode only (bits 0-5)
const OPCD: u32 = 0xFC00_0000;
/// Primary opcode plus 10-bit extended opcode (bits 21-30)
const XO: u32 = 0xFC00_07FE;
/// Primary opcode plus 5-bit A-form extended opcode (bits 26-30)
const A_XO: u32 = 0xFC00_003E;
/// Primary opcode plus 2-bit DS-form extended opcode (bits 30-31)
const DS_XO: u32 = 0xFC00_0003;
/// Primary opcode plus 3-bit MD-form extended opcode (bits 27-29)
const MD_XO: u32 = 0xFC00_001C;
/// Primary opcode plus 4-bit MDS-form extended opcode (bits 27-30)
const MDS_XO: u32 = 0xFC00_001E;

/// One mask/match decode rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeEntry {
    /// Bits that take part in the comparison
    pub mask: u32,
    /// Required value of the masked bits
    pub value: u32,
    /// Encoding form of matching words
    pub form: InstructionForm,
    /// Display name
    pub mnemonic: &'static str,
}

impl DecodeEntry {
    const fn new(mask: u32, value: u32, form: InstructionForm, mnemonic: &'static str) -> Self {
        Self {
            mask,
            value,
            form,
            mnemonic,
        }
    }

    /// Whether `raw` is accepted by this entry
    #[inline]
    pub const fn matches(&self, raw: u32) -> bool {
        raw & self.mask == self.value
    }
}

/// Opcodes fully identified by their primary opcode (plus DS/MD sub-opcodes)
pub static PRIMARY_TABLE: &[DecodeEntry] = &[
    // D-form arithmetic and traps
    DecodeEntry::new(OPCD, 0x0800_0000, D, "tdi"),
    DecodeEntry::new(OPCD, 0x0C00_0000, D, "twi"),
    DecodeEntry::new(OPCD, 0x1C00_0000, D, "mulli"),
    DecodeEntry::new(OPCD, 0x2000_0000, D, "subfic"),
    DecodeEntry::new(OPCD, 0x2800_0000, D, "cmpli"),
    DecodeEntry::new(OPCD, 0x2C00_0000, D, "cmpi"),
    DecodeEntry::new(OPCD, 0x3000_0000, D, "addic"),
    DecodeEntry::new(OPCD, 0x3400_0000, D, "addic."),
    DecodeEntry::new(OPCD, 0x3800_0000, D, "addi"),
    DecodeEntry::new(OPCD, 0x3C00_0000, D, "addis"),
    // Branches and system call
    DecodeEntry::new(OPCD, 0x4000_0000, B, "bc"),
    DecodeEntry::new(OPCD, 0x4400_0000, SC, "sc"),
    DecodeEntry::new(OPCD, 0x4800_0000, I, "b"),
    // 32-bit rotate and mask
    DecodeEntry::new(OPCD, 0x5000_0000, M, "rlwimi"),
    DecodeEntry::new(OPCD, 0x5400_0000, M, "rlwinm"),
    DecodeEntry::new(OPCD, 0x5C00_0000, M, "rlwnm"),
    // D-form logical immediates
    DecodeEntry::new(OPCD, 0x6000_0000, D, "ori"),
    DecodeEntry::new(OPCD, 0x6400_0000, D, "oris"),
    DecodeEntry::new(OPCD, 0x6800_0000, D, "xori"),
    DecodeEntry::new(OPCD, 0x6C00_0000, D, "xoris"),
    DecodeEntry::new(OPCD, 0x7000_0000, D, "andi."),
    DecodeEntry::new(OPCD, 0x7400_0000, D, "andis."),
    // 64-bit rotate and mask
    DecodeEntry::new(MD_XO, 0x7800_0000, MD, "rldicl"),
    DecodeEntry::new(MD_XO, 0x7800_0004, MD, "rldicr"),
    DecodeEntry::new(MD_XO, 0x7800_0008, MD, "rldic"),
    DecodeEntry::new(MD_XO, 0x7800_000C, MD, "rldimi"),
    DecodeEntry::new(MDS_XO, 0x7800_0010, MDS, "rldcl"),
    DecodeEntry::new(MDS_XO, 0x7800_0012, MDS, "rldcr"),
    // Integer loads and stores
    DecodeEntry::new(OPCD, 0x8000_0000, D, "lwz"),
    DecodeEntry::new(OPCD, 0x8400_0000, D, "lwzu"),
    DecodeEntry::new(OPCD, 0x8800_0000, D, "lbz"),
    DecodeEntry::new(OPCD, 0x8C00_0000, D, "lbzu"),
    DecodeEntry::new(OPCD, 0x9000_0000, D, "stw"),
    DecodeEntry::new(OPCD, 0x9400_0000, D, "stwu"),
    DecodeEntry::new(OPCD, 0x9800_0000, D, "stb"),
    DecodeEntry::new(OPCD, 0x9C00_0000, D, "stbu"),
    DecodeEntry::new(OPCD, 0xA000_0000, D, "lhz"),
    DecodeEntry::new(OPCD, 0xA400_0000, D, "lhzu"),
    DecodeEntry::new(OPCD, 0xA800_0000, D, "lha"),
    DecodeEntry::new(OPCD, 0xAC00_0000, D, "lhau"),
    DecodeEntry::new(OPCD, 0xB000_0000, D, "sth"),
    DecodeEntry::new(OPCD, 0xB400_0000, D, "sthu"),
    DecodeEntry::new(OPCD, 0xB800_0000, D, "lmw"),
    DecodeEntry::new(OPCD, 0xBC00_0000, D, "stmw"),
    // Floating-point loads and stores
    DecodeEntry::new(OPCD, 0xC000_0000, D, "lfs"),
    DecodeEntry::new(OPCD, 0xC400_0000, D, "lfsu"),
    DecodeEntry::new(OPCD, 0xC800_0000, D, "lfd"),
    DecodeEntry::new(OPCD, 0xCC00_0000, D, "lfdu"),
    DecodeEntry::new(OPCD, 0xD000_0000, D, "stfs"),
    DecodeEntry::new(OPCD, 0xD400_0000, D, "stfsu"),
    DecodeEntry::new(OPCD, 0xD800_0000, D, "stfd"),
    DecodeEntry::new(OPCD, 0xDC00_0000, D, "stfdu"),
    // 64-bit loads and stores
    DecodeEntry::new(DS_XO, 0xE800_0000, DS, "ld"),
    DecodeEntry::new(DS_XO, 0xE800_0001, DS, "ldu"),
    DecodeEntry::new(DS_XO, 0xE800_0002, DS, "lwa"),
    DecodeEntry::new(DS_XO, 0xF800_0000, DS, "std"),
    DecodeEntry::new(DS_XO, 0xF800_0001, DS, "stdu"),
];

/// Opcode 31: register-register arithmetic, logical, shifts, indexed loads/stores
pub static X_TABLE: &[DecodeEntry] = &[
    // Arithmetic
    DecodeEntry::new(XO, 0x7C00_0214, X, "add"),
    DecodeEntry::new(XO, 0x7C00_0014, X, "addc"),
    DecodeEntry::new(XO, 0x7C00_0114, X, "adde"),
    DecodeEntry::new(XO, 0x7C00_0194, X, "addze"),
    DecodeEntry::new(XO, 0x7C00_01D4, X, "addme"),
    DecodeEntry::new(XO, 0x7C00_0050, X, "subf"),
    DecodeEntry::new(XO, 0x7C00_0010, X, "subfc"),
    DecodeEntry::new(XO, 0x7C00_0110, X, "subfe"),
    DecodeEntry::new(XO, 0x7C00_0190, X, "subfze"),
    DecodeEntry::new(XO, 0x7C00_01D0, X, "subfme"),
    DecodeEntry::new(XO, 0x7C00_0034, X, "cntlzw"),
    // Logical
    DecodeEntry::new(XO, 0x7C00_0038, X, "and"),
    DecodeEntry::new(XO, 0x7C00_0078, X, "andc"),
    DecodeEntry::new(XO, 0x7C00_0378, X, "or"),
    DecodeEntry::new(XO, 0x7C00_0338, X, "orc"),
    DecodeEntry::new(XO, 0x7C00_0278, X, "xor"),
    DecodeEntry::new(XO, 0x7C00_00F8, X, "nor"),
    DecodeEntry::new(XO, 0x7C00_0238, X, "eqv"),
    DecodeEntry::new(XO, 0x7C00_03B8, X, "nand"),
    // Shifts
    DecodeEntry::new(XO, 0x7C00_0030, X, "slw"),
    DecodeEntry::new(XO, 0x7C00_0430, X, "srw"),
    DecodeEntry::new(XO, 0x7C00_0630, X, "sraw"),
    DecodeEntry::new(XO, 0x7C00_0670, X, "srawi"),
    // Multiply/divide
    DecodeEntry::new(XO, 0x7C00_0096, X, "mulhw"),
    DecodeEntry::new(XO, 0x7C00_0016, X, "mulhwu"),
    DecodeEntry::new(XO, 0x7C00_01D6, X, "mullw"),
    DecodeEntry::new(XO, 0x7C00_03D6, X, "divw"),
    DecodeEntry::new(XO, 0x7C00_0396, X, "divwu"),
    // Compare
    DecodeEntry::new(XO, 0x7C00_0000, X, "cmp"),
    DecodeEntry::new(XO, 0x7C00_0040, X, "cmpl"),
    // Indexed loads and stores
    DecodeEntry::new(XO, 0x7C00_002E, X, "lwzx"),
    DecodeEntry::new(XO, 0x7C00_006E, X, "lwzux"),
    DecodeEntry::new(XO, 0x7C00_00AE, X, "lbzx"),
    DecodeEntry::new(XO, 0x7C00_00EE, X, "lbzux"),
    DecodeEntry::new(XO, 0x7C00_012E, X, "stwx"),
    DecodeEntry::new(XO, 0x7C00_016E, X, "stwux"),
    DecodeEntry::new(XO, 0x7C00_01AE, X, "stbx"),
    DecodeEntry::new(XO, 0x7C00_01EE, X, "stbux"),
    DecodeEntry::new(XO, 0x7C00_022E, X, "lhzx"),
    DecodeEntry::new(XO, 0x7C00_026E, X, "lhzux"),
    DecodeEntry::new(XO, 0x7C00_02AE, X, "lhax"),
    DecodeEntry::new(XO, 0x7C00_02EE, X, "lhaux"),
    DecodeEntry::new(XO, 0x7C00_032E, X, "sthx"),
    DecodeEntry::new(XO, 0x7C00_036E, X, "sthux"),
    // Synchronization and machine state
    DecodeEntry::new(XO, 0x7C00_04AC, X, "sync"),
    DecodeEntry::new(XO, 0x7C00_00A6, X, "mfmsr"),
    DecodeEntry::new(XO, 0x7C00_0124, X, "mtmsr"),
];

/// Opcode 31 fallback: moves to/from special registers
pub static XFX_TABLE: &[DecodeEntry] = &[
    DecodeEntry::new(XO, 0x7C00_02A6, XFX, "mfspr"),
    DecodeEntry::new(XO, 0x7C00_03A6, XFX, "mtspr"),
    DecodeEntry::new(XO, 0x7C00_0026, XFX, "mfcr"),
    DecodeEntry::new(XO, 0x7C00_0120, XFX, "mtcrf"),
];

/// Opcode 19: condition register logical ops and branches to LR/CTR
pub static XL_TABLE: &[DecodeEntry] = &[
    DecodeEntry::new(XO, 0x4C00_0020, XL, "bclr"),
    DecodeEntry::new(XO, 0x4C00_0420, XL, "bcctr"),
    DecodeEntry::new(XO, 0x4C00_0202, XL, "crand"),
    DecodeEntry::new(XO, 0x4C00_0102, XL, "crandc"),
    DecodeEntry::new(XO, 0x4C00_0242, XL, "creqv"),
    DecodeEntry::new(XO, 0x4C00_01C2, XL, "crnand"),
    DecodeEntry::new(XO, 0x4C00_0042, XL, "crnor"),
    DecodeEntry::new(XO, 0x4C00_0382, XL, "cror"),
    DecodeEntry::new(XO, 0x4C00_0342, XL, "crorc"),
    DecodeEntry::new(XO, 0x4C00_0182, XL, "crxor"),
    DecodeEntry::new(XO, 0x4C00_0000, XL, "mcrf"),
];

/// Opcodes 59 and 63: floating-point arithmetic
///
/// A-form entries compare only the 5-bit sub-opcode in bits 26-30, so the
/// 10-bit `mtfsf` pattern sits ahead of them.
pub static FP_TABLE: &[DecodeEntry] = &[
    DecodeEntry::new(XO, 0xFC00_058E, XFL, "mtfsf"),
    // Double precision (opcode 63)
    DecodeEntry::new(A_XO, 0xFC00_002A, A, "fadd"),
    DecodeEntry::new(A_XO, 0xFC00_0028, A, "fsub"),
    DecodeEntry::new(A_XO, 0xFC00_0032, A, "fmul"),
    DecodeEntry::new(A_XO, 0xFC00_0024, A, "fdiv"),
    DecodeEntry::new(A_XO, 0xFC00_002E, A, "fsel"),
    DecodeEntry::new(A_XO, 0xFC00_003A, A, "fmadd"),
    DecodeEntry::new(A_XO, 0xFC00_0038, A, "fmsub"),
    DecodeEntry::new(A_XO, 0xFC00_003E, A, "fnmadd"),
    DecodeEntry::new(A_XO, 0xFC00_003C, A, "fnmsub"),
    // Single precision (opcode 59)
    DecodeEntry::new(A_XO, 0xEC00_002A, A, "fadds"),
    DecodeEntry::new(A_XO, 0xEC00_0028, A, "fsubs"),
    DecodeEntry::new(A_XO, 0xEC00_0032, A, "fmuls"),
    DecodeEntry::new(A_XO, 0xEC00_0024, A, "fdivs"),
    DecodeEntry::new(A_XO, 0xEC00_003A, A, "fmadds"),
    DecodeEntry::new(A_XO, 0xEC00_0038, A, "fmsubs"),
    DecodeEntry::new(A_XO, 0xEC00_003E, A, "fnmadds"),
    DecodeEntry::new(A_XO, 0xEC00_003C, A, "fnmsubs"),
];

/// First entry of `table` accepting `raw`
#[inline]
pub fn scan(table: &'static [DecodeEntry], raw: u32) -> Option<&'static DecodeEntry> {
    table.iter().find(|entry| entry.matches(raw))
}

/// Resolve `raw` against the primary table, then the family table selected by `op`
pub fn lookup(raw: u32, op: u8) -> Option<&'static DecodeEntry> {
    scan(PRIMARY_TABLE, raw).or_else(|| match op {
        19 => scan(XL_TABLE, raw),
        31 => scan(X_TABLE, raw).or_else(|| scan(XFX_TABLE, raw)),
        59 | 63 => scan(FP_TABLE, raw),
        _ => None,
    })
}

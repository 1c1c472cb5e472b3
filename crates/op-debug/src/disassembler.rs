//! Disassembler for PPU instructions

use std::fmt;

use op_ppu::{DecodedInstruction, InstructionForm, PpuDecoder};

/// Disassembled instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledInstruction {
    /// Address of the instruction
    pub address: u64,
    /// Raw instruction word
    pub opcode: u32,
    /// Encoding form reported by the decoder
    pub form: InstructionForm,
    /// Mnemonic (instruction name)
    pub mnemonic: String,
    /// Operands as a string
    pub operands: String,
}

impl DisassembledInstruction {
    /// Get opcode as hex string
    pub fn opcode_hex(&self) -> String {
        format!("{:08X}", self.opcode)
    }
}

impl fmt::Display for DisassembledInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            f.write_str(&self.mnemonic)
        } else {
            write!(f, "{:8} {}", self.mnemonic, self.operands)
        }
    }
}

/// PPU instruction disassembler
pub struct PpuDisassembler;

impl PpuDisassembler {
    /// Disassemble a single PPU instruction
    pub fn disassemble(address: u64, opcode: u32) -> DisassembledInstruction {
        let inst = PpuDecoder::decode(opcode);
        let name = inst.name();

        let (mnemonic, operands) = match inst.form {
            InstructionForm::I => Self::branch(address, &inst),
            InstructionForm::B => {
                let (mnem, target) = Self::branch(address, &inst);
                let operands = format!("{}, {}, {}", inst.bt, inst.ba, target);
                (mnem.replacen('b', "bc", 1), operands)
            }
            InstructionForm::SC => (name.to_string(), String::new()),
            InstructionForm::D => Self::d_form(name, &inst),
            InstructionForm::DS => {
                let operands = format!("r{}, {}(r{})", inst.rt, inst.simm, inst.ra);
                (name.to_string(), operands)
            }
            InstructionForm::X => Self::x_form(name, &inst),
            InstructionForm::XL => Self::xl_form(name, &inst),
            InstructionForm::XFX => Self::xfx_form(name, &inst),
            InstructionForm::XFL => {
                let flm = (opcode >> 17) & 0xFF;
                let frb = (opcode >> 11) & 0x1F;
                (Self::record(name, inst.rc), format!("0x{:X}, f{}", flm, frb))
            }
            InstructionForm::A => Self::a_form(name, &inst),
            InstructionForm::M => {
                let shift = if name == "rlwnm" {
                    format!("r{}", inst.rb)
                } else {
                    inst.sh.to_string()
                };
                (
                    Self::record(name, inst.rc),
                    format!("r{}, r{}, {}, {}, {}", inst.ra, inst.rt, shift, inst.mb, inst.me),
                )
            }
            InstructionForm::MD | InstructionForm::MDS => {
                (name.to_string(), format!("r{}, r{}", inst.ra, inst.rt))
            }
            InstructionForm::Unknown => (name.to_string(), format!("0x{:08X}", opcode)),
        };

        DisassembledInstruction {
            address,
            opcode,
            form: inst.form,
            mnemonic,
            operands,
        }
    }

    /// Branch mnemonic with link/absolute suffixes and the resolved target
    fn branch(address: u64, inst: &DecodedInstruction) -> (String, String) {
        let target = if inst.aa {
            inst.addr as i64 as u64
        } else {
            address.wrapping_add(inst.addr as i64 as u64)
        };
        let mnem = match (inst.lk, inst.aa) {
            (false, false) => "b",
            (true, false) => "bl",
            (false, true) => "ba",
            (true, true) => "bla",
        };
        (mnem.to_string(), format!("0x{:X}", target))
    }

    fn d_form(name: &str, inst: &DecodedInstruction) -> (String, String) {
        let (rt, ra) = (inst.rt, inst.ra);
        match inst.op {
            // addi r, 0, n
            14 if ra == 0 => ("li".to_string(), format!("r{}, {}", rt, inst.simm)),
            15 if ra == 0 => ("lis".to_string(), format!("r{}, 0x{:X}", rt, inst.imm)),
            // ori 0, 0, 0
            24 if rt == 0 && ra == 0 && inst.imm == 0 => ("nop".to_string(), String::new()),
            // Logical immediates put the source in the RT slot
            24..=29 => (name.to_string(), format!("r{}, r{}, 0x{:X}", ra, rt, inst.imm)),
            10 => (name.to_string(), format!("cr{}, r{}, 0x{:X}", rt >> 2, ra, inst.imm)),
            11 => (name.to_string(), format!("cr{}, r{}, {}", rt >> 2, ra, inst.simm)),
            2 | 3 => (name.to_string(), format!("{}, r{}, {}", rt, ra, inst.simm)),
            32..=47 => (name.to_string(), format!("r{}, {}(r{})", rt, inst.simm, ra)),
            48..=55 => (name.to_string(), format!("f{}, {}(r{})", rt, inst.simm, ra)),
            _ => (name.to_string(), format!("r{}, r{}, {}", rt, ra, inst.simm)),
        }
    }

    fn x_form(name: &str, inst: &DecodedInstruction) -> (String, String) {
        let (rt, ra, rb) = (inst.rt, inst.ra, inst.rb);
        let operands = match name {
            "and" | "andc" | "or" | "orc" | "xor" | "nor" | "eqv" | "nand" | "slw" | "srw"
            | "sraw" => {
                format!("r{}, r{}, r{}", ra, rt, rb)
            }
            "srawi" => format!("r{}, r{}, {}", ra, rt, rb),
            "cntlzw" => format!("r{}, r{}", ra, rt),
            "cmp" | "cmpl" => format!("cr{}, r{}, r{}", rt >> 2, ra, rb),
            "mfmsr" | "mtmsr" => format!("r{}", rt),
            "sync" => String::new(),
            _ => format!("r{}, r{}, r{}", rt, ra, rb),
        };
        (Self::record(name, inst.rc), operands)
    }

    fn xl_form(name: &str, inst: &DecodedInstruction) -> (String, String) {
        let (bt, ba, bb) = (inst.bt, inst.ba, inst.bb);
        match name {
            "bclr" | "bcctr" => {
                let target = if name == "bclr" { "lr" } else { "ctr" };
                let link = if inst.lk { "l" } else { "" };
                // Branch always
                if bt == 20 && ba == 0 {
                    (format!("b{}{}", target, link), String::new())
                } else {
                    (format!("{}{}", name, link), format!("{}, {}", bt, ba))
                }
            }
            "mcrf" => (name.to_string(), format!("cr{}, cr{}", bt >> 2, ba >> 2)),
            _ => (name.to_string(), format!("{}, {}, {}", bt, ba, bb)),
        }
    }

    fn xfx_form(name: &str, inst: &DecodedInstruction) -> (String, String) {
        match name {
            "mfspr" => (name.to_string(), format!("r{}, {}", inst.rt, Self::spr_name(inst.spr))),
            "mtspr" => (name.to_string(), format!("{}, r{}", Self::spr_name(inst.spr), inst.rt)),
            "mtcrf" => {
                let crm = (inst.raw >> 12) & 0xFF;
                (name.to_string(), format!("0x{:X}, r{}", crm, inst.rt))
            }
            _ => (name.to_string(), format!("r{}", inst.rt)),
        }
    }

    fn a_form(name: &str, inst: &DecodedInstruction) -> (String, String) {
        let operands = match name.trim_end_matches('s') {
            "fadd" | "fsub" | "fdiv" => format!("f{}, f{}, f{}", inst.frt, inst.fra, inst.frb),
            "fmul" => format!("f{}, f{}, f{}", inst.frt, inst.fra, inst.frc),
            _ => format!("f{}, f{}, f{}, f{}", inst.frt, inst.fra, inst.frc, inst.frb),
        };
        (Self::record(name, inst.rc), operands)
    }

    /// Append the record suffix
    fn record(name: &str, rc: bool) -> String {
        if rc && !name.ends_with('.') {
            format!("{}.", name)
        } else {
            name.to_string()
        }
    }

    /// Get SPR name from number
    fn spr_name(spr: u16) -> String {
        match spr {
            1 => "XER".to_string(),
            8 => "LR".to_string(),
            9 => "CTR".to_string(),
            18 => "DSISR".to_string(),
            19 => "DAR".to_string(),
            22 => "DEC".to_string(),
            25 => "SDR1".to_string(),
            26 => "SRR0".to_string(),
            27 => "SRR1".to_string(),
            256 => "VRSAVE".to_string(),
            272 => "SPRG0".to_string(),
            273 => "SPRG1".to_string(),
            274 => "SPRG2".to_string(),
            275 => "SPRG3".to_string(),
            287 => "PVR".to_string(),
            _ => format!("SPR{}", spr),
        }
    }

    /// Disassemble a range of big-endian instruction words
    ///
    /// Addresses wrap at the top of the address space.
    pub fn disassemble_range(
        memory: &[u8],
        base_address: u64,
        count: usize,
    ) -> Vec<DisassembledInstruction> {
        memory
            .chunks_exact(4)
            .take(count)
            .enumerate()
            .map(|(i, word)| {
                let opcode = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
                Self::disassemble(base_address.wrapping_add(i as u64 * 4), opcode)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_nop() {
        // ori r0, r0, 0 = nop
        let dis = PpuDisassembler::disassemble(0, 0x60000000);
        assert_eq!(dis.mnemonic, "nop");
        assert_eq!(dis.to_string(), "nop");
    }

    #[test]
    fn test_disassemble_li() {
        // addi r3, r0, 5
        let dis = PpuDisassembler::disassemble(0, 0x38600005);
        assert_eq!(dis.mnemonic, "li");
        assert_eq!(dis.operands, "r3, 5");
        assert_eq!(dis.form, InstructionForm::D);
    }

    #[test]
    fn test_disassemble_add() {
        let dis = PpuDisassembler::disassemble(0, 0x7C601A14);
        assert_eq!(dis.mnemonic, "add");
        assert_eq!(dis.operands, "r3, r0, r3");
        assert_eq!(dis.to_string(), "add      r3, r0, r3");
    }

    #[test]
    fn test_disassemble_logical_record() {
        // and. r3, r4, r5
        let dis = PpuDisassembler::disassemble(0, 0x7C832839);
        assert_eq!(dis.mnemonic, "and.");
        assert_eq!(dis.operands, "r3, r4, r5");
    }

    #[test]
    fn test_disassemble_branches() {
        let dis = PpuDisassembler::disassemble(0x1000, 0x48000100);
        assert_eq!(dis.mnemonic, "b");
        assert_eq!(dis.operands, "0x1100");

        let dis = PpuDisassembler::disassemble(0x1000, 0x4BFFFFFD);
        assert_eq!(dis.mnemonic, "bl");
        assert_eq!(dis.operands, "0xFFC");

        // beq cr0, -8
        let dis = PpuDisassembler::disassemble(0x2000, 0x4182FFF8);
        assert_eq!(dis.mnemonic, "bc");
        assert_eq!(dis.operands, "12, 2, 0x1FF8");
    }

    #[test]
    fn test_disassemble_blr() {
        let dis = PpuDisassembler::disassemble(0, 0x4E800020);
        assert_eq!(dis.mnemonic, "blr");
        assert!(dis.operands.is_empty());

        let dis = PpuDisassembler::disassemble(0, 0x4E800421);
        assert_eq!(dis.mnemonic, "bctrl");
    }

    #[test]
    fn test_disassemble_spr_moves() {
        let dis = PpuDisassembler::disassemble(0, 0x7C0802A6);
        assert_eq!(dis.mnemonic, "mfspr");
        assert_eq!(dis.operands, "r0, LR");

        let dis = PpuDisassembler::disassemble(0, 0x7C0903A6);
        assert_eq!(dis.operands, "CTR, r0");
    }

    #[test]
    fn test_disassemble_float() {
        let dis = PpuDisassembler::disassemble(0, 0xFC2220FA);
        assert_eq!(dis.mnemonic, "fmadd");
        assert_eq!(dis.operands, "f1, f2, f3, f4");

        let dis = PpuDisassembler::disassemble(0, 0xEC22182A);
        assert_eq!(dis.mnemonic, "fadds");
        assert_eq!(dis.operands, "f1, f2, f3");
    }

    #[test]
    fn test_disassemble_load_store() {
        let dis = PpuDisassembler::disassemble(0, 0x813FFFF0);
        assert_eq!(dis.to_string(), "lwz      r9, -16(r31)");

        let dis = PpuDisassembler::disassemble(0, 0xFBE1FFF8);
        assert_eq!(dis.operands, "r31, -8(r1)");
    }

    #[test]
    fn test_disassemble_unknown() {
        let dis = PpuDisassembler::disassemble(0, 0x00000000);
        assert_eq!(dis.mnemonic, "unknown");
        assert_eq!(dis.operands, "0x00000000");
        assert_eq!(dis.opcode_hex(), "00000000");
    }

    #[test]
    fn test_disassemble_range() {
        let code = [0x38, 0x60, 0x00, 0x05, 0x7C, 0x60, 0x1A, 0x14, 0x48, 0x00, 0x00, 0x00, 0xFF];
        let lines = PpuDisassembler::disassemble_range(&code, 0x100, 10);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].address, 0x104);
        assert_eq!(lines[2].mnemonic, "b");
        assert_eq!(lines[2].operands, "0x108");
    }

    #[test]
    fn test_disassemble_range_wraps_at_top_of_address_space() {
        let code = [0x38, 0x60, 0x00, 0x05, 0x48, 0x00, 0x00, 0x00];
        let lines = PpuDisassembler::disassemble_range(&code, u64::MAX - 3, 2);
        assert_eq!(lines[0].address, u64::MAX - 3);
        assert_eq!(lines[1].address, 0);
        assert_eq!(lines[1].operands, "0x0");
    }
}

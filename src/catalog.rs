use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Format {
    R,
    I,
    J,
}

/// Register slot a textual operand is encoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Slot {
    Rs,
    Rt,
    Rd,
}

/// What the immediate field of an instruction means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImmRole {
    None,
    /// PC-relative word offset, written as a label or a byte count.
    BranchOffset,
    /// Base-relative byte offset, written `imm($reg)`.
    MemoryOffset,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct InstrDesc {
    pub mnemonic: &'static str,
    pub opcode: u8,
    pub funct: u8,
    pub format: Format,
    /// Register operands in the order they appear in the source text.
    pub operands: &'static [Slot],
    pub role: ImmRole,
    pub comma_count: usize,
    pub parens: bool,
    /// Canonical source form, as shown by `dova catalog`.
    pub syntax: &'static str,
}

impl InstrDesc {
    /// Branches and jumps take a label (or a raw byte offset) operand.
    pub fn takes_target(&self) -> bool {
        self.role == ImmRole::BranchOffset || self.format == Format::J
    }
}

use Slot::{Rd, Rs, Rt};

const fn r(mnemonic: &'static str, funct: u8, operands: &'static [Slot], comma_count: usize, syntax: &'static str) -> InstrDesc {
    InstrDesc { mnemonic, opcode: 0, funct, format: Format::R, operands, role: ImmRole::None, comma_count, parens: false, syntax }
}

const fn i(mnemonic: &'static str, opcode: u8, operands: &'static [Slot], role: ImmRole, syntax: &'static str) -> InstrDesc {
    let parens = matches!(role, ImmRole::MemoryOffset);
    let comma_count = if parens { 1 } else { 2 };
    InstrDesc { mnemonic, opcode, funct: 0, format: Format::I, operands, role, comma_count, parens, syntax }
}

const fn j(mnemonic: &'static str, opcode: u8, syntax: &'static str) -> InstrDesc {
    InstrDesc { mnemonic, opcode, funct: 0, format: Format::J, operands: &[], role: ImmRole::None, comma_count: 0, parens: false, syntax }
}

pub const TABLE: &[InstrDesc] = &[
    r("add", 0x20, &[Rd, Rs, Rt], 2, "add $rd, $rs, $rt"),
    r("sub", 0x22, &[Rd, Rs, Rt], 2, "sub $rd, $rs, $rt"),
    r("and", 0x24, &[Rd, Rs, Rt], 2, "and $rd, $rs, $rt"),
    r("or", 0x25, &[Rd, Rs, Rt], 2, "or $rd, $rs, $rt"),
    r("nor", 0x27, &[Rd, Rs, Rt], 2, "nor $rd, $rs, $rt"),
    r("slt", 0x2a, &[Rd, Rs, Rt], 2, "slt $rd, $rs, $rt"),
    r("sll", 0x00, &[Rd, Rt], 2, "sll $rd, $rt, shamt"),
    r("srl", 0x02, &[Rd, Rt], 2, "srl $rd, $rt, shamt"),
    r("jr", 0x08, &[Rs], 0, "jr $rs"),
    i("addi", 0x08, &[Rt, Rs], ImmRole::None, "addi $rt, $rs, imm"),
    i("andi", 0x0c, &[Rt, Rs], ImmRole::None, "andi $rt, $rs, imm"),
    i("ori", 0x0d, &[Rt, Rs], ImmRole::None, "ori $rt, $rs, imm"),
    i("beq", 0x04, &[Rs, Rt], ImmRole::BranchOffset, "beq $rs, $rt, offset"),
    i("bne", 0x05, &[Rs, Rt], ImmRole::BranchOffset, "bne $rs, $rt, offset"),
    i("lw", 0x23, &[Rt, Rs], ImmRole::MemoryOffset, "lw $rt, offset($rs)"),
    i("sw", 0x2b, &[Rt, Rs], ImmRole::MemoryOffset, "sw $rt, offset($rs)"),
    j("j", 0x02, "j target"),
    j("jal", 0x03, "jal target"),
];

/// Read-only lookup over an instruction table.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    table: &'static [InstrDesc],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::mips()
    }
}

impl Catalog {
    pub fn mips() -> Self {
        Self { table: TABLE }
    }

    pub fn entries(&self) -> &'static [InstrDesc] {
        self.table
    }

    /// Exact, case-sensitive match.
    pub fn by_mnemonic(&self, mnemonic: &str) -> Option<&'static InstrDesc> {
        self.table.iter().find(|d| d.mnemonic == mnemonic)
    }

    /// `funct` is only compared when `opcode` is zero; callers pass 0 otherwise.
    pub fn by_code(&self, opcode: u8, funct: u8) -> Option<&'static InstrDesc> {
        self.table.iter().find(|d| d.opcode == opcode && d.funct == funct)
    }
}

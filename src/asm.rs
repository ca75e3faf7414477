//! Two-pass assembler.
//!
//! Pass 1 ([`SymbolTable::scan`]) fixes every label address. Pass 2 walks the
//! source again with a fresh program counter and turns each code line into one
//! word. The first error stops the run; nothing is returned for earlier lines.

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::catalog::{Catalog, Format, ImmRole, InstrDesc, Slot};
use crate::error::{AsmError, SyntaxProblem};
use crate::fields;
use crate::lexer::{tokenize, Token};
use crate::registers;
use crate::symbols::{split_line, SymbolTable};
use crate::BASE_ADDRESS;

/// One encoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assembled {
    pub line: usize,
    pub address: u32,
    pub word: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub words: Vec<Assembled>,
    pub symbols: SymbolTable,
}

impl Program {
    pub fn machine_code(&self) -> Vec<u32> {
        self.words.iter().map(|a| a.word).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Assembler {
    catalog: Catalog,
}

impl Assembler {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn assemble(&self, source: &str) -> Result<Program, AsmError> {
        let symbols = SymbolTable::scan(source)?;
        let mut session = Session { catalog: &self.catalog, symbols: &symbols, pc: BASE_ADDRESS };
        let mut words = Vec::new();
        for (idx, raw) in source.lines().enumerate() {
            if let Some(a) = session.encode_line(idx + 1, raw)? {
                words.push(a);
            }
        }
        debug!(words = words.len(), labels = symbols.len(), "pass 2 done");
        Ok(Program { words, symbols })
    }
}

/// Operands pulled out of an instruction's token stream.
#[derive(Debug, Default, PartialEq, Eq)]
struct Operands {
    /// Register numbers in order of appearance.
    registers: Vec<u8>,
    /// Immediate, shift amount, memory offset or raw target.
    literal: Option<i64>,
    /// Label reference in a branch or jump target position.
    label: Option<String>,
}

/// One comma-separated operand.
#[derive(Debug, PartialEq, Eq)]
enum Operand<'t> {
    Register(&'t str),
    Int(i64),
    Ident(&'t str),
    /// `offset($base)`; the offset may be left out.
    Memory { offset: Option<i64>, base: &'t str },
}

fn operand(tokens: &[Token]) -> Option<Operand<'_>> {
    Some(match tokens {
        [Token::Register(r)] => Operand::Register(r),
        [Token::Int(v)] => Operand::Int(*v),
        [Token::Ident(name)] => Operand::Ident(name),
        [Token::Int(v), Token::LParen, Token::Register(r), Token::RParen] => {
            Operand::Memory { offset: Some(*v), base: r }
        }
        [Token::LParen, Token::Register(r), Token::RParen] => Operand::Memory { offset: None, base: r },
        _ => return None,
    })
}

/// What an operand position holds for a given instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Register,
    /// Shift amount, immediate, or branch/jump target.
    Value,
    Memory,
}

fn expect(desc: &InstrDesc, position: usize) -> Expect {
    match desc.role {
        ImmRole::MemoryOffset if position == 0 => Expect::Register,
        ImmRole::MemoryOffset => Expect::Memory,
        _ if position < desc.operands.len() => Expect::Register,
        _ => Expect::Value,
    }
}

/// Parses the operand list of `desc` position by position. The comma count
/// has already been checked, so there is one group per expected position.
fn parse_operands(line: usize, raw: &str, desc: &InstrDesc, rest: &str, tokens: &[Token]) -> Result<Operands, AsmError> {
    let syntax = |problem: SyntaxProblem| AsmError::Syntax { line, text: raw.to_string(), problem };
    let register = |name: &str| {
        registers::index_of(name).ok_or_else(|| AsmError::UnknownRegister { line, name: name.to_string() })
    };

    let mut ops = Operands::default();
    if tokens.is_empty() {
        return Ok(ops);
    }
    let groups = tokens.split(|t| *t == Token::Comma).zip(rest.split(','));
    for (idx, (group, text)) in groups.enumerate() {
        let position = idx + 1;
        let Some(op) = operand(group) else {
            return Err(syntax(if group.is_empty() {
                SyntaxProblem::EmptyOperand { position }
            } else {
                SyntaxProblem::BadOperand(text.trim().to_string())
            }));
        };
        let misplaced = |expected: &'static str| syntax(SyntaxProblem::Misplaced { position, expected });
        match (expect(desc, idx), op) {
            // a register where a value belongs is caught by the immediate and count checks
            (Expect::Register | Expect::Value, Operand::Register(name)) => ops.registers.push(register(name)?),
            (Expect::Register, _) => return Err(misplaced("a register")),
            (Expect::Value, Operand::Int(v)) => ops.literal = Some(v),
            (Expect::Value, Operand::Ident(name)) if desc.takes_target() => ops.label = Some(name.to_string()),
            (Expect::Value, _) if desc.takes_target() => return Err(misplaced("a label or integer")),
            (Expect::Value, _) => return Err(misplaced("an integer")),
            (Expect::Memory, Operand::Memory { offset, base }) => {
                ops.registers.push(register(base)?);
                ops.literal = offset;
            }
            (Expect::Memory, _) => return Err(misplaced("offset($reg)")),
        }
    }
    Ok(ops)
}

/// Pass 2 state, scoped to one run.
struct Session<'a> {
    catalog: &'a Catalog,
    symbols: &'a SymbolTable,
    pc: u32,
}

impl Session<'_> {
    fn encode_line(&mut self, line: usize, raw: &str) -> Result<Option<Assembled>, AsmError> {
        let code = split_line(raw).code;
        if code.is_empty() {
            return Ok(None);
        }
        let syntax = |problem: SyntaxProblem| AsmError::Syntax { line, text: raw.to_string(), problem };

        let (mnemonic, rest) = code.split_once(char::is_whitespace).unwrap_or((code, ""));
        let desc = self
            .catalog
            .by_mnemonic(mnemonic)
            .ok_or_else(|| AsmError::UnknownMnemonic { line, mnemonic: mnemonic.to_string() })?;

        let tokens = tokenize(rest).map_err(syntax)?;
        let commas = tokens.iter().filter(|t| **t == Token::Comma).count();
        if commas != desc.comma_count {
            return Err(syntax(SyntaxProblem::CommaCount { expected: desc.comma_count, found: commas }));
        }
        let parens = tokens.contains(&Token::LParen) && tokens.contains(&Token::RParen);
        if parens != desc.parens {
            let problem = if desc.parens { SyntaxProblem::MissingParens } else { SyntaxProblem::UnexpectedParens };
            return Err(syntax(problem));
        }

        let ops = parse_operands(line, raw, desc, rest, &tokens)?;
        let imm = self.immediate(line, desc, &ops)?;
        if desc.format != Format::R && imm.is_none() {
            return Err(AsmError::MissingImmediate { line });
        }
        if ops.registers.len() != desc.operands.len() {
            return Err(AsmError::OperandCount {
                line,
                mnemonic: desc.mnemonic,
                expected: desc.operands.len(),
                found: ops.registers.len(),
            });
        }

        let word = encode(desc, &ops.registers, imm.unwrap_or(0), line);
        trace!(line, pc = format_args!("{:#010x}", self.pc), word = format_args!("{word:#010x}"), "{code}");
        let out = Assembled { line, address: self.pc, word };
        self.pc = self.pc.wrapping_add(4);
        Ok(Some(out))
    }

    /// Resolves the value for the immediate/target field, if any.
    fn immediate(&self, line: usize, desc: &InstrDesc, ops: &Operands) -> Result<Option<i64>, AsmError> {
        if !desc.takes_target() {
            return Ok(ops.literal);
        }
        let Some(name) = ops.label.as_deref() else {
            // Raw byte offset or address. With no literal either, the caller reports
            // MissingImmediate: there is no label name to call undefined.
            return Ok(ops.literal.map(|bytes| bytes / 4));
        };
        let label = self
            .symbols
            .get(name)
            .ok_or_else(|| AsmError::UndefinedLabel { line, name: name.to_string() })?;

        let mut value = match desc.format {
            Format::J => (label.address / 4) as i64,
            _ => {
                let words = (label.address as i64 - self.pc as i64) / 4;
                if words != 0 {
                    words - 1
                } else {
                    words
                }
            }
        };
        if label.trailing {
            value += 1;
        }
        Ok(Some(value))
    }
}

/// Packs registers and the immediate into a word for `desc`'s format.
/// Registers missing from the operand list are encoded as zero.
fn encode(desc: &InstrDesc, regs: &[u8], imm: i64, line: usize) -> u32 {
    let (mut rs, mut rt, mut rd) = (0u8, 0u8, 0u8);
    for (slot, &r) in desc.operands.iter().zip(regs) {
        match slot {
            Slot::Rs => rs = r,
            Slot::Rt => rt = r,
            Slot::Rd => rd = r,
        }
    }
    let width = match desc.format {
        Format::R => fields::SHAMT.len(),
        Format::I => fields::IMMEDIATE.len(),
        Format::J => fields::TARGET.len(),
    };
    if !fields::fits(imm, width) {
        warn!(line, value = imm, bits = width, "{} operand truncated to field width", desc.mnemonic);
    }
    match desc.format {
        Format::R => fields::pack_r(desc.opcode, rs, rt, rd, imm as u32, desc.funct),
        Format::I => fields::pack_i(desc.opcode, rs, rt, imm as u32),
        Format::J => fields::pack_j(desc.opcode, imm as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn one(src: &str) -> u32 {
        let prog = Assembler::default().assemble(src).unwrap();
        assert_eq!(prog.words.len(), 1);
        prog.words[0].word
    }

    fn parsed(src: &str) -> Operands {
        let desc = Catalog::mips().by_mnemonic(src.split_whitespace().next().unwrap()).unwrap();
        let rest = src.split_once(' ').map_or("", |(_, rest)| rest);
        parse_operands(1, src, desc, rest, &tokenize(rest).unwrap()).unwrap()
    }

    #[test]
    fn operands_follow_descriptor_positions() {
        assert_eq!(parsed("lw $t0, 8($sp)"), Operands { registers: vec![8, 29], literal: Some(8), label: None });
        assert_eq!(parsed("beq $t0, $t1, done"), Operands { registers: vec![8, 9], literal: None, label: Some("done".into()) });
        assert_eq!(parsed("sll $t0, $t1, 4"), Operands { registers: vec![8, 9], literal: Some(4), label: None });
        assert_eq!(parsed("j"), Operands::default());
    }

    #[test]
    fn operand_shapes() {
        let toks = tokenize("-4($sp)").unwrap();
        assert_eq!(operand(&toks), Some(Operand::Memory { offset: Some(-4), base: "$sp" }));
        assert_eq!(operand(&tokenize("($sp)").unwrap()), Some(Operand::Memory { offset: None, base: "$sp" }));
        assert_eq!(operand(&tokenize("$ra 4").unwrap()), None);
        assert_eq!(operand(&tokenize("8)$sp(").unwrap()), None);
        assert_eq!(operand(&[]), None);
    }

    #[test]
    fn r_format_fields() {
        assert_eq!(one("add $t0, $s1, $s2"), 0x0232_4020);
        assert_eq!(one("jr $ra"), 0x03E0_0008);
        // sll $t0, $t1, 4: rt=9, rd=8, shamt=4
        assert_eq!(one("sll $t0, $t1, 4"), 0x0009_4100);
    }

    #[test]
    fn i_format_fields() {
        assert_eq!(one("addi $t1, $t0, -4"), 0x2109_FFFC);
        assert_eq!(one("lw $t0, 8($sp)"), 0x8FA8_0008);
        assert_eq!(one("sw $ra, -4($sp)"), 0xAFBF_FFFC);
    }

    #[test]
    fn mnemonic_may_be_followed_by_a_tab() {
        assert_eq!(one("add\t$t0, $s1, $s2"), 0x0232_4020);
    }

    #[test]
    fn literal_branch_offset_is_divided_by_four() {
        // beq $t0, $t1, 8 -> 2 words, no next-instruction adjustment
        assert_eq!(one("beq $t0, $t1, 8") & 0xFFFF, 2);
        assert_eq!(one("j 4194304"), 0x0810_0000);
    }

    #[test]
    fn truncates_oversized_immediates() {
        assert_eq!(one("addi $t0, $t0, 65537") & 0xFFFF, 1);
    }

    #[test]
    fn pc_advances_per_code_line_only() {
        let prog = Assembler::default()
            .assemble("# header\n\nadd $t0, $t0, $t0\nl:\n  sub $t0, $t0, $t0 # x\n")
            .unwrap();
        let addrs: Vec<_> = prog.words.iter().map(|a| (a.line, a.address)).collect();
        assert_eq!(addrs, vec![(3, BASE_ADDRESS), (5, BASE_ADDRESS + 4)]);
    }
}

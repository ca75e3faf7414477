use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelProblem {
    #[error("labels may not be empty")]
    Empty,
    #[error("labels may only contain alphanumeric characters and '_' (found {0:?})")]
    InvalidChar(char),
    #[error("labels may not start with a number")]
    LeadingDigit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxProblem {
    #[error("expected {expected} ',' but found {found}")]
    CommaCount { expected: usize, found: usize },
    #[error("missing '(' or ')'")]
    MissingParens,
    #[error("unexpected '(' or ')'")]
    UnexpectedParens,
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("malformed number {0:?}")]
    BadNumber(String),
    #[error("operand {position} is empty")]
    EmptyOperand { position: usize },
    #[error("malformed operand {0:?}")]
    BadOperand(String),
    #[error("operand {position}: expected {expected}")]
    Misplaced { position: usize, expected: &'static str },
}

/// Assembly failures. `line` is the 1-based source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("label error on line {line}: \"{name}\": {problem}")]
    InvalidLabel { line: usize, name: String, problem: LabelProblem },
    #[error("label \"{name}\" on line {line} was already defined on line {first}")]
    DuplicateLabel { line: usize, name: String, first: usize },
    #[error("line {line}: {mnemonic} is not a valid operation")]
    UnknownMnemonic { line: usize, mnemonic: String },
    #[error("syntax error on line {line}: {text}: {problem}")]
    Syntax { line: usize, text: String, problem: SyntaxProblem },
    #[error("line {line}: {name} is not a valid register name")]
    UnknownRegister { line: usize, name: String },
    #[error("line {line}: label {name} does not exist")]
    UndefinedLabel { line: usize, name: String },
    #[error("line {line}: immediate/offset/label expected, none found")]
    MissingImmediate { line: usize },
    #[error("line {line}: wrong number of registers for {mnemonic}, expected {expected} found {found}")]
    OperandCount { line: usize, mnemonic: &'static str, expected: usize, found: usize },
}

impl AsmError {
    pub fn line(&self) -> usize {
        match self {
            AsmError::InvalidLabel { line, .. }
            | AsmError::DuplicateLabel { line, .. }
            | AsmError::UnknownMnemonic { line, .. }
            | AsmError::Syntax { line, .. }
            | AsmError::UnknownRegister { line, .. }
            | AsmError::UndefinedLabel { line, .. }
            | AsmError::MissingImmediate { line }
            | AsmError::OperandCount { line, .. } => *line,
        }
    }
}

/// Disassembly failures. `index` is the 0-based word position in the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisasmError {
    #[error("word {index}: {word:#010x} is not supported by this disassembler")]
    Unsupported { index: usize, word: u32 },
    #[error("word {index}: {chunk:?} is not a 32-bit binary string")]
    Malformed { index: usize, chunk: String },
}

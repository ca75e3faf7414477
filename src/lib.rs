pub mod asm;
pub mod catalog;
pub mod decoder;
pub mod disasm;
pub mod error;
pub mod fields;
pub mod lexer;
pub mod output;
pub mod registers;
pub mod symbols;

/// Address of the first instruction of every program.
pub const BASE_ADDRESS: u32 = 0x0040_0000;

pub use asm::{Assembled, Assembler, Program};
pub use catalog::{Catalog, Format, ImmRole, InstrDesc, Slot};
pub use decoder::{Decoded, Decoder, MipsDecoder};
pub use disasm::{disassemble, fmt_decoded, Disassembled};
pub use error::{AsmError, DisasmError};
pub use output::OutputMode;
pub use symbols::{Label, SymbolTable};

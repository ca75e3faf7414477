use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{AsmError, LabelProblem};
use crate::BASE_ADDRESS;

/// A source line with its comment removed and its label prefix split off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub label: Option<&'a str>,
    pub code: &'a str,
}

pub fn split_line(raw: &str) -> SourceLine<'_> {
    let text = raw.split_once('#').map_or(raw, |(code, _)| code).trim();
    match text.split_once(':') {
        Some((label, code)) => SourceLine { label: Some(label.trim()), code: code.trim() },
        None => SourceLine { label: None, code: text },
    }
}

pub fn validate_label(name: &str) -> Result<(), LabelProblem> {
    let first = name.chars().next().ok_or(LabelProblem::Empty)?;
    if let Some(bad) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(LabelProblem::InvalidChar(bad));
    }
    if first.is_ascii_digit() {
        return Err(LabelProblem::LeadingDigit);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub name: String,
    pub address: u32,
    /// No code follows the label; `address` is that of the last instruction.
    pub trailing: bool,
    /// Source line of the definition.
    pub line: usize,
}

/// Label name to address mapping, complete before any instruction is encoded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    labels: Vec<Label>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SymbolTable {
    /// First pass: assigns every label the address of the next code line.
    pub fn scan(source: &str) -> Result<Self, AsmError> {
        let mut table = SymbolTable::default();
        let mut pending: Vec<usize> = Vec::new();
        let mut pc = BASE_ADDRESS;

        for (idx, raw) in source.lines().enumerate() {
            let line = idx + 1;
            let src = split_line(raw);
            if let Some(name) = src.label {
                validate_label(name).map_err(|problem| AsmError::InvalidLabel {
                    line,
                    name: name.to_string(),
                    problem,
                })?;
                if let Some(&first) = table.index.get(name) {
                    return Err(AsmError::DuplicateLabel {
                        line,
                        name: name.to_string(),
                        first: table.labels[first].line,
                    });
                }
                table.index.insert(name.to_string(), table.labels.len());
                pending.push(table.labels.len());
                table.labels.push(Label { name: name.to_string(), address: 0, trailing: false, line });
            }
            if src.code.is_empty() {
                continue;
            }
            for i in pending.drain(..) {
                let label = &mut table.labels[i];
                label.address = pc;
                debug!(label = %label.name, address = format_args!("{pc:#010x}"), "label bound");
            }
            pc = pc.wrapping_add(4);
        }

        // Labels with no code after them take the last instruction's address.
        let last = if pc > BASE_ADDRESS { pc - 4 } else { BASE_ADDRESS };
        for i in pending {
            let label = &mut table.labels[i];
            label.address = last;
            label.trailing = true;
            debug!(label = %label.name, address = format_args!("{last:#010x}"), "trailing label");
        }
        debug!(labels = table.labels.len(), end = format_args!("{pc:#010x}"), "pass 1 done");
        Ok(table)
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.index.get(name).map(|&i| &self.labels[i])
    }

    /// Labels in definition order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_line_strips_comments_and_labels() {
        assert_eq!(split_line("  add $t0, $t1, $t2 # sum"), SourceLine { label: None, code: "add $t0, $t1, $t2" });
        assert_eq!(split_line("loop: beq $t0, $t1, end"), SourceLine { label: Some("loop"), code: "beq $t0, $t1, end" });
        assert_eq!(split_line("end:"), SourceLine { label: Some("end"), code: "" });
        assert_eq!(split_line("# note: not a label"), SourceLine { label: None, code: "" });
    }

    #[test]
    fn label_names() {
        assert_eq!(validate_label("loop_1"), Ok(()));
        assert_eq!(validate_label("_x"), Ok(()));
        assert_eq!(validate_label(""), Err(LabelProblem::Empty));
        assert_eq!(validate_label("1loop"), Err(LabelProblem::LeadingDigit));
        assert_eq!(validate_label("my-loop"), Err(LabelProblem::InvalidChar('-')));
        assert_eq!(validate_label("my loop"), Err(LabelProblem::InvalidChar(' ')));
    }

    #[test]
    fn labels_bind_to_next_code_line() {
        let src = "start:\n\n  # comment\n  add $t0, $t0, $t0\nmid: sub $t0, $t0, $t0\n";
        let t = SymbolTable::scan(src).unwrap();
        assert_eq!(t.get("start").unwrap().address, BASE_ADDRESS);
        assert_eq!(t.get("mid").unwrap().address, BASE_ADDRESS + 4);
        assert!(!t.get("mid").unwrap().trailing);
        assert_eq!(t.get("start").unwrap().line, 1);
    }

    #[test]
    fn stacked_labels_share_an_address() {
        let t = SymbolTable::scan("a:\nb:\nadd $t0, $t0, $t0\n").unwrap();
        assert_eq!(t.get("a").unwrap().address, BASE_ADDRESS);
        assert_eq!(t.get("b").unwrap().address, BASE_ADDRESS);
    }

    #[test]
    fn trailing_label_takes_last_instruction_address() {
        let t = SymbolTable::scan("add $t0, $t0, $t0\nadd $t0, $t0, $t0\nexit:\n").unwrap();
        let exit = t.get("exit").unwrap();
        assert_eq!(exit.address, BASE_ADDRESS + 4);
        assert!(exit.trailing);
    }

    #[test]
    fn trailing_label_in_empty_program() {
        let t = SymbolTable::scan("only:\n").unwrap();
        assert_eq!(t.get("only").unwrap().address, BASE_ADDRESS);
        assert!(t.get("only").unwrap().trailing);
    }

    #[test]
    fn duplicate_and_invalid_labels_fail() {
        let err = SymbolTable::scan("x: add $t0, $t0, $t0\nx: add $t0, $t0, $t0\n").unwrap_err();
        assert_eq!(err, AsmError::DuplicateLabel { line: 2, name: "x".into(), first: 1 });
        let err = SymbolTable::scan("\n2x: add $t0, $t0, $t0\n").unwrap_err();
        assert_eq!(err.line(), 2);
        assert!(matches!(err, AsmError::InvalidLabel { problem: LabelProblem::LeadingDigit, .. }));
    }
}

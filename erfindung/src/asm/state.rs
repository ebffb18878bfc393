//! Mutable context threaded through the per-line encoders: the growing
//! program, the label table, unresolved fixups and accumulated warnings.

use std::collections::HashMap;

use crate::asm::line_parse::string_to_register;
use crate::asm::{AsmError, AsmErrorKind};
use crate::isa::{decode_immd_int, encode_immd_int, Inst};

#[cfg(test)]
#[path = "./state_test.rs"]
mod state_test;

pub type Assumption = u8;

pub const NO_ASSUMPTIONS: Assumption = 0;
pub const USING_INT: Assumption = 1;
pub const USING_FP: Assumption = 1 << 1;
pub const SAVE_AND_RESTORE_REGISTERS: Assumption = 1 << 2;

struct LabelEntry {
    program_location: usize,
    source_line: usize,
}

struct Fixup {
    program_location: usize,
    label: String,
}

pub struct TextState {
    assumptions: Assumption,
    current_source_line: usize,
    program_data: Vec<Inst>,
    inst_to_source_line: Vec<usize>,
    labels: HashMap<String, LabelEntry>,
    unfulfilled_labels: Vec<Fixup>,
    warnings: Vec<String>,
}

impl TextState {
    pub fn new() -> Self {
        TextState {
            assumptions: SAVE_AND_RESTORE_REGISTERS,
            current_source_line: 1,
            program_data: Vec::new(),
            inst_to_source_line: Vec::new(),
            labels: HashMap::new(),
            unfulfilled_labels: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn assumptions(&self) -> Assumption {
        self.assumptions
    }

    pub fn include_assumption(&mut self, assume: Assumption) {
        match assume {
            NO_ASSUMPTIONS => self.assumptions &= !(USING_INT | USING_FP),
            USING_INT | USING_FP =>
                self.assumptions = (self.assumptions & !(USING_INT | USING_FP)) | assume,
            SAVE_AND_RESTORE_REGISTERS => self.assumptions |= assume,
            _ => unreachable!("invalid assumption to include"),
        }
    }

    pub fn exclude_assumption(&mut self, assume: Assumption) {
        match assume {
            NO_ASSUMPTIONS => (),
            USING_INT | USING_FP => self.assumptions &= !(USING_INT | USING_FP),
            SAVE_AND_RESTORE_REGISTERS => self.assumptions &= !SAVE_AND_RESTORE_REGISTERS,
            _ => unreachable!("invalid assumption to exclude"),
        }
    }

    /// runs `func` with a temporary numeric assumption, restoring the old
    /// assumption set on every exit path
    pub fn with_assumption<F>(&mut self, assume: Assumption, func: F) -> Result<usize, AsmError>
        where F: FnOnce(&mut TextState) -> Result<usize, AsmError>
    {
        let old = self.assumptions;
        self.include_assumption(assume);
        let rv = func(self);
        self.assumptions = old;
        rv
    }

    /// appends an instruction; a label argument registers a fixup, and the
    /// instruction must leave its low 16 bits clear for the resolve pass
    pub fn add_instruction(&mut self, inst: Inst, label: Option<&str>) {
        self.inst_to_source_line.push(self.current_source_line);
        if let Some(label) = label {
            debug_assert!(inst.bits() & 0xFFFF == 0);
            self.unfulfilled_labels.push(Fixup {
                program_location: self.program_data.len(),
                label: label.to_string(),
            });
        }
        self.program_data.push(inst);
    }

    pub fn program_size(&self) -> usize {
        self.program_data.len()
    }

    pub fn program_data(&self) -> &[Inst] {
        &self.program_data
    }

    pub fn current_source_line(&self) -> usize {
        self.current_source_line
    }

    pub fn make_error<S: Into<String>>(&self, kind: AsmErrorKind, message: S) -> AsmError {
        AsmError {
            line: self.current_source_line,
            kind,
            message: message.into(),
        }
    }

    /// maps an isa encoding failure onto an assembler error at the current line
    pub fn encode_error(&self, err: crate::isa::EncodeError) -> AsmError {
        use crate::isa::EncodeError as E;
        let kind = match err {
            E::IllegalParamForm(..) => AsmErrorKind::BadParameterForm,
            E::ImmdOverflow(_) | E::AddrOverflow(_) | E::FpOverflow(_) | E::FpUnderflow(_) =>
                AsmErrorKind::Overflow,
        };
        self.make_error(kind, format!(": {}", err))
    }

    pub fn push_warning(&mut self, message: &str) {
        self.warnings.push(format!("warning on line {}{}",
                                   self.current_source_line, message));
    }

    /// steps the cursor over newline tokens, keeping the line count in sync
    pub fn handle_newlines(&mut self, tokens: &[String], pos: &mut usize) {
        while *pos < tokens.len() && tokens[*pos] == "\n" {
            *pos += 1;
            self.current_source_line += 1;
        }
    }

    /// binds a `:name` directive to the current program location
    pub fn process_label(&mut self, tokens: &[String], pos: usize) -> Result<usize, AsmError> {
        debug_assert!(tokens[pos] == ":");
        let mut pos = pos + 1;
        self.handle_newlines(tokens, &mut pos);
        if pos == tokens.len() {
            return Err(self.make_error(
                AsmErrorKind::BadParameterForm,
                ": code ends before a label was given for the label directive"));
        }
        let name = &tokens[pos];
        if string_to_register(name).is_some() {
            return Err(self.make_error(
                AsmErrorKind::BadParameterForm,
                ": a register cannot be used as a label"));
        }
        if let Some(previous) = self.labels.get(name) {
            return Err(self.make_error(
                AsmErrorKind::DuplicateLabel,
                format!(": duplicate label, previously defined on line {}",
                        previous.source_line)));
        }
        self.labels.insert(name.clone(), LabelEntry {
            program_location: self.program_data.len(),
            source_line: self.current_source_line,
        });
        Ok(pos + 1)
    }

    /// second pass: patch the program address of every named label into the
    /// low 16 bits of its placeholder instruction
    pub fn resolve_labels(&mut self) -> Result<(), AsmError> {
        for fixup in &self.unfulfilled_labels {
            let use_line = self.inst_to_source_line[fixup.program_location];
            let entry = self.labels.get(&fixup.label).ok_or_else(|| AsmError {
                line: use_line,
                kind: AsmErrorKind::UndefinedLabel,
                message: format!(": label \"{}\" not found anywhere in the source code",
                                 fixup.label),
            })?;
            if entry.program_location > 0x7FFF {
                return Err(AsmError {
                    line: use_line,
                    kind: AsmErrorKind::LabelOutOfRange,
                    message: format!(": label \"{}\" resolves to a location too large \
                                      for an immediate", fixup.label),
                });
            }
            let inst = self.program_data[fixup.program_location];
            debug_assert!(inst.bits() & 0xFFFF == 0);
            // positive and below 0x8000, so the sign-magnitude bits are the
            // address itself
            let immd = match encode_immd_int(entry.program_location as i64) {
                Ok(bits) => bits,
                Err(_) => unreachable!("checked against the immediate range above"),
            };
            let patched = inst.with(immd);
            debug_assert!(decode_immd_int(patched) == entry.program_location as i32);
            self.program_data[fixup.program_location] = patched;
        }
        self.unfulfilled_labels.clear();
        Ok(())
    }

    pub fn into_parts(self) -> (Vec<Inst>, Vec<usize>, Vec<String>) {
        (self.program_data, self.inst_to_source_line, self.warnings)
    }
}

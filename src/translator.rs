use std::io::Write;

use tracing::{debug, info, warn};

use crate::ast::{ArithmeticCommand, Command, Direction, Segment};
use crate::config::TranslatorConfig;
use crate::error::TranslateError;

macro_rules! svec {
    ($($x:expr),*) => (vec![$($x.to_string()),*]);
}

/// Base address of the `temp` segment (R5..R12).
const TEMP_BASE: &str = "5";
/// Scratch register holding a pop destination while SP is being worked on.
const SCRATCH: &str = "@R13";
/// Largest literal an A-instruction can load.
const MAX_LITERAL: i32 = 0x7fff;

fn at_c(arg: i32) -> String {
    format!("@{arg}", arg = arg)
}

fn at_s(arg: &str) -> String {
    format!("@{arg}", arg = arg)
}

fn pointer_arg(arg: i32) -> Result<&'static str, TranslateError> {
    match arg {
        0 => Ok("THIS"),
        1 => Ok("THAT"),
        _ => Err(TranslateError::InvalidPointerIndex(arg)),
    }
}

fn inc_sp() -> Vec<String> {
    svec!["@SP", "M=M+1"]
}

fn dec_sp() -> Vec<String> {
    svec!["@SP", "M=M-1"]
}

/// SP--, top of stack into D
fn pop_d() -> Vec<String> {
    let mut code = dec_sp();
    code.extend(svec!["A=M", "D=M"]);
    code
}

/// Write D to the top of stack and SP++
fn push_d() -> Vec<String> {
    let mut code = svec!["@SP", "A=M", "M=D"];
    code.extend(inc_sp());
    code
}

fn simple_un_op(op: char) -> Vec<String> {
    svec!["@SP", "A=M-1", format!("M={}M", op)]
}

// i.e. no conditions or jumps, just pop and run
fn simple_bin_op(op: char) -> Vec<String> {
    let mut code = pop_d(); // Right arg in D
    code.extend(svec![
        "@SP",
        "A=M-1",              // Looking at second arg of stack, will overwrite
        format!("M=M{}D", op) // Op and overwrite second element
    ]);
    code
}

fn compare(jump: &str, sym: &str) -> Vec<String> {
    let mut code = pop_d();
    code.extend(svec![
        "@SP",
        "A=M-1",
        "D=M-D",
        "M=-1", // Assume true
        at_s(sym),
        format!("D;J{}", jump),
        "@SP",
        "A=M-1",
        "M=0", // Comparison failed
        format!("({})", sym)
    ]);
    code
}

/// Push microcode for the four based segments plus temp
fn seg_push(seg: &str, arg: i32, indirect: bool) -> Vec<String> {
    let mut code = svec![
        at_c(arg),
        "D=A",
        at_s(seg),
        if indirect { "A=M+D" } else { "A=A+D" }, // A = SEG+arg
        "D=M"                                     // D = value to push
    ];
    code.extend(push_d());
    code
}

fn seg_push_direct(label: &str) -> Vec<String> {
    let mut code = svec![at_s(label), "D=M"];
    code.extend(push_d());
    code
}

fn constant_push(arg: i32) -> Vec<String> {
    // A-instructions only load non-negative literals
    let mut code = if arg >= 0 {
        svec![at_c(arg), "D=A"]
    } else {
        svec![at_c(-arg), "D=-A"]
    };
    code.extend(push_d());
    code
}

/// Pops into the address currently held in D, going through R13.
fn pop_to_d_addr() -> Vec<String> {
    let mut code = svec![SCRATCH, "M=D"]; // Store target addr in R13
    code.extend(pop_d());
    code.extend(svec![SCRATCH, "A=M", "M=D"]);
    code
}

fn seg_pop(seg: &str, arg: i32, indirect: bool) -> Vec<String> {
    let mut code = svec![
        at_c(arg),
        "D=A",
        at_s(seg),
        if indirect { "D=M+D" } else { "D=A+D" }
    ];
    code.extend(pop_to_d_addr());
    code
}

fn pointer_pop(base: &str) -> Vec<String> {
    let mut code = svec![at_s(base), "D=A"];
    code.extend(pop_to_d_addr());
    code
}

fn seg_pop_direct(label: &str) -> Vec<String> {
    let mut code = pop_d();
    code.extend(svec![at_s(label), "M=D"]);
    code
}

/// Source of unique comparison labels.
///
/// Uniqueness holds for everything minted from one counter. Hand the counter
/// from one [`Translator`] to the next (see [`Translator::into_labels`]) to
/// keep labels unique across several outputs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabelCounter {
    last: u64,
}

impl LabelCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes after `last`; the next label minted is `last + 1`.
    pub fn starting_after(last: u64) -> Self {
        LabelCounter { last }
    }

    pub fn last(&self) -> u64 {
        self.last
    }

    fn next_gen_sym(&mut self) -> Result<String, TranslateError> {
        self.last = self
            .last
            .checked_add(1)
            .ok_or(TranslateError::LabelOverflow)?;
        Ok(format!("JUMP_{}", self.last))
    }
}

/// Emits Hack assembly for VM commands into a sink it owns until [`close`].
///
/// Every command is rendered completely before anything is written, so a
/// rejected command leaves the output untouched.
///
/// [`close`]: Translator::close
pub struct Translator<W: Write> {
    out: Option<W>,
    assembly: Option<String>,
    labels: LabelCounter,
    config: TranslatorConfig,
}

impl<W: Write> Translator<W> {
    pub fn new(out: W, config: TranslatorConfig) -> Self {
        Self::with_labels(out, config, LabelCounter::new())
    }

    pub fn with_labels(out: W, config: TranslatorConfig, labels: LabelCounter) -> Self {
        Translator {
            out: Some(out),
            assembly: None,
            labels,
            config,
        }
    }

    /// Sets the unit name that qualifies `static` variables and flow labels.
    pub fn set_source_unit(&mut self, name: impl Into<String>) {
        let name = name.into();
        debug!(unit = %name, "switching source unit");
        self.assembly = Some(name);
    }

    pub fn source_unit(&self) -> Option<&str> {
        self.assembly.as_deref()
    }

    pub fn labels(&self) -> &LabelCounter {
        &self.labels
    }

    pub fn is_closed(&self) -> bool {
        self.out.is_none()
    }

    fn unit(&self) -> Result<&str, TranslateError> {
        self.assembly
            .as_deref()
            .ok_or(TranslateError::MissingSourceUnit)
    }

    fn static_sym(&self, arg: i32) -> Result<String, TranslateError> {
        Ok(format!("{}.{}", self.unit()?, arg))
    }

    /// Convert VM label to Hack ASM symbol - for consistency across instructions
    fn label_to_sym(&self, label: &str) -> Result<String, TranslateError> {
        Ok(format!("{}:LABEL_{}", self.unit()?, label))
    }

    fn arithmetic(&mut self, command: ArithmeticCommand) -> Result<Vec<String>, TranslateError> {
        use ArithmeticCommand::*;

        Ok(match command {
            Add => simple_bin_op('+'),
            Sub => simple_bin_op('-'),
            And => simple_bin_op('&'),
            Or => simple_bin_op('|'),
            Neg => simple_un_op('-'),
            Not => simple_un_op('!'),
            Eq => compare("EQ", &self.labels.next_gen_sym()?),
            Gt => compare("GT", &self.labels.next_gen_sym()?),
            Lt => compare("LT", &self.labels.next_gen_sym()?),
        })
    }

    fn push(&self, segment: Segment, arg: i32) -> Result<Vec<String>, TranslateError> {
        use Segment::*;

        if segment != Constant {
            check_index(segment, arg)?;
        }

        Ok(match segment {
            Constant => {
                if !matches!(arg.checked_abs(), Some(v) if v <= MAX_LITERAL) {
                    return Err(TranslateError::ConstantOutOfRange(arg));
                }
                constant_push(arg)
            }
            Local => seg_push("LCL", arg, true),
            Argument => seg_push("ARG", arg, true),
            This => seg_push("THIS", arg, true),
            That => seg_push("THAT", arg, true),
            Temp => seg_push(TEMP_BASE, arg, false),
            Pointer => seg_push_direct(pointer_arg(arg)?),
            Static => seg_push_direct(&self.static_sym(arg)?),
        })
    }

    fn pop(&self, segment: Segment, arg: i32) -> Result<Vec<String>, TranslateError> {
        use Segment::*;

        if segment != Constant {
            check_index(segment, arg)?;
        }

        Ok(match segment {
            Constant => {
                return Err(TranslateError::UnsupportedAccess {
                    direction: Direction::Pop,
                    segment,
                })
            }
            Local => seg_pop("LCL", arg, true),
            Argument => seg_pop("ARG", arg, true),
            This => seg_pop("THIS", arg, true),
            That => seg_pop("THAT", arg, true),
            Temp => seg_pop(TEMP_BASE, arg, false),
            Pointer => pointer_pop(pointer_arg(arg)?),
            Static => seg_pop_direct(&self.static_sym(arg)?),
        })
    }

    fn label(&self, label: &str) -> Result<Vec<String>, TranslateError> {
        Ok(svec![format!("({})", self.label_to_sym(label)?)])
    }

    fn goto(&self, label: &str) -> Result<Vec<String>, TranslateError> {
        Ok(svec![
            at_s(&self.label_to_sym(label)?),
            "0;JMP" // Unconditional jump
        ])
    }

    fn if_goto(&self, label: &str) -> Result<Vec<String>, TranslateError> {
        Ok(svec![
            "@SP",
            "AM=M-1",
            "D=M", // Stack popped into D
            at_s(&self.label_to_sym(label)?),
            "D;JNE" // False is 0
        ])
    }

    fn emit(&mut self, command: &Command, code: Vec<String>) -> Result<(), TranslateError> {
        let out = self.out.as_mut().ok_or(TranslateError::Closed)?;

        let mut text = String::new();
        if self.config.annotate {
            text.push_str(&format!("// {}\n", command));
        }
        for line in code {
            text.push_str(&line);
            text.push('\n');
        }
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Translates a single command and appends it to the output.
    pub fn write_command(&mut self, command: &Command) -> Result<(), TranslateError> {
        if self.out.is_none() {
            return Err(TranslateError::Closed);
        }
        debug!(%command, "translating");

        let code = match command {
            Command::Arithmetic(op) => self.arithmetic(*op)?,
            Command::Push(seg, arg) => self.push(*seg, *arg)?,
            Command::Pop(seg, arg) => self.pop(*seg, *arg)?,
            Command::Label(sym) => self.label(sym)?,
            Command::Goto(sym) => self.goto(sym)?,
            Command::IfGoto(sym) => self.if_goto(sym)?,
        };
        self.emit(command, code)
    }

    pub fn write_arithmetic(&mut self, command: ArithmeticCommand) -> Result<(), TranslateError> {
        self.write_command(&Command::Arithmetic(command))
    }

    pub fn write_push_pop(
        &mut self,
        direction: Direction,
        segment: Segment,
        index: i32,
    ) -> Result<(), TranslateError> {
        let command = match direction {
            Direction::Push => Command::Push(segment, index),
            Direction::Pop => Command::Pop(segment, index),
        };
        self.write_command(&command)
    }

    pub fn write_label(&mut self, label: &str) -> Result<(), TranslateError> {
        self.write_command(&Command::Label(label.to_string()))
    }

    pub fn write_goto(&mut self, label: &str) -> Result<(), TranslateError> {
        self.write_command(&Command::Goto(label.to_string()))
    }

    pub fn write_if_goto(&mut self, label: &str) -> Result<(), TranslateError> {
        self.write_command(&Command::IfGoto(label.to_string()))
    }

    pub fn translate(&mut self, commands: &[Command]) -> Result<(), TranslateError> {
        for command in commands {
            self.write_command(command)?;
        }
        Ok(())
    }

    /// Flushes and releases the sink. Calling it again is a no-op.
    pub fn close(&mut self) -> Result<(), TranslateError> {
        if let Some(mut out) = self.out.take() {
            out.flush()?;
            info!(labels = self.labels.last(), "closed output");
        }
        Ok(())
    }

    /// Closes the session and hands back the label counter.
    pub fn into_labels(mut self) -> Result<LabelCounter, TranslateError> {
        self.close()?;
        Ok(std::mem::take(&mut self.labels))
    }
}

impl<W: Write> Drop for Translator<W> {
    fn drop(&mut self) {
        if let Some(mut out) = self.out.take() {
            warn!("translator dropped without close; flushing");
            if let Err(err) = out.flush() {
                warn!(%err, "flush on drop failed");
            }
        }
    }
}

fn check_index(segment: Segment, arg: i32) -> Result<(), TranslateError> {
    if arg < 0 {
        Err(TranslateError::NegativeIndex {
            segment,
            index: arg,
        })
    } else {
        Ok(())
    }
}

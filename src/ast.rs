use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Segment {
    Constant,
    Local,
    Static,
    Argument,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn name(&self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    Push,
    Pop,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Push => "push",
            Direction::Pop => "pop",
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArithmeticCommand {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticCommand {
    pub const ALL: [ArithmeticCommand; 9] = [
        ArithmeticCommand::Add,
        ArithmeticCommand::Sub,
        ArithmeticCommand::Neg,
        ArithmeticCommand::Eq,
        ArithmeticCommand::Gt,
        ArithmeticCommand::Lt,
        ArithmeticCommand::And,
        ArithmeticCommand::Or,
        ArithmeticCommand::Not,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticCommand::Add => "add",
            ArithmeticCommand::Sub => "sub",
            ArithmeticCommand::Neg => "neg",
            ArithmeticCommand::Eq => "eq",
            ArithmeticCommand::Gt => "gt",
            ArithmeticCommand::Lt => "lt",
            ArithmeticCommand::And => "and",
            ArithmeticCommand::Or => "or",
            ArithmeticCommand::Not => "not",
        }
    }
}

impl fmt::Display for ArithmeticCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    // Stack Basics
    Arithmetic(ArithmeticCommand),
    Push(Segment, i32),
    Pop(Segment, i32),

    // Control
    Label(String),
    Goto(String),
    IfGoto(String),
}

/// Renders the command back in VM syntax, e.g. `push constant 7`.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => write!(f, "{}", op),
            Command::Push(seg, arg) => write!(f, "push {} {}", seg, arg),
            Command::Pop(seg, arg) => write!(f, "pop {} {}", seg, arg),
            Command::Label(sym) => write!(f, "label {}", sym),
            Command::Goto(sym) => write!(f, "goto {}", sym),
            Command::IfGoto(sym) => write!(f, "if-goto {}", sym),
        }
    }
}

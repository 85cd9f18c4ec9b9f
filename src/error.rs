use std::path::PathBuf;

use thiserror::Error;

use crate::ast::{Direction, Segment};

/// Failures raised while emitting assembly for a command.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("failed to write assembly: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot {direction} the {segment} segment")]
    UnsupportedAccess { direction: Direction, segment: Segment },

    #[error("pointer index must be 0 or 1, got {0}")]
    InvalidPointerIndex(i32),

    #[error("negative index {index} is not addressable in the {segment} segment")]
    NegativeIndex { segment: Segment, index: i32 },

    #[error("constant {0} does not fit in an A-instruction")]
    ConstantOutOfRange(i32),

    #[error("static access before a source unit was set")]
    MissingSourceUnit,

    #[error("comparison label counter exhausted")]
    LabelOverflow,

    #[error("output session is already closed")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidCommand,
    TrailingInput,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ParseErrorKind::InvalidCommand => "invalid command",
            ParseErrorKind::TrailingInput => "unexpected trailing input in",
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {kind} `{text}`")]
pub struct ParseError {
    pub line: usize,
    pub text: String,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot list {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("{} is not a .vm source file", .0.display())]
    NotVmSource(PathBuf),

    #[error("output {} would overwrite one of its sources", .0.display())]
    OutputIsSource(PathBuf),

    #[error("no .vm files found in {}", .0.display())]
    NoSourceFiles(PathBuf),

    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("{}: {source}", .path.display())]
    Translate {
        path: PathBuf,
        #[source]
        source: TranslateError,
    },
}

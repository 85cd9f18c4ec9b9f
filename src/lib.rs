//! Translates stack-VM programs into Hack assembly.
//!
//! [`parser::parse`] turns `.vm` text into [`ast::Command`]s, a
//! [`translator::Translator`] renders them into a sink, and [`driver`] wires
//! both to files and directories.

pub mod ast;
pub mod config;
pub mod driver;
pub mod error;
pub mod parser;
pub mod translator;

pub use ast::{ArithmeticCommand, Command, Direction, Segment};
pub use config::TranslatorConfig;
pub use error::{DriverError, ParseError, ParseErrorKind, TranslateError};
pub use translator::{LabelCounter, Translator};

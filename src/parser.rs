use nom::{
    branch::alt,
    bytes::complete::{is_a, tag},
    character::{
        complete::{char, digit1, space1},
        is_digit,
    },
    combinator::{map, map_res, opt, recognize, value, verify},
    sequence::{pair, tuple},
    IResult,
};

use crate::ast::{ArithmeticCommand, Command::*, Segment::*, *};
use crate::error::{ParseError, ParseErrorKind};

fn integer(input: &str) -> IResult<&str, i32> {
    map_res(recognize(pair(opt(char('-')), digit1)), |c: &str| c.parse())(input)
}

#[test]
fn test_integer() {
    assert_eq!(integer("17"), Ok(("", 17)));
    assert_eq!(integer("-5"), Ok(("", -5)));
    assert!(integer("- 5").is_err());
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((
        value(Constant, tag("constant")),
        value(Local, tag("local")),
        value(Static, tag("static")),
        value(Argument, tag("argument")),
        value(This, tag("this")),
        value(That, tag("that")),
        value(Pointer, tag("pointer")),
        value(Temp, tag("temp")),
    ))(input)
}

fn push(input: &str) -> IResult<&str, Command> {
    map(
        tuple((tag("push"), space1, segment, space1, integer)),
        |(_, _, segment, _, arg)| Push(segment, arg),
    )(input)
}

#[test]
fn test_push() {
    assert_eq!(push("push  pointer  32"), Ok(("", Push(Pointer, 32))));
    assert_eq!(push("push constant -5"), Ok(("", Push(Constant, -5))));
}

fn pop(input: &str) -> IResult<&str, Command> {
    verify(
        map(
            tuple((tag("pop"), space1, segment, space1, integer)),
            |(_, _, segment, _, arg)| Pop(segment, arg),
        ),
        |p| !matches!(p, Pop(Constant, _)),
    )(input)
}

#[test]
fn test_pop() {
    assert_eq!(pop("pop static\t3"), Ok(("", Pop(Static, 3))));
    assert!(pop("pop constant 3").is_err());
}

fn prim(input: &str) -> IResult<&str, Command> {
    map(
        alt((
            value(ArithmeticCommand::Add, tag("add")),
            value(ArithmeticCommand::Sub, tag("sub")),
            value(ArithmeticCommand::Neg, tag("neg")),
            value(ArithmeticCommand::Eq, tag("eq")),
            value(ArithmeticCommand::Gt, tag("gt")),
            value(ArithmeticCommand::Lt, tag("lt")),
            value(ArithmeticCommand::And, tag("and")),
            value(ArithmeticCommand::Or, tag("or")),
            value(ArithmeticCommand::Not, tag("not")),
        )),
        Arithmetic,
    )(input)
}

#[test]
fn test_prim() {
    assert_eq!(prim("neg"), Ok(("", Arithmetic(ArithmeticCommand::Neg))));
}

fn symbol(input: &str) -> IResult<&str, String> {
    map(
        verify(
            is_a("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_.$:0123456789"),
            |c: &str| !is_digit(c.as_bytes()[0]),
        ),
        |sym: &str| sym.to_string(),
    )(input)
}

fn branching(input: &str) -> IResult<&str, Command> {
    alt((
        map(tuple((tag("label"), space1, symbol)), |(_, _, sym)| Label(sym)),
        map(tuple((tag("goto"), space1, symbol)), |(_, _, sym)| Goto(sym)),
        map(tuple((tag("if-goto"), space1, symbol)), |(_, _, sym)| IfGoto(sym)),
    ))(input)
}

#[test]
fn test_branching() {
    assert_eq!(branching("if-goto LOOP_START"), Ok(("", IfGoto("LOOP_START".into()))));
    assert!(branching("goto 1ABC").is_err());
}

/// Parses a whole `.vm` source. Comments (`//`) and blank lines are skipped;
/// line numbers in errors are 1-based.
pub fn parse(input: &str) -> Result<Vec<Command>, ParseError> {
    let mut commands = vec![];

    for (number, line) in input.lines().enumerate() {
        let line = line.split_once("//").map(|(s, _)| s).unwrap_or(line).trim();
        if line.is_empty() {
            continue;
        }

        let error = |kind| ParseError {
            line: number + 1,
            text: line.to_string(),
            kind,
        };

        match alt((push, pop, prim, branching))(line) {
            Ok(("", command)) => commands.push(command),
            Ok(_) => return Err(error(ParseErrorKind::TrailingInput)),
            Err(_) => return Err(error(ParseErrorKind::InvalidCommand)),
        }
    }

    Ok(commands)
}

#[test]
fn test_parse_program() {
    let source = "// header\n\npush constant 7 // seven\n  push constant 8\nadd\n";
    assert_eq!(
        parse(source),
        Ok(vec![
            Push(Constant, 7),
            Push(Constant, 8),
            Arithmetic(ArithmeticCommand::Add),
        ])
    );
}

#[test]
fn test_parse_errors_carry_line() {
    let err = parse("push constant 1\nfrobnicate\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.kind, ParseErrorKind::InvalidCommand);

    let err = parse("add 3").unwrap_err();
    assert_eq!(err.line, 1);
    assert_eq!(err.kind, ParseErrorKind::TrailingInput);
}

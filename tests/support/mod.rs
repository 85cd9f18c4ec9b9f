#![allow(dead_code)]

pub mod hack;

use vm_translator::{parser, Translator, TranslatorConfig};

pub const STACK_BASE: i16 = 256;
pub const LCL_BASE: i16 = 300;
pub const ARG_BASE: i16 = 400;
pub const THIS_BASE: i16 = 3000;
pub const THAT_BASE: i16 = 3010;

/// Translates VM source into assembly text for unit `Test`.
pub fn translate(source: &str) -> String {
    let program = parser::parse(source).unwrap();
    let mut out = Vec::new();
    let mut translator = Translator::new(&mut out, TranslatorConfig::default());
    translator.set_source_unit("Test");
    translator.translate(&program).unwrap();
    translator.close().unwrap();
    drop(translator);
    String::from_utf8(out).unwrap()
}

/// Translates and runs VM source on a machine with the usual segment bases.
pub fn run(source: &str) -> hack::Machine {
    let mut machine = hack::Machine::new(&translate(source));
    machine.ram[0] = STACK_BASE;
    machine.ram[1] = LCL_BASE;
    machine.ram[2] = ARG_BASE;
    machine.ram[3] = THIS_BASE;
    machine.ram[4] = THAT_BASE;
    machine.run(10_000);
    machine
}

//! Just enough of a Hack assembler and CPU to execute translator output.

use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Instr {
    A(i16),
    C {
        dest: String,
        comp: String,
        jump: String,
    },
}

fn predefined() -> HashMap<String, i16> {
    let mut symbols: HashMap<String, i16> = [
        ("SP", 0),
        ("LCL", 1),
        ("ARG", 2),
        ("THIS", 3),
        ("THAT", 4),
        ("SCREEN", 16384),
        ("KBD", 24576),
    ]
    .into_iter()
    .map(|(name, addr)| (name.to_string(), addr))
    .collect();
    for r in 0..16 {
        symbols.insert(format!("R{r}"), r);
    }
    symbols
}

fn clean(line: &str) -> &str {
    line.split_once("//").map(|(s, _)| s).unwrap_or(line).trim()
}

fn assemble(source: &str) -> Vec<Instr> {
    let mut symbols = predefined();

    let mut pc = 0;
    for line in source.lines().map(clean).filter(|l| !l.is_empty()) {
        if let Some(label) = line.strip_prefix('(').and_then(|l| l.strip_suffix(')')) {
            assert!(
                symbols.insert(label.to_string(), pc).is_none(),
                "label defined twice: {label}"
            );
        } else {
            pc += 1;
        }
    }

    let mut next_var = 16;
    let mut rom = vec![];
    for line in source.lines().map(clean).filter(|l| !l.is_empty()) {
        if line.starts_with('(') {
            continue;
        }
        if let Some(value) = line.strip_prefix('@') {
            let addr = match value.parse::<i16>() {
                Ok(n) => {
                    assert!(n >= 0, "negative A-instruction literal: {line}");
                    n
                }
                Err(_) => *symbols.entry(value.to_string()).or_insert_with(|| {
                    next_var += 1;
                    next_var - 1
                }),
            };
            rom.push(Instr::A(addr));
            continue;
        }
        let (dest, rest) = line.split_once('=').unwrap_or(("", line));
        let (comp, jump) = rest.split_once(';').unwrap_or((rest, ""));
        rom.push(Instr::C {
            dest: dest.to_string(),
            comp: comp.to_string(),
            jump: jump.to_string(),
        });
    }
    rom
}

pub struct Machine {
    pub ram: Vec<i16>,
    pub a: i16,
    pub d: i16,
    rom: Vec<Instr>,
    pc: usize,
}

impl Machine {
    pub fn new(source: &str) -> Self {
        Machine {
            ram: vec![0; 32768],
            a: 0,
            d: 0,
            rom: assemble(source),
            pc: 0,
        }
    }

    fn operand(&self, c: u8) -> i16 {
        match c {
            b'A' => self.a,
            b'D' => self.d,
            b'M' => self.ram[self.a as u16 as usize],
            b'0' => 0,
            b'1' => 1,
            _ => panic!("bad operand {}", c as char),
        }
    }

    fn comp(&self, comp: &str) -> i16 {
        let b = comp.as_bytes();
        match b {
            [x] => self.operand(*x),
            [b'-', x] => self.operand(*x).wrapping_neg(),
            [b'!', x] => !self.operand(*x),
            [x, op, y] => {
                let (x, y) = (self.operand(*x), self.operand(*y));
                match op {
                    b'+' => x.wrapping_add(y),
                    b'-' => x.wrapping_sub(y),
                    b'&' => x & y,
                    b'|' => x | y,
                    _ => panic!("bad comp {comp}"),
                }
            }
            _ => panic!("bad comp {comp}"),
        }
    }

    /// Runs until execution falls off the end of the program.
    pub fn run(&mut self, max_steps: usize) {
        let mut steps = 0;
        while self.pc < self.rom.len() {
            assert!(steps < max_steps, "program did not terminate");
            steps += 1;

            match self.rom[self.pc].clone() {
                Instr::A(value) => {
                    self.a = value;
                    self.pc += 1;
                }
                Instr::C { dest, comp, jump } => {
                    let target = self.a as u16 as usize;
                    let value = self.comp(&comp);
                    if dest.contains('M') {
                        let addr = self.a as u16 as usize;
                        self.ram[addr] = value;
                    }
                    if dest.contains('A') {
                        self.a = value;
                    }
                    if dest.contains('D') {
                        self.d = value;
                    }
                    let taken = match jump.as_str() {
                        "" => false,
                        "JGT" => value > 0,
                        "JEQ" => value == 0,
                        "JGE" => value >= 0,
                        "JLT" => value < 0,
                        "JNE" => value != 0,
                        "JLE" => value <= 0,
                        "JMP" => true,
                        _ => panic!("bad jump {jump}"),
                    };
                    self.pc = if taken { target } else { self.pc + 1 };
                }
            }
        }
    }

    pub fn sp(&self) -> i16 {
        self.ram[0]
    }

    /// Value just below SP.
    pub fn top(&self) -> i16 {
        self.ram[(self.sp() - 1) as usize]
    }
}

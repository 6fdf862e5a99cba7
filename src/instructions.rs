// gate instructions understood by the register, plus a line-oriented text parser

use serde::{Deserialize, Serialize};

// qubit operands are 1-based and signed so that out-of-range targets
// (including negatives) reach the register and are rejected there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    PauliX(i64),
    PauliY(i64),
    PauliZ(i64),
}

impl Instruction {
    pub fn target(&self) -> i64 {
        match *self {
            Instruction::PauliX(q) | Instruction::PauliY(q) | Instruction::PauliZ(q) => q,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::PauliX(_) => "X",
            Instruction::PauliY(_) => "Y",
            Instruction::PauliZ(_) => "Z",
        }
    }
}

pub fn parse_instruction(line: &str) -> Result<Instruction, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Err("Empty instruction line".into());
    }

    let opcode = tokens[0].to_uppercase();

    let parse_qubit = |s: &str| s.parse::<i64>().map_err(|_| format!("Invalid qubit '{}'", s));

    let build: fn(i64) -> Instruction = match opcode.as_str() {
        "X" | "PAULIX" => Instruction::PauliX,
        "Y" | "PAULIY" => Instruction::PauliY,
        "Z" | "PAULIZ" => Instruction::PauliZ,
        other => return Err(format!("Unknown opcode '{}'", other)),
    };

    if tokens.len() == 2 {
        Ok(build(parse_qubit(tokens[1])?))
    } else {
        Err(format!("Malformed {} instruction. Usage: {} <qubit>", opcode, opcode))
    }
}

// parses a whole program, one instruction per line
pub fn parse_program(source: &str) -> Result<Vec<Instruction>, String> {
    let mut program = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with(';') {
            continue;
        }
        let instr = parse_instruction(line).map_err(|e| format!("line {}: {}", idx + 1, e))?;
        program.push(instr);
    }
    Ok(program)
}

use crate::arch::hw::{decode_unit, Address, Byte, Opcode, Reg, Word, ADD_FROM_STACK, UNIT_WIDTH};
use crate::arch::module::{Module, UNCOMPRESSED};
use itertools::Itertools;
use std::fmt::{Display, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    Known(Opcode, Word),
    Unknown(Word, Word),
    Trailing(Vec<Byte>),
}

impl Display for Inst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Inst::Known(op, arg) => match op {
                Opcode::Nop | Opcode::Hlt | Opcode::Jmpa => write!(f, "{}", op),
                Opcode::Sl | Opcode::Spop => write!(f, "{} {:#06X}", op, arg),
                Opcode::Llbl => write!(f, "{} #{}", op, arg),
                Opcode::Rgw | Opcode::Rgr => match Reg::from_index(*arg) {
                    Some(reg) => write!(f, "{} {}", op, reg),
                    None => write!(f, "{} ?{:#06X}", op, arg),
                },
                Opcode::Add if *arg == ADD_FROM_STACK => write!(f, "{}", op),
                Opcode::Add => write!(f, "{} {:#06X}", op, arg),
            },
            Inst::Unknown(raw, arg) => write!(f, ".unit {:#06X} {:#06X}", raw, arg),
            Inst::Trailing(raw) => write!(f, ".bytes {}", hex(raw)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledUnit {
    pub address: Address,
    pub raw: Vec<Byte>,
    pub inst: Inst,
}

fn hex(raw: &[Byte]) -> String {
    raw.iter().map(|b| format!("{:02X}", b)).join(" ")
}

/// Splits a code section into instruction units. A short tail is reported as trailing bytes.
pub fn disassemble(code: &[Byte]) -> Vec<DisassembledUnit> {
    code.chunks(UNIT_WIDTH)
        .enumerate()
        .map(|(idx, raw)| {
            let inst = match decode_unit(raw) {
                Some((op, arg)) => match Opcode::decode(op) {
                    Some(op) => Inst::Known(op, arg),
                    None => Inst::Unknown(op, arg),
                },
                None => Inst::Trailing(raw.to_vec()),
            };
            DisassembledUnit {
                address: (idx * UNIT_WIDTH) as Address,
                raw: raw.to_vec(),
                inst,
            }
        })
        .collect()
}

pub fn listing(module: &Module) -> String {
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    let _ = write_listing(&mut out, module);
    out
}

fn write_listing(out: &mut String, module: &Module) -> std::fmt::Result {
    let header = &module.header;
    writeln!(
        out,
        "version {}, {}, entry {:#06X}, stack size {}, checksum {:#010X}",
        header.version,
        if header.compression == UNCOMPRESSED {
            "uncompressed"
        } else {
            "compressed"
        },
        header.entry,
        header.stack_size,
        header.checksum
    )?;

    writeln!(out, "labels ({}):", module.labels.len())?;
    for rec in &module.labels {
        writeln!(out, "  #{:<5} {:#06X}", rec.id, rec.address)?;
    }

    writeln!(out, "code ({} bytes):", module.code.len())?;
    for unit in disassemble(&module.code) {
        for rec in module.labels.iter().filter(|rec| rec.address == unit.address) {
            writeln!(out, "#{}:", rec.id)?;
        }

        write!(out, "  {:#06X}  {:<11}  {}", unit.address, hex(&unit.raw), unit.inst)?;
        if let Inst::Known(Opcode::Llbl, id) = unit.inst {
            match module.address_of(id) {
                Some(address) => write!(out, "  -> {:#06X}", address)?,
                None => write!(out, "  -> ?")?,
            }
        }
        writeln!(out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disassemble_units() {
        let code = [
            0x00, 0x02, 0x00, 0x05, // sl 5
            0x00, 0x11, 0x00, 0x0A, // rgr PC
            0x00, 0x30, 0x00, 0x00, // add
            0xBE, 0xEF, 0x00, 0x01, // ???
            0x00, 0x01, // short
        ];
        let units = disassemble(&code);
        let text: Vec<String> = units.iter().map(|unit| unit.inst.to_string()).collect();
        assert_eq!(
            text,
            vec![
                "sl 0x0005",
                "rgr PC",
                "add",
                ".unit 0xBEEF 0x0001",
                ".bytes 00 01",
            ]
        );
        assert_eq!(units[3].address, 12);
    }
}

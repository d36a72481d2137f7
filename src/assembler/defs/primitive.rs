use crate::arch::hw::{Opcode, ADD_FROM_STACK};
use crate::assembler::lang::{self, Builder, Encoded, Error};
use crate::assembler::phases::types::Warning;
use crate::assembler::model::Segment;

fn nop(operand: &str) -> Result<Encoded, Error> {
    lang::expect_none(operand)?;
    Ok(vec![Segment::unit(Opcode::Nop, 0)].into())
}

fn hlt(operand: &str) -> Result<Encoded, Error> {
    lang::expect_none(operand)?;
    Ok(vec![Segment::unit(Opcode::Hlt, 0)].into())
}

// Stack

fn sl(operand: &str) -> Result<Encoded, Error> {
    Ok(vec![Segment::unit(Opcode::Sl, lang::parse_literal(operand)?)].into())
}

fn spop(operand: &str) -> Result<Encoded, Error> {
    let count = if operand.is_empty() {
        1
    } else {
        lang::parse_literal(operand)?
    };
    Ok(vec![Segment::unit(Opcode::Spop, count)].into())
}

pub(super) fn llbl(operand: &str) -> Result<Encoded, Error> {
    let label = lang::parse_label(operand)?;
    Ok(vec![Segment::opcode(Opcode::Llbl), Segment::label_ref(label)].into())
}

// Registers

fn rgw(operand: &str) -> Result<Encoded, Error> {
    let reg = lang::parse_register(operand)?;
    Ok(vec![Segment::unit(Opcode::Rgw, reg.index())].into())
}

fn rgr(operand: &str) -> Result<Encoded, Error> {
    let reg = lang::parse_register(operand)?;
    Ok(vec![Segment::unit(Opcode::Rgr, reg.index())].into())
}

// Control

pub(super) fn jmpa(operand: &str) -> Result<Encoded, Error> {
    lang::expect_none(operand)?;
    Ok(vec![Segment::unit(Opcode::Jmpa, 0)].into())
}

// Arithmetic

// Without an operand both addends come from the stack. That form is encoded as an
// immediate of zero, so `add 0` cannot mean "add zero".
fn add(operand: &str) -> Result<Encoded, Error> {
    if operand.is_empty() {
        return Ok(vec![Segment::unit(Opcode::Add, ADD_FROM_STACK)].into());
    }

    let val = lang::parse_literal(operand)?;
    let encoded = Encoded::from(vec![Segment::unit(Opcode::Add, val)]);
    Ok(if val == ADD_FROM_STACK {
        encoded.warn(Warning::AddZeroReadsStack)
    } else {
        encoded
    })
}

pub(super) fn register(builder: &mut Builder) {
    builder.register_inst("nop", nop);
    builder.register_inst("hlt", hlt);
    builder.register_inst("sl", sl);
    builder.register_inst("spop", spop);
    builder.register_inst("llbl", llbl);
    builder.register_inst("rgw", rgw);
    builder.register_inst("rgr", rgr);
    builder.register_inst("jmpa", jmpa);
    builder.register_inst("add", add);
}

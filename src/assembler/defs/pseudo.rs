use super::primitive;
use crate::arch::hw::{Opcode, Reg, Word, UNIT_WIDTH};
use crate::assembler::lang::{self, Builder, Encoded, Error};
use crate::assembler::model::{self, Segment};

// None of these are opcodes of their own; each expands to a fixed run of primitive units.

fn jmpl(operand: &str) -> Result<Encoded, Error> {
    let mut segs = primitive::llbl(operand)?.segs;
    segs.append(&mut primitive::jmpa("")?.segs);
    Ok(segs.into())
}

// `rgr PC` pushes the address following it, so the saved return address is that plus
// everything else in the expansion. A `ret` then lands just past the whole `jmpr`.
fn jmpr(operand: &str) -> Result<Encoded, Error> {
    let save = Segment::unit(Opcode::Rgw, Reg::R7.index());
    let mut call = jmpl(operand)?.segs;
    let rest = UNIT_WIDTH + save.width() + model::width_of(&call);

    let mut segs = vec![
        Segment::unit(Opcode::Rgr, Reg::PC.index()),
        Segment::unit(Opcode::Add, rest as Word),
        save,
    ];
    segs.append(&mut call);
    Ok(segs.into())
}

fn ret(operand: &str) -> Result<Encoded, Error> {
    lang::expect_none(operand)?;
    let mut segs = vec![Segment::unit(Opcode::Rgr, Reg::R7.index())];
    segs.append(&mut primitive::jmpa("")?.segs);
    Ok(segs.into())
}

pub(super) fn register(builder: &mut Builder) {
    builder.register_inst("jmpl", jmpl);
    builder.register_inst("jmpr", jmpr);
    builder.register_inst("ret", ret);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::hw::encode_unit;

    #[test]
    fn jmpr_saves_the_address_past_itself() {
        let segs = jmpr("target").unwrap().segs;
        assert_eq!(model::width_of(&segs), 20);

        let expected = vec![
            Segment::unit(Opcode::Rgr, Reg::PC.index()),
            Segment::unit(Opcode::Add, 16),
            Segment::unit(Opcode::Rgw, Reg::R7.index()),
            Segment::opcode(Opcode::Llbl),
            Segment::label_ref("target"),
            Segment::unit(Opcode::Jmpa, 0),
        ];
        assert_eq!(segs, expected);
        assert_eq!(segs[1], Segment::Bytes(encode_unit(Opcode::Add, 0x10).to_vec()));
    }

    #[test]
    fn ret_jumps_through_r7() {
        assert_eq!(
            ret("").unwrap().segs,
            vec![
                Segment::unit(Opcode::Rgr, Reg::R7.index()),
                Segment::unit(Opcode::Jmpa, 0),
            ]
        );
    }

    #[test]
    fn jmpl_needs_a_label() {
        assert_eq!(jmpl(""), Err(Error::MissingOperand("label")));
        assert_eq!(
            jmpl("there").unwrap().segs,
            vec![
                Segment::opcode(Opcode::Llbl),
                Segment::label_ref("there"),
                Segment::unit(Opcode::Jmpa, 0),
            ]
        );
    }
}

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use static_assertions::const_assert_eq;
use strum_macros::{Display, EnumIter, EnumString};

pub type Byte = u8;
pub type Word = u16;

/// A byte offset into the code section.
pub type Address = u32;

/// The compact on-disk identifier of a label, used as the jump target.
pub type LabelId = u16;

pub const OPCODE_WIDTH: usize = 2;
pub const OPERAND_WIDTH: usize = 2;

/// Every primitive instruction is exactly one unit: opcode then operand.
pub const UNIT_WIDTH: usize = OPCODE_WIDTH + OPERAND_WIDTH;
const_assert_eq!(UNIT_WIDTH, 4);

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, EnumIter)]
#[repr(u16)]
pub enum Opcode {
    #[strum(serialize = "nop")]
    Nop = 0x0000,
    #[strum(serialize = "hlt")]
    Hlt = 0x0001,
    #[strum(serialize = "sl")]
    Sl = 0x0002,
    #[strum(serialize = "spop")]
    Spop = 0x0003,
    #[strum(serialize = "llbl")]
    Llbl = 0x0004,
    #[strum(serialize = "rgw")]
    Rgw = 0x0010,
    #[strum(serialize = "rgr")]
    Rgr = 0x0011,
    #[strum(serialize = "jmpa")]
    Jmpa = 0x0023,
    #[strum(serialize = "add")]
    Add = 0x0030,
}

impl Opcode {
    pub const fn encode(self) -> Word {
        self as Word
    }

    pub fn decode(raw: Word) -> Option<Opcode> {
        Opcode::from_u16(raw)
    }
}

// The operand of `add` which means "take both addends from the stack".
pub const ADD_FROM_STACK: Word = 0x0000;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, EnumIter, EnumString)]
#[repr(u16)]
pub enum Reg {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    MAR = 8,
    MVR = 9,
    PC = 10,
}

impl Reg {
    pub const fn index(self) -> Word {
        self as Word
    }

    pub fn from_index(idx: Word) -> Option<Reg> {
        Reg::from_u16(idx)
    }

    /// Register names are matched without regard to case.
    pub fn lookup(name: &str) -> Option<Reg> {
        name.to_uppercase().parse().ok()
    }
}

pub fn encode_unit(op: Opcode, operand: Word) -> [Byte; UNIT_WIDTH] {
    let [o1, o2] = op.encode().to_be_bytes();
    let [a1, a2] = operand.to_be_bytes();
    [o1, o2, a1, a2]
}

pub fn decode_unit(unit: &[Byte]) -> Option<(Word, Word)> {
    match unit {
        [o1, o2, a1, a2] => Some((
            Word::from_be_bytes([*o1, *o2]),
            Word::from_be_bytes([*a1, *a2]),
        )),
        _ => None,
    }
}

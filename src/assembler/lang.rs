use super::defs;
use super::model::Segment;
use super::phases::types::Warning;
use crate::arch::hw::{Reg, Word};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Display;
use std::num::{IntErrorKind, ParseIntError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    MalformedLiteral(String, &'static str),
    UnknownRegister(String),
    MissingOperand(&'static str),
    UnexpectedOperand(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedLiteral(raw, msg) => write!(f, "Malformed literal '{}': {}", raw, msg),
            Error::UnknownRegister(name) => write!(f, "Unknown register '{}'", name),
            Error::MissingOperand(what) => write!(f, "Expected {} operand", what),
            Error::UnexpectedOperand(raw) => write!(f, "Unexpected operand '{}'", raw),
        }
    }
}

/// What one source line assembles to, plus anything suspicious about it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Encoded {
    pub segs: Vec<Segment>,
    pub warnings: Vec<Warning>,
}

impl Encoded {
    pub fn warn(mut self, warning: Warning) -> Self {
        self.warnings.push(warning);
        self
    }
}

impl From<Vec<Segment>> for Encoded {
    fn from(segs: Vec<Segment>) -> Self {
        Encoded {
            segs,
            warnings: Vec::new(),
        }
    }
}

/// Maps the operand text of one source line to the segments it assembles to.
pub type Encoder = fn(&str) -> Result<Encoded, Error>;

pub struct Lang {
    insts: HashMap<&'static str, Encoder>,
}

pub struct Builder {
    insts: HashMap<&'static str, Encoder>,
}

impl Builder {
    fn new() -> Self {
        Builder {
            insts: HashMap::new(),
        }
    }

    pub(super) fn register_inst(&mut self, mnemonic: &'static str, encoder: Encoder) {
        if self.insts.insert(mnemonic, encoder).is_some() {
            panic!("Mnemonic '{}' registered twice", mnemonic);
        }
    }

    fn build(self) -> Lang {
        Lang { insts: self.insts }
    }
}

static LANG: Lazy<Lang> = Lazy::new(|| {
    let mut builder = Builder::new();
    defs::register(&mut builder);
    builder.build()
});

impl Lang {
    pub fn get() -> &'static Lang {
        &LANG
    }

    /// Mnemonics are matched exactly, including case.
    pub fn lookup_inst(&self, mnemonic: &str) -> Option<Encoder> {
        self.insts.get(mnemonic).copied()
    }

    pub fn mnemonics(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.insts.keys().copied()
    }
}

// Operand helpers shared by the encoders.

pub(super) fn expect_none(operand: &str) -> Result<(), Error> {
    if operand.is_empty() {
        Ok(())
    } else {
        Err(Error::UnexpectedOperand(operand.to_owned()))
    }
}

pub(super) fn expect_some<'a>(operand: &'a str, what: &'static str) -> Result<&'a str, Error> {
    if operand.is_empty() {
        Err(Error::MissingOperand(what))
    } else {
        Ok(operand)
    }
}

pub(super) fn parse_register(operand: &str) -> Result<Reg, Error> {
    let name = expect_some(operand, "register")?;
    Reg::lookup(name).ok_or_else(|| Error::UnknownRegister(name.to_owned()))
}

pub(super) fn parse_label(operand: &str) -> Result<&str, Error> {
    expect_some(operand, "label")
}

/// Parses an unsigned 16-bit literal with an optional `0x`, `0o` or `0b` radix prefix.
pub fn parse_literal(raw: &str) -> Result<Word, Error> {
    let raw = expect_some(raw.trim(), "literal")?;

    let lower = raw.to_ascii_lowercase();
    let (radix, digits) = match lower.get(..2) {
        Some("0x") => (16, &raw[2..]),
        Some("0o") => (8, &raw[2..]),
        Some("0b") => (2, &raw[2..]),
        _ => (10, raw),
    };

    if digits.starts_with('+') || digits.starts_with('-') {
        return Err(Error::MalformedLiteral(
            raw.to_owned(),
            "literals are unsigned",
        ));
    }

    Word::from_str_radix(digits, radix).map_err(|err| literal_error(raw, err))
}

fn literal_error(raw: &str, err: ParseIntError) -> Error {
    let msg = match err.kind() {
        IntErrorKind::Empty => "no digits",
        IntErrorKind::PosOverflow => "does not fit in 16 bits",
        _ => "invalid digit",
    };
    Error::MalformedLiteral(raw.to_owned(), msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::model;

    fn encode(mnemonic: &str, operand: &str) -> Result<Encoded, Error> {
        let encoder = Lang::get().lookup_inst(mnemonic).unwrap();
        encoder(operand)
    }

    fn width(mnemonic: &str, operand: &str) -> usize {
        model::width_of(&encode(mnemonic, operand).unwrap().segs)
    }

    #[test]
    fn literal_radixes() {
        assert_eq!(parse_literal("42"), Ok(42));
        assert_eq!(parse_literal("0x2A"), Ok(42));
        assert_eq!(parse_literal("0X2a"), Ok(42));
        assert_eq!(parse_literal("0o52"), Ok(42));
        assert_eq!(parse_literal("0b101010"), Ok(42));
        assert_eq!(parse_literal("  7 "), Ok(7));
        assert_eq!(parse_literal("0"), Ok(0));
        assert_eq!(parse_literal("65535"), Ok(0xFFFF));
    }

    #[test]
    fn literal_errors() {
        assert_eq!(
            parse_literal("65536"),
            Err(Error::MalformedLiteral(
                "65536".to_owned(),
                "does not fit in 16 bits"
            ))
        );
        assert_eq!(
            parse_literal("-1"),
            Err(Error::MalformedLiteral(
                "-1".to_owned(),
                "literals are unsigned"
            ))
        );
        assert_eq!(
            parse_literal("0x"),
            Err(Error::MalformedLiteral("0x".to_owned(), "no digits"))
        );
        assert_eq!(
            parse_literal("12ab"),
            Err(Error::MalformedLiteral("12ab".to_owned(), "invalid digit"))
        );
        assert_eq!(parse_literal(""), Err(Error::MissingOperand("literal")));
    }

    #[test]
    fn primitives_are_one_unit() {
        let samples = [
            ("nop", ""),
            ("hlt", ""),
            ("sl", "5"),
            ("spop", ""),
            ("spop", "3"),
            ("llbl", "somewhere"),
            ("rgw", "r3"),
            ("rgr", "PC"),
            ("jmpa", ""),
            ("add", ""),
            ("add", "0x10"),
        ];
        for (mnemonic, operand) in samples.iter() {
            assert_eq!(width(mnemonic, operand), 4, "{} {}", mnemonic, operand);
        }
    }

    #[test]
    fn pseudos_are_sums_of_units() {
        assert_eq!(width("jmpl", "target"), 8);
        assert_eq!(width("jmpr", "target"), 20);
        assert_eq!(width("ret", ""), 8);
    }

    #[test]
    fn add_zero_warns() {
        assert_eq!(
            encode("add", "0x0").unwrap().warnings,
            vec![Warning::AddZeroReadsStack]
        );
        assert_eq!(encode("add", "0x0").unwrap().segs, encode("add", "").unwrap().segs);
        assert!(encode("add", "").unwrap().warnings.is_empty());
        assert!(encode("add", "1").unwrap().warnings.is_empty());
    }

    #[test]
    fn mnemonics_are_case_sensitive() {
        assert!(Lang::get().lookup_inst("nop").is_some());
        assert!(Lang::get().lookup_inst("NOP").is_none());
        assert_eq!(Lang::get().mnemonics().count(), 12);
    }

    #[test]
    fn operand_shape_errors() {
        assert_eq!(
            encode("nop", "1"),
            Err(Error::UnexpectedOperand("1".to_owned()))
        );
        assert_eq!(encode("llbl", ""), Err(Error::MissingOperand("label")));
        assert_eq!(encode("rgw", ""), Err(Error::MissingOperand("register")));
        assert_eq!(
            encode("rgr", "R9"),
            Err(Error::UnknownRegister("R9".to_owned()))
        );
    }
}

use super::phases::types::{LabelName, Loc};
use crate::arch::hw::{encode_unit, Address, Byte, LabelId, Opcode, Word};
use derive_more::Constructor;
use indexmap::IndexMap;
use std::convert::TryFrom;

/// A reference to a label whose id is not known until every label has been declared.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Placeholder {
    pub label: LabelName,
}

impl Placeholder {
    /// Width of the resolved value, known before resolution.
    pub const WIDTH: usize = 2;

    pub fn resolve(&self, symbols: &SymbolTable) -> Option<[Byte; Placeholder::WIDTH]> {
        symbols.get(&self.label).map(|sym| sym.id.to_be_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Bytes(Vec<Byte>),
    Pending(Placeholder),
}

impl Segment {
    pub fn unit(op: Opcode, operand: Word) -> Segment {
        Segment::Bytes(encode_unit(op, operand).to_vec())
    }

    pub fn opcode(op: Opcode) -> Segment {
        Segment::Bytes(op.encode().to_be_bytes().to_vec())
    }

    pub fn label_ref(label: &str) -> Segment {
        Segment::Pending(Placeholder::new(label.to_owned()))
    }

    pub fn width(&self) -> usize {
        match self {
            Segment::Bytes(raw) => raw.len(),
            Segment::Pending(_) => Placeholder::WIDTH,
        }
    }
}

pub fn width_of(segs: &[Segment]) -> usize {
    segs.iter().map(Segment::width).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdsExhausted;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub id: LabelId,
    pub address: Address,
    pub loc: Loc,
}

/// Labels in declaration order. A redeclared name keeps its slot but takes the newer id
/// and address.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: IndexMap<LabelName, Symbol>,
    next_id: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the symbol previously bound to `name`, if any.
    pub fn declare(
        &mut self,
        name: LabelName,
        address: Address,
        loc: Loc,
    ) -> Result<Option<Symbol>, IdsExhausted> {
        let id = LabelId::try_from(self.next_id).map_err(|_| IdsExhausted)?;
        self.next_id += 1;
        Ok(self.symbols.insert(name, Symbol { id, address, loc }))
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LabelName, &Symbol)> {
        self.symbols.iter()
    }
}

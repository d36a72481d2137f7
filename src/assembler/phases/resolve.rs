use super::generate::Scan;
use super::types::{self, LabelName, Located, Warning};
use crate::arch::hw::{Address, Byte};
use crate::assembler::model::Segment;
use crate::assembler::Options;
use log::info;
use std::collections::HashSet;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    UnknownLabel(LabelName),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownLabel(label) => write!(f, "Unknown label '{}'", label),
        }
    }
}

/// The code section with every label reference replaced by the referenced label's id.
#[derive(Debug)]
pub struct Resolved {
    pub entry: Address,
    pub code: Vec<Byte>,
}

pub fn resolve(scan: &mut Scan, opts: &Options) -> Result<Resolved, types::Error> {
    let entry = scan
        .symbols
        .get(&opts.entry_point)
        .map(|sym| sym.address)
        .ok_or_else(|| types::Error::MissingEntryPoint(opts.entry_point.clone()))?;
    info!("`{}` entry point address: {:#06X}", opts.entry_point, entry);

    let mut used = HashSet::new();
    let mut code = Vec::new();
    for seg in &scan.segments {
        match &seg.val {
            Segment::Bytes(raw) => code.extend_from_slice(raw),
            Segment::Pending(ph) => {
                let resolved = ph
                    .resolve(&scan.symbols)
                    .ok_or_else(|| seg.transfer(Error::UnknownLabel(ph.label.clone())))?;
                info!(
                    "resolving jump for `{}` to label id {}",
                    ph.label,
                    u16::from_be_bytes(resolved)
                );
                code.extend_from_slice(&resolved);
                used.insert(ph.label.as_str());
            }
        }
    }

    let unused: Vec<Located<Warning>> = scan
        .symbols
        .iter()
        .filter(|(name, _)| **name != opts.entry_point && !used.contains(name.as_str()))
        .map(|(name, sym)| Located::with_loc(sym.loc.clone(), Warning::UnusedLabel(name.clone())))
        .collect();
    scan.warnings.extend(unused);

    Ok(Resolved { entry, code })
}

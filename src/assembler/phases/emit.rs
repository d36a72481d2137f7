use super::resolve::Resolved;
use crate::arch::module::{Header, LabelRecord, Module};
use crate::assembler::model::SymbolTable;
use crate::assembler::Options;
use log::info;

pub fn emit(symbols: &SymbolTable, resolved: Resolved, opts: &Options) -> Module {
    let labels: Vec<LabelRecord> = symbols
        .iter()
        .map(|(_, sym)| LabelRecord::new(sym.id, sym.address))
        .collect();
    info!("generated {} label table entries", labels.len());

    let module = Module::new(
        Header::new(resolved.entry, opts.stack_size),
        labels,
        resolved.code,
    );
    info!(
        "instructions emitted (est.): {}",
        module.code.len() / crate::arch::hw::UNIT_WIDTH
    );
    module
}

pub mod disasm;
pub mod lang;
pub mod model;
pub mod phases;

mod defs;

pub use phases::preprocess::{FsLoader, SourceLoader};
pub use phases::types::{Error, Loc, Located, Warning};

use crate::arch::hw::{Byte, Word};
use crate::arch::module::{Module, DEFAULT_STACK_SIZE};
use phases::preprocess::{self, LineQueue};
use std::path::Path;

pub const DEFAULT_ENTRY_POINT: &str = "main";

/// The name given to source passed in as a string.
pub const INLINE_SOURCE_NAME: &str = "<input>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub entry_point: String,
    pub automatic_main: bool,
    pub stack_size: Word,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            entry_point: DEFAULT_ENTRY_POINT.to_owned(),
            automatic_main: true,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub module: Module,
    pub warnings: Vec<Located<Warning>>,
}

impl Assembly {
    pub fn to_bytes(&self) -> Vec<Byte> {
        self.module.to_bytes()
    }
}

fn assemble_lines<L: SourceLoader>(
    lines: Vec<Located<String>>,
    loader: L,
    opts: &Options,
) -> Result<Assembly, Error> {
    let mut scan = phases::generate(LineQueue::new(lines), loader, opts)?;
    let resolved = phases::resolve(&mut scan, opts)?;
    let module = phases::emit(&scan.symbols, resolved, opts);

    Ok(Assembly {
        module,
        warnings: scan.warnings,
    })
}

/// Assembles `source`. Includes are resolved against the working directory.
pub fn assemble(source: &str, opts: &Options) -> Result<Assembly, Error> {
    assemble_lines(
        preprocess::lines_of(INLINE_SOURCE_NAME, source),
        FsLoader,
        opts,
    )
}

/// Assembles the file at `root`, reading it and everything it includes through `loader`.
pub fn assemble_with<L: SourceLoader>(
    root: &Path,
    loader: L,
    opts: &Options,
) -> Result<Assembly, Error> {
    let source = loader
        .load(root)
        .map_err(|err| Error::Read(root.to_owned(), err.to_string()))?;
    assemble_lines(
        preprocess::lines_of(&root.to_string_lossy(), &source),
        loader,
        opts,
    )
}

pub fn assemble_path(path: &Path, opts: &Options) -> Result<Assembly, Error> {
    assemble_with(path, FsLoader, opts)
}

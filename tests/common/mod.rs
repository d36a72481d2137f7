#![allow(dead_code)]

use kl27::arch::hw::Byte;
use kl27::assembler::{self, Assembly, Error, Loc, Located, Options, SourceLoader};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Serves sources from memory, keyed by the exact path the assembler asks for.
#[derive(Debug, Default)]
pub struct MemLoader(HashMap<PathBuf, String>);

impl MemLoader {
    pub fn with(files: &[(&str, &str)]) -> Self {
        MemLoader(
            files
                .iter()
                .map(|(path, text)| (PathBuf::from(path), (*text).to_owned()))
                .collect(),
        )
    }
}

impl SourceLoader for MemLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

pub fn assemble_files(root: &str, files: &[(&str, &str)]) -> Result<Assembly, Error> {
    assembler::assemble_with(Path::new(root), MemLoader::with(files), &Options::default())
}

pub fn assemble(src: &str) -> Result<Assembly, Error> {
    assembler::assemble(src, &Options::default())
}

pub fn located<T>(file: &str, line: usize, val: T) -> Located<T> {
    Located::with_loc(Loc::new(file.to_owned(), line), val)
}

/// Flattens `(opcode, operand)` pairs into big-endian code bytes.
pub fn units(pairs: &[(u16, u16)]) -> Vec<Byte> {
    pairs
        .iter()
        .flat_map(|(op, arg)| {
            let mut unit = op.to_be_bytes().to_vec();
            unit.extend_from_slice(&arg.to_be_bytes());
            unit
        })
        .collect()
}

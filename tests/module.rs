mod common;

use common::assemble;
use kl27::arch::module::{self, Module};
use kl27::assembler::{disasm, Options};
use kl27::{assets, cli::command};
use std::path::{Path, PathBuf};

const PROG: &str = "main:\n  jmpl done\ndone:\n  sl 5\n  hlt\n";

#[test]
fn modules_read_back() {
    let assembly = assemble(PROG).unwrap();
    assert_eq!(
        Module::from_bytes(&assembly.to_bytes()),
        Ok(assembly.module)
    );
}

#[test]
fn bad_magic() {
    let mut raw = assemble(PROG).unwrap().to_bytes();
    raw[0] = b'X';
    assert_eq!(
        Module::from_bytes(&raw),
        Err(module::Error::BadMagic(*b"XL27"))
    );
}

#[test]
fn unsupported_version() {
    let mut raw = assemble(PROG).unwrap().to_bytes();
    raw[4] = 2;
    assert_eq!(
        Module::from_bytes(&raw),
        Err(module::Error::UnsupportedVersion(2))
    );
}

#[test]
fn truncated_modules() {
    let raw = assemble(PROG).unwrap().to_bytes();
    assert_eq!(
        Module::from_bytes(&raw[..3]),
        Err(module::Error::Truncated("magic"))
    );
    assert_eq!(
        Module::from_bytes(&raw[..18]),
        Err(module::Error::Truncated("label count"))
    );
    assert_eq!(
        Module::from_bytes(&raw[..23]),
        Err(module::Error::Truncated("label table"))
    );
}

#[test]
fn listing() {
    let module = assemble(PROG).unwrap().module;
    let text = disasm::listing(&module);

    assert!(text.starts_with("version 1, uncompressed, entry 0x0000, stack size 4"));
    assert!(text.contains("labels (2):"));
    assert!(text.contains("code (16 bytes):"));
    assert!(text.contains("#1:\n"));
    assert!(text.contains("llbl #1  -> 0x0008"));
    assert!(text.contains("sl 0x0005"));
    assert!(text.contains("hlt"));
}

#[test]
fn default_binary_path() {
    assert_eq!(
        assets::default_binary_path(Path::new("dir/prog.klt")),
        PathBuf::from("prog.klb")
    );
}

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("kl27-{}-{}", std::process::id(), name))
}

#[test]
fn assemble_file_writes_module() {
    let (src, out) = (scratch("ok.klt"), scratch("ok.klb"));
    std::fs::write(&src, PROG).unwrap();

    let assembly = command::assemble_file(&src, &out, &Options::default()).unwrap();
    assert_eq!(std::fs::read(&out).unwrap(), assembly.to_bytes());
    assert_eq!(command::read_module(&out).unwrap(), assembly.module);

    std::fs::remove_file(&src).unwrap();
    std::fs::remove_file(&out).unwrap();
}

#[test]
fn assemble_file_writes_nothing_on_error() {
    let (src, out) = (scratch("bad.klt"), scratch("bad.klb"));
    std::fs::write(&src, "start:\n  hlt\n").unwrap();

    let err = command::assemble_file(&src, &out, &Options::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("Could not find entry point label 'main'"));
    assert!(!out.exists());

    std::fs::remove_file(&src).unwrap();
}

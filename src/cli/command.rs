use crate::arch::{hw::Word, module::Module};
use crate::assembler::{self, disasm, Assembly, Located, Options, Warning};
use crate::assets;
use ansi_term::Color::{Green, Red, Yellow};
use anyhow::Context;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[cfg(windows)]
pub fn terminal_init() {
    ansi_term::enable_ansi_support().expect("Could enable terminal ANSI support");
}

#[cfg(not(windows))]
pub fn terminal_init() {}

/// `RUST_LOG` takes precedence over the level chosen here.
pub fn logger_init(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

#[derive(StructOpt, Debug)]
#[structopt(name = "kl27")]
pub enum CommandRoot {
    Asm(SubcommandAsm),
    Dump(SubcommandDump),
}

#[derive(StructOpt, Debug)]
pub struct AsmOpts {
    /// Label at which execution starts
    #[structopt(long, default_value = "main")]
    entry_point: String,

    /// Reject instructions which appear before any label, instead of placing them under `main`
    #[structopt(long)]
    no_automatic_main: bool,

    /// Stack size hint written into the module header
    #[structopt(long, default_value = "4")]
    stack_size: Word,
}

impl From<AsmOpts> for Options {
    fn from(opts: AsmOpts) -> Self {
        Options {
            entry_point: opts.entry_point,
            automatic_main: !opts.no_automatic_main,
            stack_size: opts.stack_size,
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "klasm")]
pub struct SubcommandAsm {
    #[structopt(name = "in.klt", parse(from_os_str))]
    in_src: PathBuf,

    #[structopt(name = "out.klb", parse(from_os_str))]
    out_bin: Option<PathBuf>,

    #[structopt(flatten)]
    opts: AsmOpts,

    #[structopt(short, long)]
    verbose: bool,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandDump {
    #[structopt(name = "in.klb", parse(from_os_str))]
    in_bin: PathBuf,
}

pub fn root(cmd: CommandRoot) -> ! {
    match cmd {
        CommandRoot::Asm(scmd) => asm(scmd),
        CommandRoot::Dump(scmd) => dump(scmd),
    };
}

fn print_error(err: &anyhow::Error) {
    eprintln!("{}: {:#}", Red.bold().paint("error"), err);
}

pub fn print_warnings(warnings: &[Located<Warning>]) {
    for warning in warnings {
        eprintln!("{}: {}", Yellow.bold().paint("warning"), warning);
    }
}

/// Assembles `in_src` and writes the module to `out_bin`. Nothing is written on failure.
pub fn assemble_file(in_src: &Path, out_bin: &Path, opts: &Options) -> anyhow::Result<Assembly> {
    let assembly = assembler::assemble_path(in_src, opts)
        .with_context(|| format!("failed to assemble '{}'", in_src.display()))?;

    std::fs::write(out_bin, assembly.to_bytes())
        .with_context(|| format!("failed to write '{}'", out_bin.display()))?;

    Ok(assembly)
}

pub fn asm(cmd: SubcommandAsm) -> ! {
    let SubcommandAsm {
        in_src,
        out_bin,
        opts,
        verbose,
    } = cmd;
    logger_init(verbose);

    let out_bin = out_bin.unwrap_or_else(|| assets::default_binary_path(&in_src));

    let code = match assemble_file(&in_src, &out_bin, &opts.into()) {
        Ok(assembly) => {
            print_warnings(&assembly.warnings);
            println!(
                "{} '{}', written {} bytes",
                Green.bold().paint("compiled"),
                out_bin.display(),
                assembly.module.len()
            );
            0
        }
        Err(err) => {
            print_error(&err);
            1
        }
    };

    std::process::exit(code);
}

pub fn read_module(path: &Path) -> anyhow::Result<Module> {
    let raw = std::fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?;
    Module::from_bytes(&raw).with_context(|| format!("failed to load '{}'", path.display()))
}

pub fn dump(cmd: SubcommandDump) -> ! {
    logger_init(false);

    let code = match read_module(&cmd.in_bin) {
        Ok(module) => {
            print!("{}", disasm::listing(&module));
            0
        }
        Err(err) => {
            print_error(&err);
            1
        }
    };

    std::process::exit(code);
}

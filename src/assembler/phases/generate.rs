use super::parse::Line;
use super::preprocess::{LineQueue, Preprocessor, SourceLoader};
use super::types::{self, LabelName, Located, Warning};
use crate::arch::hw::Address;
use crate::assembler::lang::{self, Lang};
use crate::assembler::model::{self, Segment, SymbolTable};
use crate::assembler::Options;
use log::{debug, info};
use std::convert::TryFrom;
use std::fmt::Display;

pub const AUTOMATIC_MAIN: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    NoLabel,
    EmptyLabelName,
    TooManyLabels,
    CodeTooLarge,
    InstUnknown(String, LabelName),
    InstInvalid(String, LabelName, lang::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NoLabel => write!(f, "No label specified"),
            Error::EmptyLabelName => write!(f, "Label names must have nonzero length"),
            Error::TooManyLabels => write!(f, "Too many labels for 16-bit label ids"),
            Error::CodeTooLarge => write!(f, "Code section exceeds 32-bit addressing"),
            Error::InstUnknown(name, label) => {
                write!(f, "In label '{}': unknown instruction '{}'", label, name)
            }
            Error::InstInvalid(name, label, err) => {
                write!(f, "In label '{}': instruction '{}': {}", label, name, err)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    NoLabel,
    InLabel(LabelName),
    Done,
}

/// Everything the first pass produces.
#[derive(Debug)]
pub struct Scan {
    pub symbols: SymbolTable,
    pub segments: Vec<Located<Segment>>,
    pub warnings: Vec<Located<Warning>>,
}

struct Context<'o, L> {
    opts: &'o Options,
    preprocessor: Preprocessor<L>,
    state: ScanState,
    pointer: Address,
    symbols: SymbolTable,
    segments: Vec<Located<Segment>>,
    warnings: Vec<Located<Warning>>,
}

impl<'o, L: SourceLoader> Context<'o, L> {
    fn new(opts: &'o Options, loader: L) -> Self {
        Context {
            opts,
            preprocessor: Preprocessor::new(loader),
            state: ScanState::NoLabel,
            pointer: 0,
            symbols: SymbolTable::new(),
            segments: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn run(mut self, mut queue: LineQueue) -> Result<Scan, types::Error> {
        while let Some(line) = queue.next() {
            self.step(&line, &mut queue)?;
        }
        self.state = ScanState::Done;

        Ok(Scan {
            symbols: self.symbols,
            segments: self.segments,
            warnings: self.warnings,
        })
    }

    fn step(&mut self, line: &Located<String>, queue: &mut LineQueue) -> Result<(), types::Error> {
        match Line::classify(&line.val) {
            Line::Blank | Line::Comment => {}
            Line::Directive => {
                if let Some(warning) = self.preprocessor.directive(line, queue)? {
                    self.warnings.push(warning);
                }
            }
            Line::LabelDef(label) => self.declare(line, label)?,
            Line::Inst { mnemonic, operand } => self.inst(line, mnemonic, operand)?,
        }
        Ok(())
    }

    fn current_label(&self) -> Option<LabelName> {
        match &self.state {
            ScanState::InLabel(label) => Some(label.clone()),
            ScanState::NoLabel | ScanState::Done => None,
        }
    }

    fn warn(&mut self, line: &Located<String>, warning: Warning) {
        self.warnings.push(line.transfer(warning));
    }

    fn declare(&mut self, line: &Located<String>, label: &str) -> Result<(), Located<Error>> {
        if label.is_empty() {
            return Err(line.transfer(Error::EmptyLabelName));
        }

        let prev = self
            .symbols
            .declare(label.to_owned(), self.pointer, line.loc.clone())
            .map_err(|_| line.transfer(Error::TooManyLabels))?;
        if prev.is_some() {
            self.warn(line, Warning::LabelRedefined(label.to_owned()));
        }

        info!("compiling label {} at address {:#06X}", label, self.pointer);
        self.state = ScanState::InLabel(label.to_owned());
        Ok(())
    }

    fn automatic_main(&mut self, line: &Located<String>) -> Result<LabelName, Located<Error>> {
        if !self.opts.automatic_main {
            return Err(line.transfer(Error::NoLabel));
        }

        self.warn(line, Warning::AutomaticMain(AUTOMATIC_MAIN.to_owned()));
        self.declare(line, AUTOMATIC_MAIN)?;
        Ok(AUTOMATIC_MAIN.to_owned())
    }

    fn inst(
        &mut self,
        line: &Located<String>,
        mnemonic: &str,
        operand: &str,
    ) -> Result<(), Located<Error>> {
        let label = match self.current_label() {
            Some(label) => label,
            None => self.automatic_main(line)?,
        };

        let encoder = Lang::get()
            .lookup_inst(mnemonic)
            .ok_or_else(|| line.transfer(Error::InstUnknown(mnemonic.to_owned(), label.clone())))?;
        let encoded = encoder(operand).map_err(|err| {
            line.transfer(Error::InstInvalid(mnemonic.to_owned(), label.clone(), err))
        })?;
        for warning in encoded.warnings {
            self.warn(line, warning);
        }

        debug!(
            "compiling instruction {} at address {:#06X} inside {}",
            mnemonic, self.pointer, label
        );

        self.pointer = advance(self.pointer, model::width_of(&encoded.segs))
            .ok_or_else(|| line.transfer(Error::CodeTooLarge))?;
        self.segments
            .extend(encoded.segs.into_iter().map(|seg| line.transfer(seg)));
        Ok(())
    }
}

/// `None` once the code no longer fits in the address space.
fn advance(pointer: Address, width: usize) -> Option<Address> {
    Address::try_from(width)
        .ok()
        .and_then(|width| pointer.checked_add(width))
}

pub fn generate<L: SourceLoader>(
    queue: LineQueue,
    loader: L,
    opts: &Options,
) -> Result<Scan, types::Error> {
    Context::new(opts, loader).run(queue)
}

use super::{generate, preprocess, resolve};
use derive_more::Constructor;
use std::fmt::Display;
use std::path::PathBuf;

/*
    Phases:

        1.  Preprocessing: Lines are pulled from a `LineQueue`. `#`-directives are handled on the
            spot; an `#include` splices the included file's lines in at the cursor, so they are
            read next, exactly as if they had been pasted in place of the directive.

        2.  Classification: Every remaining line is one of blank, comment, label declaration or
            instruction (`parse::Line`).

        3.  Generation: Label declarations are entered into the `SymbolTable` at the current
            address. Instructions are run through their encoder from the `Lang` table, producing
            `Segment`s which are either concrete bytes or `Placeholder`s for label references.
            The address pointer advances by the width of every segment, placeholders included,
            so all addresses are final by the end of the scan.

        4.  Resolution: With every label known, each `Placeholder` is replaced by the compact
            id of the label it names.

        5.  Emission: The header, the label table and the resolved code are laid out into a
            `Module`.
*/

#[derive(Debug, Clone, PartialEq, Eq, Hash, Constructor)]
pub struct Loc {
    pub file: String,
    pub line: usize,
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    pub loc: Loc,
    pub val: T,
}

impl<T: Display> Display for Located<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.loc, self.val)
    }
}

impl<T> Located<T> {
    pub fn with_loc(loc: Loc, val: T) -> Self {
        Located { loc, val }
    }

    pub fn value(self) -> T {
        self.val
    }

    pub fn transfer<S>(&self, s: S) -> Located<S> {
        Located::with_loc(self.loc.clone(), s)
    }
}

pub type LabelName = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    LabelRedefined(LabelName),
    AutomaticMain(LabelName),
    MissingIncludeGuard(PathBuf),
    UnusedLabel(LabelName),
    AddZeroReadsStack,
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::LabelRedefined(label) => write!(
                f,
                "Redefined label '{}', code under the old definition is unreachable through it",
                label
            ),
            Warning::AutomaticMain(label) => write!(
                f,
                "No label specified, assuming '{}' (pass --no-automatic-main to disable this)",
                label
            ),
            Warning::MissingIncludeGuard(path) => write!(
                f,
                "Included file '{}' has no #ID line, it could be included more than once",
                path.display()
            ),
            Warning::UnusedLabel(label) => write!(f, "Unused label '{}'", label),
            Warning::AddZeroReadsStack => write!(
                f,
                "'add 0' is encoded as the stack-operand form, it does not add zero"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Read(PathBuf, String),
    Preprocess(Located<preprocess::Error>),
    Generate(Located<generate::Error>),
    Resolve(Located<resolve::Error>),
    MissingEntryPoint(LabelName),
}

impl From<Located<preprocess::Error>> for Error {
    fn from(err: Located<preprocess::Error>) -> Self {
        Error::Preprocess(err)
    }
}

impl From<Located<generate::Error>> for Error {
    fn from(err: Located<generate::Error>) -> Self {
        Error::Generate(err)
    }
}

impl From<Located<resolve::Error>> for Error {
    fn from(err: Located<resolve::Error>) -> Self {
        Error::Resolve(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Assembly Error (in ")?;
        match self {
            Error::Read(..) => write!(f, "Reader"),
            Error::Preprocess(_) => write!(f, "Preprocessor"),
            Error::Generate(_) => write!(f, "Generator"),
            Error::Resolve(_) | Error::MissingEntryPoint(_) => write!(f, "Resolver"),
        }?;
        write!(f, "): ")?;
        match self {
            Error::Read(path, msg) => write!(f, "Could not read '{}': {}", path.display(), msg),
            Error::Preprocess(err) => write!(f, "{}", err),
            Error::Generate(err) => write!(f, "{}", err),
            Error::Resolve(err) => write!(f, "{}", err),
            Error::MissingEntryPoint(label) => {
                write!(f, "Could not find entry point label '{}'", label)
            }
        }
    }
}

impl std::error::Error for Error {}

use super::types::{Loc, Located, Warning};
use log::info;
use std::collections::{HashSet, VecDeque};
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const DIRECTIVE_CHAR: char = '#';
const GUARD_DIRECTIVE: &str = "ID";

/// Files open at once, the root included.
pub const MAX_INCLUDE_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    UnknownDirective(String),
    MissingIncludePath,
    IncludeUnreadable(PathBuf, String),
    IncludeCycle(PathBuf),
    IncludeTooDeep(PathBuf),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownDirective(name) => write!(f, "Unknown directive '{}'", name),
            Error::MissingIncludePath => write!(f, "Expected a path after 'include'"),
            Error::IncludeUnreadable(path, msg) => {
                write!(f, "Could not read included file '{}': {}", path.display(), msg)
            }
            Error::IncludeCycle(path) => {
                write!(f, "File '{}' includes itself without an #ID line", path.display())
            }
            Error::IncludeTooDeep(path) => write!(
                f,
                "Including '{}' nests more than {} files deep",
                path.display(),
                MAX_INCLUDE_DEPTH
            ),
        }
    }
}

pub trait SourceLoader {
    fn load(&self, path: &Path) -> io::Result<String>;
}

pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

pub fn lines_of(file: &str, text: &str) -> Vec<Located<String>> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| Located::with_loc(Loc::new(file.to_owned(), idx + 1), line.to_owned()))
        .collect()
}

#[derive(Debug)]
struct Pending {
    line: Located<String>,
    includers: Rc<Vec<PathBuf>>,
}

/// The remaining input. Included files are spliced in at the cursor, so their lines are
/// the next ones read. Every line remembers the chain of files which included it.
#[derive(Debug, Default)]
pub struct LineQueue {
    pending: VecDeque<Pending>,
    includers: Rc<Vec<PathBuf>>,
}

impl LineQueue {
    pub fn new(lines: Vec<Located<String>>) -> Self {
        let mut queue = LineQueue::default();
        queue.splice(lines, Vec::new());
        queue
    }

    /// The files whose includes led to the line last read, outermost first.
    pub fn includers(&self) -> &[PathBuf] {
        &self.includers
    }

    pub fn splice(&mut self, lines: Vec<Located<String>>, includers: Vec<PathBuf>) {
        let includers = Rc::new(includers);
        for line in lines.into_iter().rev() {
            self.pending.push_front(Pending {
                line,
                includers: includers.clone(),
            });
        }
    }
}

impl Iterator for LineQueue {
    type Item = Located<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let Pending { line, includers } = self.pending.pop_front()?;
        self.includers = includers;
        Some(line)
    }
}

/// The `#ID` tags seen so far in this run.
#[derive(Debug, Default)]
pub struct IncludeGuards(HashSet<String>);

impl IncludeGuards {
    /// Returns `false` if the tag was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        self.0.insert(id.to_owned())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }
}

fn guard_tag(first_line: &str) -> Option<&str> {
    let rest = first_line
        .trim()
        .strip_prefix(DIRECTIVE_CHAR)?
        .strip_prefix(GUARD_DIRECTIVE)?;
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c.is_whitespace() => Some(rest.trim()),
        Some(_) => None,
    }
}

fn unquote(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}

type DirectiveHandler<L> =
    fn(&mut Preprocessor<L>, &Loc, &str, &mut LineQueue) -> Result<Option<Warning>, Error>;

pub struct Preprocessor<L> {
    loader: L,
    guards: IncludeGuards,
}

impl<L: SourceLoader> Preprocessor<L> {
    const DIRECTIVES: [(&'static str, DirectiveHandler<L>); 2] = [
        ("include", Self::include),
        (GUARD_DIRECTIVE, Self::guard),
    ];

    pub fn new(loader: L) -> Self {
        Preprocessor {
            loader,
            guards: IncludeGuards::default(),
        }
    }

    pub fn guards(&self) -> &IncludeGuards {
        &self.guards
    }

    /// Runs the directive on `line`, which must start with `#`.
    pub fn directive(
        &mut self,
        line: &Located<String>,
        queue: &mut LineQueue,
    ) -> Result<Option<Located<Warning>>, Located<Error>> {
        let body = line
            .val
            .trim()
            .trim_start_matches(DIRECTIVE_CHAR);
        let (name, arg) = match body.find(char::is_whitespace) {
            Some(idx) => (&body[..idx], body[idx..].trim()),
            None => (body, ""),
        };

        let handler = Self::DIRECTIVES
            .iter()
            .find(|(directive, _)| *directive == name)
            .map(|(_, handler)| *handler)
            .ok_or_else(|| line.transfer(Error::UnknownDirective(name.to_owned())))?;

        handler(self, &line.loc, arg, queue)
            .map(|warning| warning.map(|warning| line.transfer(warning)))
            .map_err(|err| line.transfer(err))
    }

    fn include(
        &mut self,
        loc: &Loc,
        arg: &str,
        queue: &mut LineQueue,
    ) -> Result<Option<Warning>, Error> {
        let target = unquote(arg);
        if target.is_empty() {
            return Err(Error::MissingIncludePath);
        }

        let path = match Path::new(&loc.file).parent() {
            Some(dir) => dir.join(target),
            None => PathBuf::from(target),
        };
        let text = self
            .loader
            .load(&path)
            .map_err(|err| Error::IncludeUnreadable(path.clone(), err.to_string()))?;

        let mut lines = lines_of(&path.to_string_lossy(), &text);
        let tag = lines.first().and_then(|first| guard_tag(&first.val)).map(str::to_owned);

        let warning = match tag {
            Some(tag) => {
                if !self.guards.insert(&tag) {
                    info!("not re-including file '{}'", path.display());
                    return Ok(None);
                }
                lines.remove(0);
                None
            }
            None => Some(Warning::MissingIncludeGuard(path.clone())),
        };

        let mut includers = queue.includers().to_vec();
        includers.push(PathBuf::from(&loc.file));
        if includers.contains(&path) {
            return Err(Error::IncludeCycle(path));
        }
        if includers.len() >= MAX_INCLUDE_DEPTH {
            return Err(Error::IncludeTooDeep(path));
        }

        info!("including file '{}'", path.display());
        queue.splice(lines, includers);
        Ok(warning)
    }

    fn guard(&mut self, _: &Loc, arg: &str, _: &mut LineQueue) -> Result<Option<Warning>, Error> {
        self.guards.insert(arg);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Located<String> {
        Located::with_loc(Loc::new("main.klt".to_owned(), 1), text.to_owned())
    }

    #[test]
    fn guard_tags() {
        assert_eq!(guard_tag("#ID stdlib"), Some("stdlib"));
        assert_eq!(guard_tag("  #ID   two words "), Some("two words"));
        assert_eq!(guard_tag("#ID"), Some(""));
        assert_eq!(guard_tag("#IDENT x"), None);
        assert_eq!(guard_tag("nop"), None);
    }

    #[test]
    fn splice_reads_next() {
        let mut queue = LineQueue::new(vec![line("a"), line("d")]);
        assert_eq!(queue.next().map(Located::value), Some("a".to_owned()));
        queue.splice(vec![line("b"), line("c")], vec![PathBuf::from("main.klt")]);
        assert_eq!(queue.next().map(Located::value), Some("b".to_owned()));
        assert_eq!(queue.includers(), &[PathBuf::from("main.klt")]);
        let rest: Vec<_> = queue.map(Located::value).collect();
        assert_eq!(rest, vec!["c", "d"]);
    }

    #[test]
    fn includers_follow_the_line_read() {
        let mut queue = LineQueue::new(vec![line("a"), line("b")]);
        queue.next();
        queue.splice(vec![line("c")], vec![PathBuf::from("main.klt")]);
        queue.next();
        assert_eq!(queue.includers().len(), 1);
        queue.next();
        assert!(queue.includers().is_empty());
    }

    #[test]
    fn unknown_directive() {
        let mut pp = Preprocessor::new(FsLoader);
        let mut queue = LineQueue::default();
        assert_eq!(
            pp.directive(&line("#define X 1"), &mut queue),
            Err(line("#define X 1").transfer(Error::UnknownDirective("define".to_owned())))
        );
    }

    #[test]
    fn id_directive_registers_guard() {
        let mut pp = Preprocessor::new(FsLoader);
        let mut queue = LineQueue::default();
        assert_eq!(pp.directive(&line("#ID core"), &mut queue), Ok(None));
        assert!(pp.guards().contains("core"));
    }
}

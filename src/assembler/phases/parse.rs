use super::preprocess::DIRECTIVE_CHAR;

const COMMENT_PREFIX: &str = "//";
const LABEL_SUFFIX: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    Comment,
    Directive,
    LabelDef(&'a str),
    Inst { mnemonic: &'a str, operand: &'a str },
}

impl<'a> Line<'a> {
    /// Classifies a single source line. Surrounding whitespace is ignored.
    pub fn classify(raw: &'a str) -> Line<'a> {
        let line = raw.trim();

        if line.is_empty() {
            Line::Blank
        } else if line.starts_with(COMMENT_PREFIX) {
            Line::Comment
        } else if line.starts_with(DIRECTIVE_CHAR) {
            Line::Directive
        } else if let Some(label) = line.strip_suffix(LABEL_SUFFIX) {
            Line::LabelDef(label)
        } else {
            let (mnemonic, operand) = match line.find(char::is_whitespace) {
                Some(idx) => (&line[..idx], line[idx..].trim()),
                None => (line, ""),
            };
            Line::Inst { mnemonic, operand }
        }
    }
}

//! Tag grammar.
//!
//! ```text
//! tag   := '{' path '}'
//! path  := attr ('.' attr)*
//! attr  := name (':' index)?
//! name  := [A-Za-z0-9_]+      case-folded to lowercase
//! index := [0-9]+             1-based, stored 0-based
//! ```
//!
//! Spaces and tabs may surround `.` and `:` but never touch the braces.

use crate::error::{Result, SyntaxError, TemplatingError};
use std::fmt;
use std::str::FromStr;

/// One `name[:index]` segment of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathStep {
    /// Lowercased name.
    pub name: String,
    /// 0-based index.
    pub index: Option<u32>,
}

impl PathStep {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            index: None,
        }
    }

    /// A step with a 0-based index.
    pub fn indexed(name: &str, index: u32) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            index: Some(index),
        }
    }
}

/// Source form, with the index shown 1-based.
impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}:{}", self.name, u64::from(index) + 1),
            None => f.write_str(&self.name),
        }
    }
}

/// A parsed, non-empty tag path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagPath {
    steps: Vec<PathStep>,
}

impl TagPath {
    /// Returns `None` for an empty list of steps.
    pub fn from_steps(steps: Vec<PathStep>) -> Option<Self> {
        if steps.is_empty() {
            None
        } else {
            Some(Self { steps })
        }
    }

    /// A path from a root step and the steps below it.
    pub fn rooted(root: PathStep, rest: impl IntoIterator<Item = PathStep>) -> Self {
        let mut steps = vec![root];
        steps.extend(rest);
        Self { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn root(&self) -> &PathStep {
        &self.steps[0]
    }

    /// Steps after the root.
    pub fn rest(&self) -> &[PathStep] {
        &self.steps[1..]
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Source form without braces, e.g. `user.dogs:1.name`.
    pub fn fragment(&self) -> String {
        join_steps(&self.steps)
    }

    /// Source form with braces, e.g. `{user.dogs:1.name}`.
    pub fn render_as_tag(&self) -> String {
        format!("{{{}}}", self.fragment())
    }

    /// Liquid variable expression, e.g. `user.dogs[0].name`.
    pub fn to_engine_expr(&self) -> String {
        let mut out = String::new();
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&step.name);
            if let Some(index) = step.index {
                out.push_str(&format!("[{index}]"));
            }
        }
        out
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment())
    }
}

impl FromStr for TagPath {
    type Err = TemplatingError;

    fn from_str(s: &str) -> Result<Self> {
        parse_path(s)
    }
}

/// Dotted source form of a list of steps.
pub fn join_steps(steps: &[PathStep]) -> String {
    steps
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Parse a complete tag including its braces.
pub fn parse_tag(text: &str) -> Result<TagPath> {
    let inner = text
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .ok_or_else(|| TemplatingError::syntax(0, SyntaxError::MissingBraces))?;
    if inner.starts_with(is_blank) {
        return Err(TemplatingError::syntax(1, SyntaxError::Unexpected(' ')));
    }
    if inner.ends_with(is_blank) {
        return Err(TemplatingError::syntax(inner.len(), SyntaxError::Unexpected(' ')));
    }
    parse_path_at(inner, 1)
}

/// Parse a bare path such as `user.dogs:1.name`.
pub fn parse_path(fragment: &str) -> Result<TagPath> {
    parse_path_at(fragment, 0)
}

/// Parse `text` strictly; reported offsets are shifted by `base`.
pub(crate) fn parse_path_at(text: &str, base: usize) -> Result<TagPath> {
    let mut cursor = Cursor::new(text);
    let mut steps = Vec::new();
    cursor.skip_blanks();
    loop {
        let step = cursor
            .step()
            .map_err(|(offset, kind)| TemplatingError::syntax(base + offset, kind))?;
        steps.push(step);
        cursor.skip_blanks();
        match cursor.peek() {
            Some('.') => {
                cursor.advance();
                cursor.skip_blanks();
            }
            Some(c) => {
                return Err(TemplatingError::syntax(
                    base + cursor.pos,
                    SyntaxError::Unexpected(c),
                ))
            }
            None => break,
        }
    }
    // The loop only exits after pushing at least one step.
    TagPath::from_steps(steps).ok_or_else(|| TemplatingError::syntax(base, SyntaxError::EmptyName))
}

/// Parse as many well-formed steps as possible, ignoring the malformed tail.
///
/// Used for partial input while a tag is being typed: `user.dogs:` yields
/// `[user, dogs]` and `user.` yields `[user]`.
pub fn parse_partial(fragment: &str) -> Vec<PathStep> {
    let mut cursor = Cursor::new(fragment.trim());
    let mut steps = Vec::new();
    loop {
        let name = cursor.name();
        if name.is_empty() {
            break;
        }
        let mut step = PathStep::new(name);
        cursor.skip_blanks();
        if cursor.peek() == Some(':') {
            cursor.advance();
            cursor.skip_blanks();
            match cursor.index() {
                Ok(index) => step.index = Some(index),
                Err(_) => {
                    steps.push(step);
                    break;
                }
            }
            cursor.skip_blanks();
        }
        steps.push(step);
        if cursor.peek() != Some('.') {
            break;
        }
        cursor.advance();
        cursor.skip_blanks();
    }
    steps
}

/// Byte-offset scanner over path text.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

type StepError = (usize, SyntaxError);

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let src = self.src;
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
        &src[start..self.pos]
    }

    fn skip_blanks(&mut self) {
        self.take_while(is_blank);
    }

    fn name(&mut self) -> &'a str {
        self.take_while(is_name_char)
    }

    fn step(&mut self) -> std::result::Result<PathStep, StepError> {
        let start = self.pos;
        let name = self.name();
        if name.is_empty() {
            return Err((start, SyntaxError::EmptyName));
        }
        let mut step = PathStep::new(name);
        self.skip_blanks();
        if self.peek() == Some(':') {
            self.advance();
            self.skip_blanks();
            step.index = Some(self.index()?);
        }
        Ok(step)
    }

    /// A 1-based index, returned 0-based.
    fn index(&mut self) -> std::result::Result<u32, StepError> {
        let start = self.pos;
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            let rest = self.take_while(|c| !is_blank(c) && c != '.' && c != '}');
            return Err(if rest.is_empty() {
                (start, SyntaxError::MissingIndex)
            } else {
                (start, SyntaxError::InvalidIndex(rest.to_string()))
            });
        }
        let value: u32 = digits
            .parse()
            .map_err(|_| (start, SyntaxError::InvalidIndex(digits.to_string())))?;
        value
            .checked_sub(1)
            .ok_or((start, SyntaxError::NonPositiveIndex))
    }
}

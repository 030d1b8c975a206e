//! Recursive-descent parser for composite names.
//!
//! Grammar:
//!
//! ```text
//! composite := sequence (SEPARATOR sequence)*
//! sequence  := (atom | bracketed)+
//! bracketed := OPEN composite CLOSE
//! atom      := any run of characters that are not brackets or separators
//! ```
//!
//! Separators are `・`, `·` and `＝`. Brackets are `<>`, `《》`, `「」`
//! and `『』`, and must close with their own kind.

use std::fmt;

use crate::error::SegmentError;

/// Bracket pairs recognized inside names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketKind {
    /// `<…>`
    Angle,
    /// `《…》`
    DoubleAngle,
    /// `「…」`
    Corner,
    /// `『…』`
    WhiteCorner,
}

impl BracketKind {
    const ALL: [Self; 4] = [Self::Angle, Self::DoubleAngle, Self::Corner, Self::WhiteCorner];

    /// Opening character.
    #[must_use]
    pub const fn open(self) -> char {
        match self {
            Self::Angle => '<',
            Self::DoubleAngle => '《',
            Self::Corner => '「',
            Self::WhiteCorner => '『',
        }
    }

    /// Closing character.
    #[must_use]
    pub const fn close(self) -> char {
        match self {
            Self::Angle => '>',
            Self::DoubleAngle => '》',
            Self::Corner => '」',
            Self::WhiteCorner => '』',
        }
    }

    fn from_open(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.open() == c)
    }

    fn is_close(c: char) -> bool {
        Self::ALL.iter().any(|k| k.close() == c)
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, '・' | '·' | '＝')
}

/// Parsed structure of a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameNode {
    /// Plain text.
    Atom(String),
    /// A bracketed part.
    Bracketed {
        /// Which brackets.
        kind: BracketKind,
        /// Content between the brackets.
        inner: Box<NameNode>,
    },
    /// Parts written next to each other, like `<黒>騎士`.
    Sequence(Vec<NameNode>),
    /// Parts joined by a separator, like `アリス・ベル`.
    Composite(Vec<NameNode>),
}

impl NameNode {
    /// Atom texts in reading order.
    #[must_use]
    pub fn atoms(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Atom(text) => out.push(text),
            Self::Bracketed { inner, .. } => inner.collect_atoms(out),
            Self::Sequence(parts) | Self::Composite(parts) => {
                for part in parts {
                    part.collect_atoms(out);
                }
            }
        }
    }

    /// Returns true if both trees have the same structure, ignoring atom text.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Atom(_), Self::Atom(_)) => true,
            (Self::Bracketed { kind: a, inner: x }, Self::Bracketed { kind: b, inner: y }) => {
                a == b && x.same_shape(y)
            }
            (Self::Sequence(xs), Self::Sequence(ys)) | (Self::Composite(xs), Self::Composite(ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| x.same_shape(y))
            }
            _ => false,
        }
    }
}

impl fmt::Display for NameNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(text) => f.write_str(text),
            Self::Bracketed { kind, inner } => write!(f, "{}{inner}{}", kind.open(), kind.close()),
            Self::Sequence(parts) => parts.iter().try_for_each(|p| write!(f, "{p}")),
            Self::Composite(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str("・")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}

/// Parses `name` into a [`NameNode`] tree.
///
/// # Errors
/// Returns `Unclosed` / `UnexpectedClose` for unbalanced or mismatched
/// brackets and `Empty` for an empty name, bracket or separated part.
///
/// # Examples
///
/// ```
/// use namebook::naming::{parse_name, NameNode};
///
/// let tree = parse_name("アリス・ベル").unwrap();
/// assert_eq!(tree.atoms(), vec!["アリス", "ベル"]);
/// assert!(matches!(tree, NameNode::Composite(_)));
/// ```
pub fn parse_name(name: &str) -> Result<NameNode, SegmentError> {
    let mut parser = Parser {
        chars: name.chars().collect(),
        pos: 0,
    };
    let node = parser.composite(None)?;
    if let Some(&c) = parser.chars.get(parser.pos) {
        return Err(SegmentError::UnexpectedClose {
            close: c,
            position: parser.pos,
        });
    }
    Ok(node)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Parses until end of input or the closer of `within`.
    fn composite(&mut self, within: Option<BracketKind>) -> Result<NameNode, SegmentError> {
        let mut parts = vec![self.sequence(within)?];
        while let Some(c) = self.peek() {
            if !is_separator(c) {
                break;
            }
            self.pos += 1;
            parts.push(self.sequence(within)?);
        }
        Ok(collapse(parts, NameNode::Composite))
    }

    fn sequence(&mut self, within: Option<BracketKind>) -> Result<NameNode, SegmentError> {
        let mut parts = Vec::new();
        while let Some(c) = self.peek() {
            if is_separator(c) {
                break;
            }
            if let Some(kind) = BracketKind::from_open(c) {
                parts.push(self.bracketed(kind)?);
            } else if BracketKind::is_close(c) {
                if within.is_some_and(|k| k.close() == c) {
                    break;
                }
                return Err(SegmentError::UnexpectedClose {
                    close: c,
                    position: self.pos,
                });
            } else {
                parts.push(self.atom());
            }
        }
        if parts.is_empty() {
            return Err(SegmentError::Empty);
        }
        Ok(collapse(parts, NameNode::Sequence))
    }

    fn bracketed(&mut self, kind: BracketKind) -> Result<NameNode, SegmentError> {
        let start = self.pos;
        self.pos += 1;
        let inner = self.composite(Some(kind))?;
        if self.peek() != Some(kind.close()) {
            return Err(SegmentError::Unclosed {
                open: kind.open(),
                position: start,
            });
        }
        self.pos += 1;
        Ok(NameNode::Bracketed {
            kind,
            inner: Box::new(inner),
        })
    }

    fn atom(&mut self) -> NameNode {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_separator(c) || BracketKind::from_open(c).is_some() || BracketKind::is_close(c) {
                break;
            }
            self.pos += 1;
        }
        NameNode::Atom(self.chars[start..self.pos].iter().collect())
    }
}

fn collapse(mut parts: Vec<NameNode>, wrap: fn(Vec<NameNode>) -> NameNode) -> NameNode {
    if parts.len() == 1 {
        parts.remove(0)
    } else {
        wrap(parts)
    }
}

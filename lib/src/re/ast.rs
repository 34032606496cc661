/*! Abstract syntax tree for regular expressions.

The [`Ast`] is produced by [`crate::re::parser::Parser`], simplified by
[`crate::re::optimizer`] and finally lowered into an
[`crate::re::optree::OpTree`] by the op-tree compiler.
 */

use std::fmt::{Display, Formatter};

#[cfg(feature = "ascii-tree")]
use ascii_tree::Tree::{Leaf, Node};

use crate::re::charclass::CharClass;

/// A node in the abstract syntax tree of a regular expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ast {
    /// A literal string. The empty literal matches the empty string.
    Literal(String),
    /// A sequence of nodes that must match one after the other.
    Sequence(Vec<Ast>),
    /// A list of alternatives, tried in order (`a|b|c`).
    Alternation(Vec<Ast>),
    /// Any character except the newline (`.`).
    AnyExceptNewline,
    /// Repetition of a node between `min` and `max` times. When `max` is
    /// [`None`] the number of repetitions is unbounded.
    Repeat { node: Box<Ast>, min: u32, max: Option<u32> },
    /// A capture group. Indexes start at 1, 0 is reserved for the whole
    /// match.
    Capture { index: u32, node: Box<Ast> },
    /// A back-reference to some capture group (`\1`).
    BackReference(u32),
    /// Start of the input (`^`).
    AssertStart,
    /// End of the input (`$`).
    AssertEnd,
    /// A character class (`[a-z]`, `[^0-9]`).
    CharacterClass(CharClass),
}

impl Ast {
    /// Creates a literal from a string.
    pub fn literal<S: Into<String>>(s: S) -> Ast {
        Ast::Literal(s.into())
    }

    /// Creates a [`Ast::Repeat`] node.
    pub fn repeat(node: Ast, min: u32, max: Option<u32>) -> Ast {
        Ast::Repeat { node: Box::new(node), min, max }
    }

    /// Creates a [`Ast::Capture`] node.
    pub fn capture(index: u32, node: Ast) -> Ast {
        Ast::Capture { index, node: Box::new(node) }
    }

    /// Returns true if the node can match the empty string at some position.
    ///
    /// This is a structural analysis, anchors and back-references are
    /// assumed to be able to match zero-width.
    pub fn can_match_zero_width(&self) -> bool {
        match self {
            Ast::BackReference(_) | Ast::AssertStart | Ast::AssertEnd => true,
            Ast::AnyExceptNewline | Ast::CharacterClass(_) => false,
            Ast::Literal(s) => s.is_empty(),
            Ast::Sequence(nodes) => nodes.iter().all(Ast::can_match_zero_width),
            Ast::Alternation(nodes) => {
                nodes.iter().any(Ast::can_match_zero_width)
            }
            Ast::Repeat { node, min, .. } => {
                *min == 0 || node.can_match_zero_width()
            }
            Ast::Capture { node, .. } => node.can_match_zero_width(),
        }
    }

    /// Returns true if every possible match of this node must start at the
    /// beginning of the input, like in `^foo` or `(^a|^b)`.
    pub fn is_anchored_at_start(&self) -> bool {
        match self {
            Ast::AssertStart => true,
            Ast::Sequence(nodes) => {
                nodes.first().is_some_and(Ast::is_anchored_at_start)
            }
            Ast::Alternation(nodes) => {
                !nodes.is_empty() && nodes.iter().all(Ast::is_anchored_at_start)
            }
            Ast::Repeat { node, min, .. } => {
                *min > 0 && node.is_anchored_at_start()
            }
            Ast::Capture { node, .. } => node.is_anchored_at_start(),
            _ => false,
        }
    }

    /// Returns the number of capture groups in the tree, not including the
    /// implicit group 0.
    pub fn num_captures(&self) -> u32 {
        match self {
            Ast::Sequence(nodes) | Ast::Alternation(nodes) => {
                nodes.iter().map(Ast::num_captures).sum()
            }
            Ast::Repeat { node, .. } => node.num_captures(),
            Ast::Capture { node, .. } => 1 + node.num_captures(),
            _ => 0,
        }
    }

    /// Returns a representation of the tree as an ASCII tree.
    #[cfg(feature = "ascii-tree")]
    pub fn ascii_tree(&self) -> ascii_tree::Tree {
        match self {
            Ast::Literal(s) => Leaf(vec![format!("literal {:?}", s)]),
            Ast::Sequence(nodes) => Node(
                "sequence".to_string(),
                nodes.iter().map(Ast::ascii_tree).collect(),
            ),
            Ast::Alternation(nodes) => Node(
                "alternation".to_string(),
                nodes.iter().map(Ast::ascii_tree).collect(),
            ),
            Ast::AnyExceptNewline => Leaf(vec!["any except newline".into()]),
            Ast::Repeat { node, min, max } => Node(
                match max {
                    Some(max) => format!("repeat {{{},{}}}", min, max),
                    None => format!("repeat {{{},}}", min),
                },
                vec![node.ascii_tree()],
            ),
            Ast::Capture { index, node } => {
                Node(format!("capture {}", index), vec![node.ascii_tree()])
            }
            Ast::BackReference(index) => {
                Leaf(vec![format!("back-reference {}", index)])
            }
            Ast::AssertStart => Leaf(vec!["assert start".into()]),
            Ast::AssertEnd => Leaf(vec!["assert end".into()]),
            Ast::CharacterClass(class) => {
                Leaf(vec![format!("class [{}]", class)])
            }
        }
    }
}

/// Renders the tree back into a pattern. Sequences and alternations are
/// wrapped in non-capturing groups, so the result is unambiguous though not
/// necessarily identical to the original pattern.
impl Display for Ast {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ast::Literal(s) => {
                for c in s.chars() {
                    write_literal_char(f, c)?;
                }
                Ok(())
            }
            Ast::Sequence(nodes) => {
                write!(f, "(?:")?;
                for (i, node) in nodes.iter().enumerate() {
                    // `\1` followed by `2` must not become `\12`.
                    let after_backref = i > 0
                        && matches!(nodes[i - 1], Ast::BackReference(_));
                    match node {
                        Ast::Literal(s)
                            if after_backref
                                && s.starts_with(|c: char| c.is_ascii_digit()) =>
                        {
                            write!(f, "(?:{})", node)?
                        }
                        _ => write!(f, "{}", node)?,
                    }
                }
                write!(f, ")")
            }
            Ast::Alternation(nodes) => {
                write!(f, "(?:")?;
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", node)?;
                }
                write!(f, ")")
            }
            Ast::AnyExceptNewline => write!(f, "."),
            Ast::Repeat { node, min, max } => {
                // A multi-character literal must be grouped, otherwise the
                // quantifier would apply to its last character only. Two
                // quantifiers in a row are not valid syntax either.
                match node.as_ref() {
                    Ast::Literal(s) if s.chars().count() != 1 => {
                        write!(f, "(?:{})", node)?
                    }
                    Ast::Repeat { .. } => write!(f, "(?:{})", node)?,
                    _ => write!(f, "{}", node)?,
                }
                match (min, max) {
                    (0, None) => write!(f, "*"),
                    (1, None) => write!(f, "+"),
                    (0, Some(1)) => write!(f, "?"),
                    (min, None) => write!(f, "{{{},}}", min),
                    (min, Some(max)) if min == max => write!(f, "{{{}}}", min),
                    (min, Some(max)) => write!(f, "{{{},{}}}", min, max),
                }
            }
            Ast::Capture { node, .. } => write!(f, "({})", node),
            Ast::BackReference(index) => write!(f, "\\{}", index),
            Ast::AssertStart => write!(f, "^"),
            Ast::AssertEnd => write!(f, "$"),
            Ast::CharacterClass(class) => write!(f, "[{}]", class),
        }
    }
}

fn write_literal_char(f: &mut Formatter<'_>, c: char) -> std::fmt::Result {
    match c {
        '$' | '^' | '*' | '(' | ')' | '+' | '[' | ']' | '{' | '}' | '|'
        | '\\' | '.' | '?' => write!(f, "\\{}", c),
        '\t' => write!(f, "\\t"),
        '\n' => write!(f, "\\n"),
        '\r' => write!(f, "\\r"),
        c if c.is_control() && (c as u32) < 256 => {
            write!(f, "\\{:03o}", c as u32)
        }
        c => write!(f, "{}", c),
    }
}

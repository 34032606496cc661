/*! The compiled form of a regular expression.

An [`OpTree`] is a graph of [`Op`]s stored in an arena and linked by their
[`OpId`]. Every op, except [`Op::Success`], has a `follower`: the op that
is executed when this one matches. Ops that represent a decision, like
[`Op::Alt`] and [`Op::Repeat`], have also an `alternative`: the op that is
executed if the follower path fails.

Despite its name the graph is not a tree. Unbounded repetitions are cycles
where the body of the repetition has the repetition itself as follower,
and many ops can share the same follower.

Each node also stores its `min_req`, the minimum number of bytes that must
remain in the input for the node, and all the nodes that follow it, to
have any chance of matching.
 */

use std::fmt::{Display, Formatter};
use std::ops::Index;

use crate::re::charclass::CharClass;
use crate::re::context::ContextKey;

pub mod compiler;


/// Identifies a node in an [`OpTree`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(u32);

impl OpId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Display for OpId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

/// An operation in an [`OpTree`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// The whole pattern matched.
    Success,
    /// Matches a literal string.
    Literal { literal: String, follower: OpId },
    /// Tries `follower` and, if it fails, `alternative`.
    Alt { follower: OpId, alternative: OpId },
    /// Same as [`Op::Alt`], but takes `alternative` without trying
    /// `follower` if the last iteration of the repetition identified by
    /// `key` started at the current position.
    Repeat { follower: OpId, alternative: OpId, key: ContextKey },
    /// Matches a character in the class.
    Class { class: CharClass, follower: OpId },
    /// Matches any character except `\n`.
    AnyExceptNewline { follower: OpId },
    /// Records the current position under `key`. Used at the start and
    /// the end of capture groups.
    CaptureMark { key: ContextKey, follower: OpId },
    /// Matches the text captured by the group identified by `key`.
    BackReference { key: ContextKey, follower: OpId },
    /// Matches at the start of the input.
    AssertStart { follower: OpId },
    /// Matches at the end of the input.
    AssertEnd { follower: OpId },
}

impl Op {
    /// Returns the follower of the op, if any.
    pub fn follower(&self) -> Option<OpId> {
        match self {
            Op::Success => None,
            Op::Literal { follower, .. }
            | Op::Alt { follower, .. }
            | Op::Repeat { follower, .. }
            | Op::Class { follower, .. }
            | Op::AnyExceptNewline { follower }
            | Op::CaptureMark { follower, .. }
            | Op::BackReference { follower, .. }
            | Op::AssertStart { follower }
            | Op::AssertEnd { follower } => Some(*follower),
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Success => write!(f, "SUCCESS"),
            Op::Literal { literal, follower } => {
                write!(f, "LIT {:?} -> {}", literal, follower)
            }
            Op::Alt { follower, alternative } => {
                write!(f, "ALT {} | {}", follower, alternative)
            }
            Op::Repeat { follower, alternative, key } => {
                write!(f, "REPEAT {} {} | {}", key, follower, alternative)
            }
            Op::Class { class, follower } => {
                write!(f, "CLASS [{}] -> {}", class, follower)
            }
            Op::AnyExceptNewline { follower } => {
                write!(f, "ANY -> {}", follower)
            }
            Op::CaptureMark { key, follower } => {
                write!(f, "MARK {} -> {}", key, follower)
            }
            Op::BackReference { key, follower } => {
                write!(f, "BACKREF {} -> {}", key, follower)
            }
            Op::AssertStart { follower } => write!(f, "START -> {}", follower),
            Op::AssertEnd { follower } => write!(f, "END -> {}", follower),
        }
    }
}

/// A node in an [`OpTree`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    op: Op,
    min_req: usize,
}

impl Node {
    #[inline]
    pub fn op(&self) -> &Op {
        &self.op
    }

    /// Minimum number of bytes required for this node and its followers
    /// to match.
    #[inline]
    pub fn min_req(&self) -> usize {
        self.min_req
    }
}

/// A compiled regular expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpTree {
    nodes: Vec<Node>,
    root: OpId,
    num_captures: u32,
    anchored: bool,
}

impl OpTree {
    /// The first node executed while matching.
    #[inline]
    pub fn root(&self) -> OpId {
        self.root
    }

    /// Number of capture groups, not including the group 0.
    #[inline]
    pub fn num_captures(&self) -> u32 {
        self.num_captures
    }

    /// True if the pattern can only match at the start of the input.
    #[inline]
    pub fn anchored(&self) -> bool {
        self.anchored
    }

    /// Minimum number of bytes that the input must have for the pattern
    /// to match.
    #[inline]
    pub fn min_req(&self) -> usize {
        self[self.root].min_req
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over the nodes and their identifiers.
    pub fn iter(&self) -> impl Iterator<Item = (OpId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (OpId(i as u32), node))
    }
}

impl Index<OpId> for OpTree {
    type Output = Node;

    #[inline]
    fn index(&self, id: OpId) -> &Self::Output {
        &self.nodes[id.as_usize()]
    }
}

/// Writes a listing with one node per line. The root is marked with `*`.
impl Display for OpTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (id, node) in self.iter() {
            let mark = if id == self.root { '*' } else { ' ' };
            writeln!(f, "{}{}: {} (min {})", mark, id, node.op, node.min_req)?;
        }
        Ok(())
    }
}

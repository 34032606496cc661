/*! Backtracking state shared by the matching engine and generated matchers.

A [`MatchContext`] is a view over a stack of [`Frame`]s. Each frame records
a position in the input associated to a [`ContextKey`]. Capture groups
push a frame when the group starts and another one, with the same key, when
the group ends. Unbounded repetitions whose body can match an empty string
push a frame each time the loop starts a new iteration, which allows
detecting iterations that don't make progress.

For instance, after matching `(b)` against `abc` starting at offset 1, the
stack looks like this:

```text
 index   key    pos
   0     c0     1     <- start of the match
   1     c1     1     <- start of group 1
   2     c1     2     <- end of group 1
   3     c0     2     <- end of the match
```

The stack is only ever written at the context's `top`, so frames below
`top` are never modified while the context is alive. Backtracking is just
a matter of moving `top` back to a previous value, the frames above it are
overwritten by subsequent pushes.
 */

use std::fmt::{Display, Formatter};

use crate::re::Error;

/// The kind of a [`ContextKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Start or end of a capture group.
    Capture,
    /// Entry position of an iteration in a repetition that can match an
    /// empty string.
    Repeat,
}

/// Identifies the frames in a [`MatchContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextKey {
    kind: KeyKind,
    index: u32,
}

impl ContextKey {
    /// Key for the capture group with the given index. Group 0 is the
    /// whole match.
    #[inline]
    pub const fn capture(index: u32) -> Self {
        Self { kind: KeyKind::Capture, index }
    }

    /// Key for the repetition with the given index.
    #[inline]
    pub const fn repeat(index: u32) -> Self {
        Self { kind: KeyKind::Repeat, index }
    }

    #[inline]
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl Display for ContextKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            KeyKind::Capture => write!(f, "c{}", self.index),
            KeyKind::Repeat => write!(f, "r{}", self.index),
        }
    }
}

/// A position in the input, associated to some key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub key: ContextKey,
    pub pos: usize,
}

/// State of a matching attempt.
pub struct MatchContext<'t, 's> {
    text: &'t str,
    stack: &'s mut Vec<Frame>,
    top: usize,
}

impl<'t, 's> MatchContext<'t, 's> {
    /// Creates an empty context for matching `text`. The stack is used as
    /// storage for frames, its current content is ignored.
    pub fn new(text: &'t str, stack: &'s mut Vec<Frame>) -> Self {
        Self { text, stack, top: 0 }
    }

    /// Creates a context that contains all the frames already in `stack`.
    pub fn with_stack(text: &'t str, stack: &'s mut Vec<Frame>) -> Self {
        let top = stack.len();
        Self { text, stack, top }
    }

    /// The text being matched.
    #[inline]
    pub fn text(&self) -> &'t str {
        self.text
    }

    /// Number of frames in the context.
    #[inline]
    pub fn top(&self) -> usize {
        self.top
    }

    /// Frames in the context, from the oldest to the newest.
    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.stack[..self.top]
    }

    /// Pushes a new frame.
    #[inline]
    pub fn push(&mut self, key: ContextKey, pos: usize) {
        let frame = Frame { key, pos };
        if self.top < self.stack.len() {
            self.stack[self.top] = frame;
        } else {
            self.stack.push(frame);
        }
        self.top += 1;
    }

    /// Discards all the frames pushed after the context had `top` frames.
    ///
    /// # Panics
    ///
    /// If `top` is greater than the current number of frames.
    #[inline]
    pub fn backtrack(&mut self, top: usize) {
        assert!(top <= self.top);
        self.top = top;
    }

    /// Returns a context that shares the frames of this one. Frames pushed
    /// to the returned context are not visible to this one.
    pub fn fork(&mut self) -> MatchContext<'t, '_> {
        MatchContext { text: self.text, stack: &mut *self.stack, top: self.top }
    }

    /// Returns the position in the most recent frame with the given key.
    pub fn find(&self, key: ContextKey) -> Option<usize> {
        self.frames().iter().rev().find(|frame| frame.key == key).map(|f| f.pos)
    }

    /// Returns the start and end of the most recent span captured by group
    /// `index`, or [`None`] if the group didn't participate in the match.
    ///
    /// # Panics
    ///
    /// If the end of the group is found but not its start. This can't
    /// happen with contexts built by the matching engine.
    pub fn captured(&self, index: u32) -> Option<(usize, usize)> {
        let key = ContextKey::capture(index);
        let mut frames =
            self.frames().iter().rev().filter(|frame| frame.key == key);

        let end = frames.next()?.pos;

        match frames.next() {
            Some(start) => Some((start.pos, end)),
            None => panic!("{}", Error::UndeterminedCapture(index)),
        }
    }

    /// Same as [`MatchContext::captured`], but returns the captured text.
    pub fn captured_str(&self, index: u32) -> Option<&'t str> {
        self.captured(index).map(|(start, end)| &self.text[start..end])
    }
}

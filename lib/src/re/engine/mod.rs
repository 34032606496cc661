/*! Backtracking execution of an [`OpTree`].

The engine walks the op tree starting at some node, following the
`follower` link of each op that matches. Decision points ([`Op::Alt`] and
[`Op::Repeat`]) take their follower first and save a [`Choice`] that
describes how to resume the search with their alternative. When an op
doesn't match, the engine backtracks to the most recent choice, discarding
the context frames pushed after it was saved.

Choices are kept in an explicit stack instead of the native call stack, so
the depth of the search is not limited by the stack size of the thread.

When speculation is enabled, some decision points run their follower and
their alternative in parallel, see [`speculative`].
 */

use crate::re::context::{ContextKey, MatchContext};
use crate::re::optree::{Op, OpId, OpTree};
use crate::re::pool::CHOICES;

use self::speculative::{Cancel, Fork, WorkerClaim, WORKERS};

pub mod speculative;


/// Default value for [`Engine::speculation_threshold`].
pub const DEFAULT_SPECULATION_THRESHOLD: usize = 64;

/// How to pick a result when more than one path can succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    /// Any successful path is fine. Used when only the fact that there's a
    /// match matters.
    Any,
    /// The successful path must be the one that sequential backtracking
    /// would find first. Used when the spans of the match are needed.
    Sequential,
}

/// A decision point where the search can be resumed.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Choice {
    /// Op where the search continues.
    op: OpId,
    /// Position in the input.
    pos: usize,
    /// Number of frames in the context when the choice was saved.
    top: usize,
}

/// Executes an [`OpTree`].
pub struct Engine<'r> {
    tree: &'r OpTree,
    speculative: bool,
    speculation_threshold: usize,
}

impl<'r> Engine<'r> {
    pub fn new(tree: &'r OpTree) -> Self {
        Self {
            tree,
            speculative: false,
            speculation_threshold: DEFAULT_SPECULATION_THRESHOLD,
        }
    }

    /// Enables or disables speculative evaluation of alternatives.
    pub fn speculative(mut self, yes: bool) -> Self {
        self.speculative = yes;
        self
    }

    /// Decision points where fewer than `n` bytes remain in the input are
    /// never evaluated speculatively.
    pub fn speculation_threshold(mut self, n: usize) -> Self {
        self.speculation_threshold = n;
        self
    }

    /// Tries to match the tree at position `pos` of the context's text.
    ///
    /// When the match succeeds the end of the match is pushed to the context
    /// with key `c0`, `hook` is called with the resulting context, and its
    /// result is returned. The context is expected to contain the start of
    /// the match already.
    pub fn exec<T, F>(
        &self,
        ctx: &mut MatchContext<'_, '_>,
        pos: usize,
        priority: Priority,
        hook: &F,
    ) -> Option<T>
    where
        F: Fn(&MatchContext<'_, '_>) -> T + Sync,
        T: Send,
    {
        let cancel = Cancel::new();
        self.run(ctx, self.tree.root(), pos, priority, hook, &cancel)
    }

    fn run<T, F>(
        &self,
        ctx: &mut MatchContext<'_, '_>,
        mut op: OpId,
        mut pos: usize,
        priority: Priority,
        hook: &F,
        cancel: &Cancel<'_>,
    ) -> Option<T>
    where
        F: Fn(&MatchContext<'_, '_>) -> T + Sync,
        T: Send,
    {
        let text = ctx.text();
        let mut choices = CHOICES.get();

        loop {
            let node = &self.tree[op];
            let remaining = text.len() - pos;

            let next = match node.op() {
                Op::Success => {
                    ctx.push(ContextKey::capture(0), pos);
                    return Some(hook(&*ctx));
                }
                Op::Literal { literal, follower } => {
                    if remaining >= node.min_req()
                        && text.as_bytes()[pos..].starts_with(literal.as_bytes())
                    {
                        Some((*follower, pos + literal.len()))
                    } else {
                        None
                    }
                }
                Op::Class { class, follower } => {
                    match next_char(text, pos, remaining, node.min_req()) {
                        Some(c) if class.contains(c) => {
                            Some((*follower, pos + c.len_utf8()))
                        }
                        _ => None,
                    }
                }
                Op::AnyExceptNewline { follower } => {
                    match next_char(text, pos, remaining, node.min_req()) {
                        Some(c) if c != '\n' => {
                            Some((*follower, pos + c.len_utf8()))
                        }
                        _ => None,
                    }
                }
                Op::Alt { follower, alternative } => {
                    if remaining < node.min_req() {
                        None
                    } else if cancel.is_cancelled() {
                        return None;
                    } else if let Some(worker) = self.claim_worker(remaining, cancel)
                    {
                        let fork = Fork {
                            follower: *follower,
                            alternative: *alternative,
                            pos,
                            alternative_top: ctx.top(),
                        };
                        let result = self
                            .speculate(ctx, fork, priority, hook, cancel, worker);
                        if result.is_some() {
                            return result;
                        }
                        None
                    } else {
                        choices.push(Choice {
                            op: *alternative,
                            pos,
                            top: ctx.top(),
                        });
                        Some((*follower, pos))
                    }
                }
                Op::Repeat { follower, alternative, key } => {
                    if remaining < node.min_req() {
                        None
                    } else if cancel.is_cancelled() {
                        return None;
                    } else if ctx.find(*key) == Some(pos) {
                        // The last iteration didn't consume anything, doing
                        // another one would loop forever.
                        Some((*alternative, pos))
                    } else {
                        let top = ctx.top();
                        ctx.push(*key, pos);
                        if let Some(worker) = self.claim_worker(remaining, cancel)
                        {
                            let fork = Fork {
                                follower: *follower,
                                alternative: *alternative,
                                pos,
                                alternative_top: top,
                            };
                            let result = self.speculate(
                                ctx, fork, priority, hook, cancel, worker,
                            );
                            if result.is_some() {
                                return result;
                            }
                            None
                        } else {
                            choices.push(Choice { op: *alternative, pos, top });
                            Some((*follower, pos))
                        }
                    }
                }
                Op::CaptureMark { key, follower } => {
                    ctx.push(*key, pos);
                    Some((*follower, pos))
                }
                Op::BackReference { key, follower } => {
                    match ctx.captured(key.index()) {
                        Some((start, end))
                            if text.as_bytes()[pos..]
                                .starts_with(&text.as_bytes()[start..end]) =>
                        {
                            Some((*follower, pos + end - start))
                        }
                        _ => None,
                    }
                }
                Op::AssertStart { follower } => {
                    (pos == 0).then_some((*follower, pos))
                }
                Op::AssertEnd { follower } => {
                    (pos == text.len()).then_some((*follower, pos))
                }
            };

            match next {
                Some((next_op, next_pos)) => {
                    op = next_op;
                    pos = next_pos;
                }
                None => {
                    let choice = choices.pop()?;
                    ctx.backtrack(choice.top);
                    op = choice.op;
                    pos = choice.pos;
                }
            }
        }
    }

    /// Claims an idle worker for evaluating an alternative speculatively,
    /// if speculation is enabled and makes sense at this point.
    fn claim_worker(
        &self,
        remaining: usize,
        cancel: &Cancel<'_>,
    ) -> Option<WorkerClaim<'static>> {
        if !self.speculative
            || remaining < self.speculation_threshold
            || cancel.depth() >= speculative::MAX_DEPTH
        {
            return None;
        }
        WORKERS.as_ref()?.claim()
    }
}

/// Returns the character at `pos`, if at least `min_req` bytes remain.
#[inline]
fn next_char(
    text: &str,
    pos: usize,
    remaining: usize,
    min_req: usize,
) -> Option<char> {
    if remaining < min_req {
        return None;
    }
    text.get(pos..)?.chars().next()
}

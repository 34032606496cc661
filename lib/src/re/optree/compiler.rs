/*! Lowers an [`Ast`] into an [`OpTree`].

The compiler works backwards: each AST node is compiled knowing the
[`OpId`] of the op that must follow it, which means that nodes in a
sequence are compiled from last to first. This way the `min_req` of each
new op can be computed from the `min_req` of its follower, which already
exists.

Unbounded repetitions produce cycles. The op that decides whether to do
one more iteration is created first, with a provisional follower, then the
body of the repetition is compiled using that op as its follower, and
finally the provisional follower is replaced with the start of the body.
 */

use log::*;

use crate::re::ast::Ast;
use crate::re::context::ContextKey;
use crate::re::optree::{Node, Op, OpId, OpTree};
use crate::re::{Error, MAX_OPS};

/// Compiles an [`Ast`] into an [`OpTree`].
pub struct Compiler {
    nodes: Vec<Node>,
    max_ops: usize,
    /// Number of repetitions that needed a key for detecting iterations
    /// that don't make progress.
    repeats: u32,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), max_ops: MAX_OPS, repeats: 0 }
    }

    /// Maximum number of nodes in the resulting [`OpTree`]. If the tree
    /// needs more nodes, [`Compiler::compile`] fails with
    /// [`Error::TooLarge`]. The default value is [`MAX_OPS`].
    pub fn max_ops(mut self, n: usize) -> Self {
        self.max_ops = n;
        self
    }

    /// Compiles the given AST.
    pub fn compile(mut self, ast: &Ast) -> Result<OpTree, Error> {
        let success = self.emit(Op::Success, 0)?;
        let root = self.compile_node(ast, success)?;

        let anchored = matches!(self.op(root), Op::AssertStart { .. })
            || ast.is_anchored_at_start();

        let tree = OpTree {
            nodes: self.nodes,
            root,
            num_captures: ast.num_captures(),
            anchored,
        };

        debug!(
            "compiled regexp `{}`: {} ops, min_req: {}, anchored: {}",
            ast,
            tree.len(),
            tree.min_req(),
            tree.anchored
        );

        Ok(tree)
    }

    fn compile_node(
        &mut self,
        ast: &Ast,
        follower: OpId,
    ) -> Result<OpId, Error> {
        let follower_min = self.min_req(follower);

        match ast {
            Ast::Literal(literal) if literal.is_empty() => Ok(follower),
            Ast::Literal(literal) => self.emit(
                Op::Literal { literal: literal.clone(), follower },
                follower_min + literal.len(),
            ),
            Ast::Sequence(items) => items
                .iter()
                .rev()
                .try_fold(follower, |f, item| self.compile_node(item, f)),
            Ast::Alternation(options) => {
                self.compile_alternation(options, follower)
            }
            Ast::AnyExceptNewline => self
                .emit(Op::AnyExceptNewline { follower }, follower_min + 1),
            Ast::CharacterClass(class) => self.emit(
                Op::Class { class: class.clone(), follower },
                follower_min + 1,
            ),
            Ast::Repeat { node, min, max } => {
                self.compile_repeat(node, *min, *max, follower)
            }
            Ast::Capture { index, node } => {
                let key = ContextKey::capture(*index);
                let end = self
                    .emit(Op::CaptureMark { key, follower }, follower_min)?;
                let body = self.compile_node(node, end)?;
                self.emit(
                    Op::CaptureMark { key, follower: body },
                    self.min_req(body),
                )
            }
            Ast::BackReference(index) => self.emit(
                Op::BackReference { key: ContextKey::capture(*index), follower },
                follower_min,
            ),
            Ast::AssertStart => {
                self.emit(Op::AssertStart { follower }, follower_min)
            }
            Ast::AssertEnd => self.emit(Op::AssertEnd { follower }, follower_min),
        }
    }

    /// Compiles each option with the same follower, and chains them with
    /// [`Op::Alt`] nodes so that they are tried from left to right.
    fn compile_alternation(
        &mut self,
        options: &[Ast],
        follower: OpId,
    ) -> Result<OpId, Error> {
        let mut compiled = Vec::with_capacity(options.len());

        for option in options {
            compiled.push(self.compile_node(option, follower)?);
        }

        let mut compiled = compiled.into_iter().rev();

        // An alternation without options matches nothing but the empty
        // string.
        let Some(mut alternative) = compiled.next() else {
            return Ok(follower);
        };

        for option in compiled {
            alternative = self.emit_alt(option, alternative)?;
        }

        Ok(alternative)
    }

    fn compile_repeat(
        &mut self,
        node: &Ast,
        min: u32,
        max: Option<u32>,
        follower: OpId,
    ) -> Result<OpId, Error> {
        // Optional repetitions go after the mandatory ones, so they are
        // compiled first.
        let mut next = match max {
            None => self.compile_loop(node, follower)?,
            Some(max) => {
                // `x{0,3}` is compiled as `(?:x(?:x(?:x)?)?)?`, where
                // giving up at any level continues with `follower`.
                let mut next = follower;
                for _ in min..max {
                    let one_more = self.compile_node(node, next)?;
                    // The body emitted nothing, repeating it changes
                    // nothing either.
                    if one_more == next {
                        break;
                    }
                    next = self.emit_alt(one_more, follower)?;
                }
                next
            }
        };

        for _ in 0..min {
            let body = self.compile_node(node, next)?;
            if body == next {
                break;
            }
            next = body;
        }

        Ok(next)
    }

    /// Compiles `node*`.
    fn compile_loop(
        &mut self,
        node: &Ast,
        follower: OpId,
    ) -> Result<OpId, Error> {
        // If the body can match an empty string the loop must check that
        // each iteration makes some progress, otherwise it could loop
        // forever. This requires an `Op::Repeat` with its own key.
        let op = if node.can_match_zero_width() {
            self.repeats += 1;
            Op::Repeat {
                follower,
                alternative: follower,
                key: ContextKey::repeat(self.repeats),
            }
        } else {
            Op::Alt { follower, alternative: follower }
        };

        // Exiting the loop right away is always possible, so the loop
        // requires the same as its follower.
        let id = self.emit(op, self.min_req(follower))?;
        let body = self.compile_node(node, id)?;

        match &mut self.nodes[id.as_usize()].op {
            Op::Alt { follower, .. } | Op::Repeat { follower, .. } => {
                *follower = body
            }
            _ => unreachable!(),
        }

        Ok(id)
    }

    fn emit_alt(
        &mut self,
        follower: OpId,
        alternative: OpId,
    ) -> Result<OpId, Error> {
        let min_req = self.min_req(follower).min(self.min_req(alternative));
        self.emit(Op::Alt { follower, alternative }, min_req)
    }

    fn emit(&mut self, op: Op, min_req: usize) -> Result<OpId, Error> {
        if self.nodes.len() >= self.max_ops {
            return Err(Error::TooLarge);
        }
        let id = OpId(self.nodes.len() as u32);
        self.nodes.push(Node { op, min_req });
        Ok(id)
    }

    #[inline]
    fn op(&self, id: OpId) -> &Op {
        &self.nodes[id.as_usize()].op
    }

    #[inline]
    fn min_req(&self, id: OpId) -> usize {
        self.nodes[id.as_usize()].min_req
    }
}

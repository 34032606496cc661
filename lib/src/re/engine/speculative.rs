/*! Speculative evaluation of decision points.

When speculation is enabled and a worker thread is idle, a decision point
doesn't wait for its follower to fail before trying its alternative. The
follower is evaluated in the current thread while the alternative is
handed to a worker, and the first one that succeeds cancels the other.

The alternative can't share the context's stack with the follower, as both
sides push frames at the same time. Instead, it receives a private copy of
the frames that existed at the decision point, taken from the pool of
frame stacks.

The result is the same as with sequential backtracking when the priority
is [`Priority::Sequential`]: a success of the follower cancels the
alternative, but a success of the alternative doesn't cancel the
follower, and the follower's result is preferred if both succeed. With
[`Priority::Any`] any side that succeeds cancels the other one.

Cancellation is cooperative: each branch checks its cancellation flag, and
the flags of all the branches it descends from, at every decision point.
The alternative is spawned in a [`rayon::ThreadPool::in_place_scope`]
while the follower keeps running in the calling thread, and the scope
doesn't return until both of them have finished.
 */

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use lazy_static::lazy_static;
use log::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::re::context::MatchContext;
use crate::re::engine::{Engine, Priority};
use crate::re::optree::OpId;
use crate::re::pool::FRAMES;

/// Maximum number of nested speculations in a single search.
pub const MAX_DEPTH: usize = 32;

lazy_static! {
    /// Worker threads used for speculation. [`None`] if the machine has a
    /// single processor or the threads couldn't be started.
    pub(crate) static ref WORKERS: Option<Workers> = Workers::start();
}

/// A pool of threads that run speculative branches.
pub(crate) struct Workers {
    pool: ThreadPool,
    /// Number of threads that are not running a speculative branch.
    idle: AtomicUsize,
}

impl Workers {
    fn start() -> Option<Self> {
        let threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .saturating_sub(1);

        if threads == 0 {
            warn!("only one processor available, speculation is disabled");
            return None;
        }

        let pool = match ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("yarex-worker-{}", i))
            .build()
        {
            Ok(pool) => pool,
            Err(err) => {
                warn!("can't start workers, speculation is disabled: {}", err);
                return None;
            }
        };

        info!("started {} worker threads for speculative matching", threads);

        Some(Self { pool, idle: AtomicUsize::new(threads) })
    }

    /// Claims an idle worker. Returns [`None`] if all the workers are busy.
    pub fn claim(&self) -> Option<WorkerClaim<'_>> {
        self.idle
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                n.checked_sub(1)
            })
            .ok()
            .map(|_| WorkerClaim { workers: self })
    }
}

/// A worker claimed by [`Workers::claim`], released when dropped.
pub(crate) struct WorkerClaim<'a> {
    workers: &'a Workers,
}

impl Drop for WorkerClaim<'_> {
    fn drop(&mut self) {
        self.workers.idle.fetch_add(1, Ordering::Release);
    }
}

/// A cancellation flag linked to the flags of the enclosing branches.
pub(crate) struct Cancel<'a> {
    flag: AtomicBool,
    parent: Option<&'a Cancel<'a>>,
    depth: usize,
}

impl Cancel<'static> {
    /// Creates the flag for a search that is not nested in any branch.
    pub fn new() -> Self {
        Self { flag: AtomicBool::new(false), parent: None, depth: 0 }
    }
}

impl Default for Cancel<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancel<'_> {
    /// Creates the flag for a branch nested in this one.
    pub fn child(&self) -> Cancel<'_> {
        Cancel {
            flag: AtomicBool::new(false),
            parent: Some(self),
            depth: self.depth + 1,
        }
    }

    /// Cancels this branch and all the branches nested in it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// True if this branch or any of the enclosing ones was cancelled.
    pub fn is_cancelled(&self) -> bool {
        let mut current = Some(self);
        while let Some(cancel) = current {
            if cancel.flag.load(Ordering::Acquire) {
                return true;
            }
            current = cancel.parent;
        }
        false
    }

    /// Number of enclosing branches.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// The two branches of a decision point.
pub(crate) struct Fork {
    pub follower: OpId,
    pub alternative: OpId,
    /// Position in the input where both branches start.
    pub pos: usize,
    /// Number of frames in the context when the decision was taken. The
    /// alternative doesn't see the frames above this one.
    pub alternative_top: usize,
}

impl Engine<'_> {
    /// Evaluates both branches of `fork` in parallel and returns the result
    /// of the one that wins according to `priority`.
    pub(super) fn speculate<T, F>(
        &self,
        ctx: &mut MatchContext<'_, '_>,
        fork: Fork,
        priority: Priority,
        hook: &F,
        cancel: &Cancel<'_>,
        worker: WorkerClaim<'static>,
    ) -> Option<T>
    where
        F: Fn(&MatchContext<'_, '_>) -> T + Sync,
        T: Send,
    {
        let workers = worker.workers;
        let text = ctx.text();
        let follower_cancel = cancel.child();
        let alternative_cancel = cancel.child();

        let mut alternative_stack = FRAMES.get();
        alternative_stack
            .extend_from_slice(&ctx.frames()[..fork.alternative_top]);

        let mut alternative = None;

        // The follower runs in the current thread while the alternative is
        // spawned into the pool. The scope doesn't end until the spawned
        // alternative has finished.
        let follower = workers.pool.in_place_scope(|scope| {
            scope.spawn(|_| {
                let _worker = worker;
                let mut ctx =
                    MatchContext::with_stack(text, &mut alternative_stack);
                let result = self.run(
                    &mut ctx,
                    fork.alternative,
                    fork.pos,
                    priority,
                    hook,
                    &alternative_cancel,
                );
                if result.is_some() && priority == Priority::Any {
                    follower_cancel.cancel();
                }
                alternative = result;
            });

            let result = self.run(
                &mut ctx.fork(),
                fork.follower,
                fork.pos,
                priority,
                hook,
                &follower_cancel,
            );
            if result.is_some() {
                alternative_cancel.cancel();
            }
            result
        });

        follower.or(alternative)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    use pretty_assertions::assert_eq;

    use super::{Cancel, Fork, Workers};
    use crate::re::context::{ContextKey, MatchContext};
    use crate::re::engine::{Engine, Priority};
    use crate::re::optimizer::optimize;
    use crate::re::optree::compiler::Compiler;
    use crate::re::optree::Op;
    use crate::re::parser::Parser;

    #[test]
    fn cancellation_chain() {
        let root = Cancel::new();
        let child = root.child();
        let grandchild = child.child();
        let sibling = root.child();

        assert_eq!(grandchild.depth(), 2);
        assert!(!grandchild.is_cancelled());

        child.cancel();

        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
        assert!(!sibling.is_cancelled());
        assert!(!root.is_cancelled());

        root.cancel();
        assert!(sibling.is_cancelled());
    }

    #[test]
    fn claims() {
        let workers = Workers {
            pool: rayon::ThreadPoolBuilder::new()
                .num_threads(2)
                .build()
                .unwrap(),
            idle: AtomicUsize::new(2),
        };

        let first = workers.claim();
        let second = workers.claim();

        assert!(first.is_some());
        assert!(second.is_some());
        assert!(workers.claim().is_none());

        drop(first);
        assert!(workers.claim().is_some());
    }

    #[test]
    fn follower_runs_in_calling_thread() {
        let workers: &'static Workers = Box::leak(Box::new(Workers {
            pool: rayon::ThreadPoolBuilder::new()
                .num_threads(1)
                .build()
                .unwrap(),
            idle: AtomicUsize::new(1),
        }));

        let ast = optimize(Parser::new().parse("x|y").unwrap());
        let tree = Compiler::new().compile(&ast).unwrap();
        let engine = Engine::new(&tree);

        let Op::Alt { follower, alternative } = tree[tree.root()].op() else {
            panic!("root is not an alternation");
        };

        let run = |text: &str| {
            let mut stack = Vec::new();
            let mut ctx = MatchContext::new(text, &mut stack);
            ctx.push(ContextKey::capture(0), 0);
            let fork = Fork {
                follower: *follower,
                alternative: *alternative,
                pos: 0,
                alternative_top: ctx.top(),
            };
            engine.speculate(
                &mut ctx,
                fork,
                Priority::Sequential,
                &|_: &MatchContext<'_, '_>| thread::current().id(),
                &Cancel::new(),
                workers.claim().unwrap(),
            )
        };

        // `x` is matched by the follower, `y` by the alternative.
        assert_eq!(run("x"), Some(thread::current().id()));
        assert!(run("y").is_some_and(|id| id != thread::current().id()));
        assert_eq!(run("z"), None);

        // The claims were released.
        assert!(workers.claim().is_some());
    }
}

use std::fmt::{Display, Formatter};
use std::ops::Range;

use crate::codegen::CompiledRegexp;
use crate::config::Config;
use crate::re::context::{ContextKey, MatchContext};
use crate::re::engine::{Engine, Priority};
use crate::re::optimizer::optimize;
use crate::re::optree::compiler::Compiler;
use crate::re::optree::OpTree;
use crate::re::parser::Parser;
use crate::re::pool::FRAMES;
use crate::re::Error;

/// A compiled regular expression.
///
/// A `Regexp` can be shared among threads, and used by many of them at the
/// same time.
///
/// ```
/// let re = yarex::Regexp::new(r"(hoge)\1fuga").unwrap();
///
/// assert!(re.is_match("AAAhogehogefugaBBB"));
/// assert!(!re.is_match("hogefuga"));
/// assert_eq!(re.find_string_index("AAAhogehogefugaBBB"), Some((3, 15)));
/// ```
pub struct Regexp {
    pattern: String,
    backend: Backend,
    speculative: bool,
    speculation_threshold: usize,
}

/// The code that actually executes the pattern.
enum Backend {
    /// An op tree compiled at run time.
    Runtime(OpTree),
    /// A function generated with [`crate::codegen::RustGenerator`].
    Precompiled(&'static CompiledRegexp),
}

impl Regexp {
    /// Compiles a regular expression with the default configuration.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        Self::with_config(pattern, &Config::default())
    }

    /// Compiles a regular expression with the given configuration.
    pub fn with_config(pattern: &str, config: &Config) -> Result<Self, Error> {
        let precompiled = if config.engine.use_precompiled {
            CompiledRegexp::lookup(pattern)
        } else {
            None
        };

        let backend = match precompiled {
            Some(compiled) => Backend::Precompiled(compiled),
            None => {
                let ast = optimize(Parser::new().parse(pattern)?);
                Backend::Runtime(Compiler::new().compile(&ast)?)
            }
        };

        Ok(Self {
            pattern: pattern.to_owned(),
            backend,
            speculative: config.engine.speculative,
            speculation_threshold: config.engine.speculation_threshold,
        })
    }

    /// Returns the pattern.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Number of capture groups in the pattern, not including the group 0
    /// that corresponds to the whole match.
    pub fn num_captures(&self) -> u32 {
        match &self.backend {
            Backend::Runtime(tree) => tree.num_captures(),
            Backend::Precompiled(compiled) => compiled.num_captures,
        }
    }

    /// True if the pattern can only match at the start of the input.
    pub fn is_anchored(&self) -> bool {
        match &self.backend {
            Backend::Runtime(tree) => tree.anchored(),
            Backend::Precompiled(compiled) => compiled.anchored,
        }
    }

    /// Minimum length, in bytes, of the strings matched by the pattern.
    pub fn min_len(&self) -> usize {
        match &self.backend {
            Backend::Runtime(tree) => tree.min_req(),
            Backend::Precompiled(compiled) => compiled.min_req,
        }
    }

    /// True if the pattern is executed by a precompiled function instead of
    /// being compiled at run time.
    pub fn is_precompiled(&self) -> bool {
        matches!(self.backend, Backend::Precompiled(_))
    }

    /// The compiled op tree, or [`None`] if the pattern is precompiled.
    pub fn op_tree(&self) -> Option<&OpTree> {
        match &self.backend {
            Backend::Runtime(tree) => Some(tree),
            Backend::Precompiled(_) => None,
        }
    }

    /// True if the pattern matches somewhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.search(text, Priority::Any, |_| ()).is_some()
    }

    /// Returns the leftmost match in `text`.
    pub fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        let (start, end) = self.search(text, Priority::Sequential, |ctx| {
            ctx.captured(0)
        })??;

        Some(Match { text, start, end })
    }

    /// Returns the text of the leftmost match, or an empty string if there
    /// is no match. Use [`Regexp::find`] for telling apart an empty match
    /// from no match at all.
    pub fn find_string<'t>(&self, text: &'t str) -> &'t str {
        self.find(text).map(|m| m.as_str()).unwrap_or_default()
    }

    /// Returns the start and end of the leftmost match, in bytes.
    pub fn find_string_index(&self, text: &str) -> Option<(usize, usize)> {
        self.find(text).map(|m| (m.start(), m.end()))
    }

    /// Returns the spans of all the capture groups for the leftmost match.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        let num_captures = self.num_captures();
        let spans = self.search(text, Priority::Sequential, |ctx| {
            (0..=num_captures).map(|i| ctx.captured(i)).collect::<Vec<_>>()
        })?;

        Some(Captures { text, spans })
    }

    /// Tries every possible start position, from left to right, and returns
    /// the result of `hook` for the first one where the pattern matches.
    fn search<T, F>(&self, text: &str, priority: Priority, hook: F) -> Option<T>
    where
        F: Fn(&MatchContext<'_, '_>) -> T + Sync,
        T: Send,
    {
        let min_len = self.min_len();

        if text.len() < min_len {
            return None;
        }

        // An anchored pattern can't match anywhere but at the start.
        let last = if self.is_anchored() { 0 } else { text.len() - min_len };

        let mut stack = FRAMES.get();

        for start in (0..=last).filter(|i| text.is_char_boundary(*i)) {
            let mut ctx = MatchContext::new(text, &mut stack);
            ctx.push(ContextKey::capture(0), start);

            let result = match &self.backend {
                Backend::Runtime(tree) => Engine::new(tree)
                    .speculative(self.speculative)
                    .speculation_threshold(self.speculation_threshold)
                    .exec(&mut ctx, start, priority, &hook),
                Backend::Precompiled(compiled) => {
                    let mut result = None;
                    (compiled.exec)(
                        &mut ctx,
                        compiled.entry,
                        start,
                        &mut |ctx: &MatchContext<'_, '_>| {
                            result = Some(hook(ctx))
                        },
                    );
                    result
                }
            };

            if result.is_some() {
                return result;
            }
        }

        None
    }
}

impl Display for Regexp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl std::fmt::Debug for Regexp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Regexp")
            .field("pattern", &self.pattern)
            .field("precompiled", &self.is_precompiled())
            .finish()
    }
}

/// A match found by [`Regexp::find`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t str,
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    /// Offset where the match starts.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Offset where the match ends.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The matched text.
    #[inline]
    pub fn as_str(&self) -> &'t str {
        &self.text[self.range()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The capture groups of a match found by [`Regexp::captures`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Captures<'t> {
    text: &'t str,
    spans: Vec<Option<(usize, usize)>>,
}

impl<'t> Captures<'t> {
    /// Returns the capture group `i`, where group 0 is the whole match.
    /// Returns [`None`] if the group doesn't exist or didn't participate in
    /// the match.
    pub fn get(&self, i: usize) -> Option<Match<'t>> {
        let (start, end) = (*self.spans.get(i)?)?;
        Some(Match { text: self.text, start, end })
    }

    /// The span of each group, group 0 first.
    pub fn spans(&self) -> &[Option<(usize, usize)>] {
        self.spans.as_slice()
    }

    /// Number of groups, including the group 0.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Always false, as there's at least the group 0.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Iterates over all the groups.
    pub fn iter(&self) -> impl Iterator<Item = Option<Match<'t>>> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}

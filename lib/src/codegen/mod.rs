/*! Generation of Rust code for precompiled regular expressions.

Compiling a pattern at run time is cheap, but executing its [`OpTree`] with
the generic [`Engine`](crate::re::engine::Engine) means paying for a
dispatch on every op. [`RustGenerator`] turns op trees into Rust functions
where each op is a `match` arm with its operands inlined, including the
membership tests for character classes.

The generated source must be included in some crate that is linked
together with `yarex`. Each function is registered in the
[`COMPILED_REGEXPS`] distributed slice, and [`Regexp::new`] looks the
pattern up in that slice before compiling it.

```text
yrx gen src/precompiled.rs -p '(hoge)\1fuga' -p 'fo*oh'
```

[`Regexp::new`]: crate::Regexp::new
 */

use std::collections::HashSet;
use std::io;

use linkme::distributed_slice;
use log::*;

use crate::re::charclass::{AsciiMask, CharClass, RangeSet};
use crate::re::context::MatchContext;
use crate::re::optimizer::optimize;
use crate::re::optree::compiler::Compiler;
use crate::re::optree::{Op, OpTree};
use crate::re::parser::Parser;
use crate::re::Error;

#[cfg(test)]
mod tests;

/// Global slice that contains an entry for each precompiled regular
/// expression linked into the program. See https://github.com/dtolnay/linkme
/// for details about how `#[distributed_slice]` works.
#[distributed_slice]
pub static COMPILED_REGEXPS: [CompiledRegexp] = [..];

/// Signature of the functions produced by [`RustGenerator`].
///
/// The function starts matching at op `entry` and position `pos`, calls
/// `on_match` with the context when the whole pattern matches, and returns
/// true. Returns false if no match was found.
pub type CompiledFn = fn(
    ctx: &mut MatchContext<'_, '_>,
    entry: u32,
    pos: usize,
    on_match: &mut dyn FnMut(&MatchContext<'_, '_>),
) -> bool;

/// Type of each entry in [`COMPILED_REGEXPS`].
pub struct CompiledRegexp {
    /// The pattern, exactly as it was passed to [`RustGenerator::add`].
    pub pattern: &'static str,
    /// True if the pattern can only match at the start of the input.
    pub anchored: bool,
    /// Minimum length of the input for the pattern to match.
    pub min_req: usize,
    /// Number of capture groups, not including the group 0.
    pub num_captures: u32,
    /// Op where matching starts.
    pub entry: u32,
    /// The generated function.
    pub exec: CompiledFn,
}

impl CompiledRegexp {
    /// Finds the precompiled version of `pattern`, if any.
    pub fn lookup(pattern: &str) -> Option<&'static CompiledRegexp> {
        COMPILED_REGEXPS.iter().find(|compiled| compiled.pattern == pattern)
    }
}

/// Generates Rust code for a set of regular expressions.
pub struct RustGenerator {
    id_prefix: String,
    patterns: HashSet<String>,
    functions: Vec<String>,
}

impl RustGenerator {
    /// Creates a new generator. The identifiers of the generated functions
    /// start with `id_prefix`, which must be a valid Rust identifier and
    /// must be different for each generated file linked into the same
    /// program.
    pub fn new<P: Into<String>>(id_prefix: P) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            patterns: HashSet::new(),
            functions: Vec::new(),
        }
    }

    /// Compiles `pattern` and generates the code for it. Patterns that were
    /// already added are ignored.
    pub fn add(&mut self, pattern: &str) -> Result<&mut Self, Error> {
        if self.patterns.contains(pattern) {
            return Ok(self);
        }

        let ast = optimize(Parser::new().parse(pattern)?);
        let tree = Compiler::new().compile(&ast)?;
        let name = format!("{}_{}", self.id_prefix, self.functions.len());

        debug!("generating `{}` for regexp `{}`", name, pattern);

        self.functions.push(generate(&name, pattern, &tree));
        self.patterns.insert(pattern.to_owned());

        Ok(self)
    }

    /// Number of patterns added to the generator.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// True if no patterns were added to the generator.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Writes the generated source file.
    pub fn write_to<W: io::Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "// Code generated by yrx. DO NOT EDIT.")?;
        writeln!(w)?;
        writeln!(w, "use linkme::distributed_slice;")?;
        writeln!(w, "use yarex::codegen::CompiledRegexp;")?;
        writeln!(w, "use yarex::re::context::{{ContextKey, MatchContext}};")?;
        writeln!(w, "use yarex::COMPILED_REGEXPS;")?;
        for function in &self.functions {
            writeln!(w)?;
            w.write_all(function.as_bytes())?;
        }
        Ok(())
    }
}

/// Generates the registry entry and the function for a single tree.
fn generate(name: &str, pattern: &str, tree: &OpTree) -> String {
    let mut arms = String::new();

    for (id, node) in tree.iter() {
        let id = id.as_u32();
        let min = node.min_req();

        let arm = match node.op() {
            Op::Success => format!(
                r#"            {id} => {{
                ctx.push(ContextKey::capture(0), pos);
                on_match(ctx);
                return true;
            }}
"#
            ),
            Op::Literal { literal, follower } => format!(
                r#"            {id} if bytes.len() - pos >= {min}
                && bytes[pos..].starts_with({literal:?}.as_bytes()) =>
            {{
                pos += {len};
                state = {follower};
                true
            }}
"#,
                len = literal.len(),
                follower = follower.as_u32(),
            ),
            Op::Class { class, follower } => format!(
                r#"            {id} if bytes.len() - pos >= {min} => {{
                match ctx.text()[pos..].chars().next() {{
                    Some(c) if {{ let u = c as u32; {predicate} }} => {{
                        pos += c.len_utf8();
                        state = {follower};
                        true
                    }}
                    _ => false,
                }}
            }}
"#,
                predicate = class_predicate(class),
                follower = follower.as_u32(),
            ),
            Op::AnyExceptNewline { follower } => format!(
                r#"            {id} if bytes.len() - pos >= {min} => {{
                match ctx.text()[pos..].chars().next() {{
                    Some(c) if c != '\n' => {{
                        pos += c.len_utf8();
                        state = {follower};
                        true
                    }}
                    _ => false,
                }}
            }}
"#,
                follower = follower.as_u32(),
            ),
            Op::Alt { follower, alternative } => format!(
                r#"            {id} if bytes.len() - pos >= {min} => {{
                choices.push(({alternative}, pos, ctx.top()));
                state = {follower};
                true
            }}
"#,
                follower = follower.as_u32(),
                alternative = alternative.as_u32(),
            ),
            Op::Repeat { follower, alternative, key } => format!(
                r#"            {id} if bytes.len() - pos >= {min} => {{
                if ctx.find(ContextKey::repeat({index})) == Some(pos) {{
                    state = {alternative};
                }} else {{
                    choices.push(({alternative}, pos, ctx.top()));
                    ctx.push(ContextKey::repeat({index}), pos);
                    state = {follower};
                }}
                true
            }}
"#,
                index = key.index(),
                follower = follower.as_u32(),
                alternative = alternative.as_u32(),
            ),
            Op::CaptureMark { key, follower } => format!(
                r#"            {id} => {{
                ctx.push(ContextKey::capture({index}), pos);
                state = {follower};
                true
            }}
"#,
                index = key.index(),
                follower = follower.as_u32(),
            ),
            Op::BackReference { key, follower } => format!(
                r#"            {id} => match ctx.captured({index}) {{
                Some((start, end))
                    if bytes[pos..].starts_with(&bytes[start..end]) =>
                {{
                    pos += end - start;
                    state = {follower};
                    true
                }}
                _ => false,
            }},
"#,
                index = key.index(),
                follower = follower.as_u32(),
            ),
            Op::AssertStart { follower } => format!(
                r#"            {id} if pos == 0 => {{
                state = {follower};
                true
            }}
"#,
                follower = follower.as_u32(),
            ),
            Op::AssertEnd { follower } => format!(
                r#"            {id} if pos == bytes.len() => {{
                state = {follower};
                true
            }}
"#,
                follower = follower.as_u32(),
            ),
        };

        arms.push_str(&arm);
    }

    format!(
        r#"#[distributed_slice(COMPILED_REGEXPS)]
static {upper}: CompiledRegexp = CompiledRegexp {{
    pattern: {pattern:?},
    anchored: {anchored},
    min_req: {min_req},
    num_captures: {num_captures},
    entry: {entry},
    exec: {name},
}};

#[allow(unused_parens)]
fn {name}(
    ctx: &mut MatchContext<'_, '_>,
    entry: u32,
    pos: usize,
    on_match: &mut dyn FnMut(&MatchContext<'_, '_>),
) -> bool {{
    let bytes = ctx.text().as_bytes();
    let mut choices: Vec<(u32, usize, usize)> = Vec::new();
    let mut state = entry;
    let mut pos = pos;

    loop {{
        let matched = match state {{
{arms}            _ => false,
        }};

        if !matched {{
            let Some((next, p, top)) = choices.pop() else {{
                return false;
            }};
            ctx.backtrack(top);
            state = next;
            pos = p;
        }}
    }}
}}
"#,
        upper = name.to_uppercase(),
        anchored = tree.anchored(),
        min_req = tree.min_req(),
        num_captures = tree.num_captures(),
        entry = tree.root().as_u32(),
    )
}

/// Returns a boolean expression that is true when the code point `u` (an
/// `u32` variable) belongs to `class`.
fn class_predicate(class: &CharClass) -> String {
    match class {
        CharClass::Ascii(mask) => ascii_predicate(mask),
        CharClass::Ranges(set) => ranges_predicate(set),
        CharClass::Complement(class) => {
            format!("!({})", class_predicate(class))
        }
        CharClass::Union(members) if members.is_empty() => "false".to_string(),
        CharClass::Union(members) => {
            let members: Vec<String> =
                members.iter().map(class_predicate).collect();
            format!("({})", members.join(" || "))
        }
    }
}

fn ascii_predicate(mask: &AsciiMask) -> String {
    let (lo, hi) = mask.words();
    let bits = (hi as u128) << 64 | lo as u128;
    if mask.is_negated() {
        format!("(u >= 128 || ({:#x}u128 >> u) & 1 != 0)", bits)
    } else {
        format!("(u < 128 && ({:#x}u128 >> u) & 1 != 0)", bits)
    }
}

fn ranges_predicate(set: &RangeSet) -> String {
    let mut unit = Vec::new();
    let mut terms = Vec::new();

    for range in set.ranges() {
        match (range.lo(), range.hi(), range.stride()) {
            (lo, hi, _) if lo == hi => unit.push(lo.to_string()),
            (lo, hi, 1) => unit.push(format!("{}..={}", lo, hi)),
            (lo, hi, stride) => terms.push(format!(
                "(u >= {lo} && u <= {hi} && (u - {lo}) % {stride} == 0)"
            )),
        }
    }

    if !unit.is_empty() {
        terms.insert(0, format!("matches!(u, {})", unit.join(" | ")));
    }

    match terms.len() {
        0 => "false".to_string(),
        1 => terms.swap_remove(0),
        _ => format!("({})", terms.join(" || ")),
    }
}

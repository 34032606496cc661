/*! A backtracking regular expression engine with support for
back-references.

Patterns are parsed, optimized, and compiled into a graph of operations
that is executed by a backtracking engine. Unlike engines based on finite
automata, this makes possible to match patterns like `(hoge)\1fuga`, where
`\1` must match exactly the text captured by the first group.

The main type in this crate is [`Regexp`].

# Example

```rust
let re = yarex::Regexp::new(r"[A-Z0-9][a-z]").unwrap();

assert!(re.is_match("FOObar"));
assert!(!re.is_match("AAAAAA"));
assert_eq!(re.find_string("FOObar"), "Ob");
```

# Speculative matching

The engine can evaluate both sides of a decision point in parallel, using
a pool of worker threads shared by all the regular expressions. This is
disabled by default, and can be enabled with [`Config`]:

```rust
let mut config = yarex::Config::default();
config.engine.speculative = true;

let re = yarex::Regexp::with_config("(a|b|c)*c", &config).unwrap();
assert_eq!(re.find_string_index("abcabx"), Some((0, 3)));
```

# Precompiled regular expressions

[`codegen::RustGenerator`] produces Rust code for a set of patterns, which
is used instead of compiling the patterns at run time when linked into the
program. See the [`codegen`] module for details.
*/

// Generated code refers to this crate as `yarex`, also when it's included
// in this crate's own tests.
extern crate self as yarex;

pub use codegen::CompiledRegexp;
pub use codegen::COMPILED_REGEXPS;
pub use config::Config;
pub use re::ParseError;
pub use re::ParseErrorKind;
pub use re::Error;
pub use regexp::Captures;
pub use regexp::Match;
pub use regexp::Regexp;

pub mod codegen;
pub mod config;
pub mod re;

mod regexp;

#[cfg(test)]
mod tests;

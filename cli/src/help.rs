pub const CONFIG_FILE: &str = r#"Config file for yarex

Specifies a config file which controls the behavior of the matching engine. If config
file is not specified, ${HOME}/.yarex.toml is used. If it does not exist the default
options are applied.

Example:

[engine]
speculative = true
speculation_threshold = 64
use_precompiled = true"#;

pub const FIND_LONG_HELP: &str = r#"Print the lines that match a regular expression

Each line of the input is matched against <PATTERN> and printed if some part of it
matches. The supported syntax includes back-references, like in `(foo)\1`."#;

pub const GEN_LONG_HELP: &str = r#"Generate Rust code for precompiled regular expressions

The generated file must be included in a crate that depends on `yarex` and `linkme`.
When the program is linked with it, `Regexp::new` uses the generated code for the
given patterns instead of compiling them at run time.

Examples:

yrx gen src/precompiled.rs -p '(hoge)\1fuga' -p 'fo*oh'"#;

pub const SPECULATIVE_LONG_HELP: &str = r#"Evaluate alternatives in parallel

When enabled, the alternatives at decision points are tried in parallel with the
current path when there are idle threads. The results are the same, but matching
patterns with a lot of backtracking can be faster on multi-core machines."#;

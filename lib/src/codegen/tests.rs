use pretty_assertions::assert_eq;

use super::{class_predicate, CompiledRegexp, RustGenerator};
use crate::re::charclass::{CharClass, ClassRange, RangeSet};
use crate::{Config, Regexp};

// The output of the generator for the patterns in `generated_code`. It's
// included here so that the functions get registered in the test binary.
mod precompiled {
    include!("testdata/precompiled.rs");
}

const PATTERNS: [&str; 3] = [r"(hoge)\1fuga", "[a-c]+.", "(^|A)*foo bar"];

#[test]
fn generated_code() {
    let mut generator = RustGenerator::new("test");

    for pattern in PATTERNS {
        generator.add(pattern).unwrap();
    }

    // Duplicates are ignored.
    generator.add(PATTERNS[0]).unwrap();
    assert_eq!(generator.len(), 3);

    let mut output = Vec::new();
    generator.write_to(&mut output).unwrap();

    assert_eq!(
        include_str!("testdata/precompiled.rs"),
        String::from_utf8(output).unwrap()
    );
}

#[test]
fn invalid_pattern() {
    let mut generator = RustGenerator::new("test");
    assert!(generator.add("(foo").is_err());
    assert!(generator.is_empty());
}

#[test]
fn registry() {
    for pattern in PATTERNS {
        let compiled = CompiledRegexp::lookup(pattern).unwrap();
        let re = Regexp::with_config(pattern, &runtime_only()).unwrap();

        assert_eq!(compiled.anchored, re.is_anchored());
        assert_eq!(compiled.min_req, re.min_len());
        assert_eq!(compiled.num_captures, re.num_captures());
        assert!(Regexp::new(pattern).unwrap().is_precompiled());
    }

    assert!(CompiledRegexp::lookup("(hoge)").is_none());
    assert!(!Regexp::new("(hoge)").unwrap().is_precompiled());
}

#[test]
fn precompiled_matches_runtime() {
    let texts = [
        "",
        "hogehogefuga",
        "AAAhogehogefugaBBB",
        "hogefuga",
        "abcx",
        "cccccc",
        "a",
        "xxab\ny",
        "AAfoo bar",
        "AABAAfoo bar",
        "foo ba",
        "ñandú",
    ];

    for pattern in PATTERNS {
        let precompiled = Regexp::new(pattern).unwrap();
        let runtime = Regexp::with_config(pattern, &runtime_only()).unwrap();

        assert!(precompiled.is_precompiled());
        assert!(!runtime.is_precompiled());

        for text in texts {
            assert_eq!(
                runtime.captures(text).map(|c| c.spans().to_vec()),
                precompiled.captures(text).map(|c| c.spans().to_vec()),
                "pattern: {}, text: {:?}",
                pattern,
                text
            );
            assert_eq!(
                runtime.is_match(text),
                precompiled.is_match(text),
                "pattern: {}, text: {:?}",
                pattern,
                text
            );
        }
    }
}

#[test]
fn class_predicates() {
    let set = RangeSet::from_ranges([
        ClassRange::new(0x41, 0x5a),
        ClassRange::new(0xe9, 0xe9),
    ]);
    assert_eq!(
        class_predicate(&CharClass::Ranges(set.clone())),
        "matches!(u, 65..=90 | 233)"
    );

    let strided = RangeSet::from_ranges([ClassRange::with_stride(0x100, 0x17f, 2)]);
    assert_eq!(
        class_predicate(&CharClass::Ranges(strided.clone())),
        "(u >= 256 && u <= 383 && (u - 256) % 2 == 0)"
    );

    assert_eq!(
        class_predicate(&CharClass::Union(vec![
            CharClass::Ranges(set),
            CharClass::Complement(Box::new(CharClass::Ranges(strided))),
        ])),
        "(matches!(u, 65..=90 | 233) || !((u >= 256 && u <= 383 && (u - 256) % 2 == 0)))"
    );

    assert_eq!(
        class_predicate(&CharClass::Ranges(RangeSet::new())),
        "false"
    );
}

fn runtime_only() -> Config {
    let mut config = Config::default();
    config.engine.use_precompiled = false;
    config
}

/*! End-to-end tests. */
use pretty_assertions::assert_eq;

use crate::re::ParseErrorKind;
use crate::{Config, Error, Regexp};

/// Patterns from the compatibility corpus, with the strings they are tested
/// against. None of them has back-references, so the results must be the
/// same as the ones produced by the `regex` crate.
const CORPUS: &[(&str, &[&str])] = &[
    (
        "foo bar",
        &["foo bar", "foo  bar", "hogefoo barfuga", "foo barf", "Afoo bar", "foo ba"],
    ),
    ("foo|bar", &["foo bar", "hogefoo barfuga", "foo baz", "bar f", "foba", ""]),
    (
        "(?:foo|fo)oh",
        &["fooh", "foooh", "foh", "fooooooooooh", "fooooooooofoooh", ""],
    ),
    (
        "fo*oh",
        &["fooh", "foh", "fh", "fooooooooooh", "fooooooooofoooh", "", "fo", "oh"],
    ),
    (
        "fo+oh",
        &["fooh", "foh", "fh", "fooooooooooh", "fooooooooofoooh", "", "fo", "oh"],
    ),
    (
        "fo{2,5}oh",
        &["fooh", "foh", "fh", "fooooooooooh", "fooooooooofoooh", "", "fo", "oh"],
    ),
    (
        "fo?oh",
        &["fooh", "foh", "fh", "fooooooooooh", "fooooooooofooh", "", "fo", "oh"],
    ),
    (
        "fo*oh?",
        &["ABfooh", "foo", "fh", "foooohoooooo", "foooooooooooCD", "", "fo", "oh"],
    ),
    (".", &["aiueo", "\n", "", " ", "\x08"]),
    (".+x", &["", "x", "xx", "aaaaax", "\nx", "xx\nx", "xxxxxa"]),
    (
        "^foo bar",
        &[
            "foo bar",
            "foo  bar",
            "hogefoo barfuga",
            "foo barf",
            "Afoo bar",
            "foo ba",
            "\nfoo bar",
        ],
    ),
    (
        "(^|A)*foo bar",
        &[
            "foo bar",
            "foo  bar",
            "hogefoo barfuga",
            "foo barf",
            "Afoo bar",
            "AAfoo bar",
            "AAAAfoo bar",
            "AABAAfoo bar",
        ],
    ),
    (
        "[0aB]",
        &["foo", "foo  bar", "FOO BAR", "AAAAAA", "012345", "\0hoge", "\0hage"],
    ),
    (
        "[A-Z0-9][a-z]",
        &[
            "absksdjhasd",
            "alsdAAA",
            "asl;k3as7djj",
            "Aiiiiiiii9",
            "foo BAR",
            "FOO bar",
            "FOObar",
            "fooBARbaz",
        ],
    ),
    (
        r#"^["]{0,1}([^"]*)["]{0,1}[ ]*<(sip|tel|sips):(([^@]*)@){0,1}([^>^:]*|\[[a-fA-F0-9:]*\]):{0,1}([0-9]*){0,1}>(;.*){0,1}$"#,
        &[
            "\"display_name\"<sip:0312341234@10.0.0.1:5060>;user=phone;hogehoge",
            "<sip:0312341234@10.0.0.1>",
            "\"display_name\"<sip:0312341234@10.0.0.1>",
            "<sip:whois.this>;user=phone",
            "\"0333334444\"<sip:[2001:30:fe::4:123]>;user=phone",
        ],
    ),
    ("[^a-z]+", &["abc", "abcDEF", "ñandú", "日本語abc", ""]),
    ("[à-ÿ]+.", &["aé", "crème brûlée", "ÿ", "ÿÿ"]),
    ("x*", &["", "x", "axx", "日本"]),
    ("a{3,}", &["aa", "aaa", "baaaaab"]),
    ("a{2}|b{0}c", &["a", "aab", "c", "bc"]),
    (r"\.\*\\\(\)", &[r".*\()", r"..*\()x", r".*\("]),
    ("(a|ab)(c|bcd)(d*)", &["abcd", "abc", "abd", "xabcdd"]),
];

/// Configuration that always uses the runtime engine, even for the
/// patterns that have generated code linked into the test binary.
fn runtime() -> Config {
    let mut config = Config::default();
    config.engine.use_precompiled = false;
    config
}

fn speculative() -> Config {
    let mut config = runtime();
    config.engine.speculative = true;
    config.engine.speculation_threshold = 0;
    config
}

/// The default configuration, plus the runtime engine with and without
/// speculation.
fn all_configs() -> [Config; 3] {
    [Config::default(), runtime(), speculative()]
}

fn assert_same_as_regex(re: &Regexp, expected: &regex::Regex, text: &str) {
    let span = expected.find(text).map(|m| (m.start(), m.end()));

    assert_eq!(
        re.find_string_index(text),
        span,
        "find_string_index: `{}` against {:?}",
        re,
        text
    );
    assert_eq!(
        re.find_string(text),
        expected.find(text).map(|m| m.as_str()).unwrap_or_default(),
        "find_string: `{}` against {:?}",
        re,
        text
    );
    assert_eq!(
        re.is_match(text),
        span.is_some(),
        "is_match: `{}` against {:?}",
        re,
        text
    );
}

#[test]
fn corpus() {
    for (pattern, texts) in CORPUS {
        let re = Regexp::new(pattern).unwrap();
        let expected = regex::Regex::new(pattern).unwrap();

        for text in texts.iter() {
            assert_same_as_regex(&re, &expected, text);
        }
    }
}

#[test]
fn corpus_speculative() {
    let config = speculative();

    for (pattern, texts) in CORPUS {
        let re = Regexp::with_config(pattern, &config).unwrap();
        let expected = regex::Regex::new(pattern).unwrap();

        for text in texts.iter() {
            assert_same_as_regex(&re, &expected, text);
        }
    }
}

#[test]
fn back_references() {
    for config in all_configs() {
        let re = Regexp::with_config(r"(hoge)\1fuga", &config).unwrap();

        assert_eq!(re.is_precompiled(), config.engine.use_precompiled);

        assert!(re.is_match("hogehogefuga"));
        assert!(re.is_match("AAAhogehogefugaBBB"));
        assert!(!re.is_match("hogefuga"));
        assert!(!re.is_match("hoge"));
        assert!(!re.is_match("fuga"));

        assert_eq!(re.find_string_index("AAAhogehogefugaBBB"), Some((3, 15)));
        assert_eq!(re.find_string("AAAhogehogefugaBBB"), "hogehogefuga");

        let re = Regexp::with_config(r"<([a-z]+)>[^<]*</\1>", &config).unwrap();
        assert_eq!(re.find_string_index("<a>x</b><b>y</b>"), Some((8, 16)));
        assert!(!re.is_match("<a>x</b>"));
    }
}

#[test]
fn scenarios() {
    for config in all_configs() {
        let re = Regexp::with_config("fo*oh", &config).unwrap();
        assert!(re.is_match("fooh"));
        assert!(!re.is_match("fh"));
        assert!(!re.is_match("fo"));

        let re = Regexp::with_config("[A-Z0-9][a-z]", &config).unwrap();
        assert!(re.is_match("FOObar"));
        assert_eq!(re.find_string("FOObar"), "Ob");
        assert!(!re.is_match("AAAAAA"));

        let re = Regexp::with_config("(^|A)*foo bar", &config).unwrap();
        assert_eq!(re.is_precompiled(), config.engine.use_precompiled);
        assert!(re.is_match("AAfoo bar"));
        assert!(re.is_match("AABAAfoo bar"));
        assert!(!re.is_match("AABAAfoo ba"));
        assert_eq!(re.find_string_index("AABAAfoo bar"), Some((3, 12)));
    }
}

#[test]
fn empty_repetitions() {
    let re = Regexp::new("(?:(?:){4294967295}){4294967295}").unwrap();

    assert_eq!(re.min_len(), 0);
    assert_eq!(re.find_string_index("abc"), Some((0, 0)));

    let re = Regexp::new("(?:x{0}){4294967295}y").unwrap();
    assert_eq!(re.find_string_index("xxy"), Some((2, 3)));
}

#[test]
fn anchored() {
    let re = Regexp::new("^foo").unwrap();

    assert!(re.is_anchored());
    assert!(re.is_match("foobar"));
    assert!(!re.is_match("xfoo"));
    assert!(!re.is_match("\nfoo"));
    assert_eq!(re.find_string_index("foofoo"), Some((0, 3)));

    let re = Regexp::new("(?:^a|^b)c").unwrap();
    assert!(re.is_anchored());
    assert!(!re.is_match("xac"));

    let re = Regexp::new("a|^b").unwrap();
    assert!(!re.is_anchored());
    assert!(re.is_match("xa"));
    assert!(!re.is_match("xb"));
}

#[test]
fn captures() {
    let re = Regexp::new("(a|ab)(c|bcd)(d*)").unwrap();
    let captures = re.captures("xabcd").unwrap();

    assert_eq!(captures.len(), 4);
    assert_eq!(
        captures.spans(),
        &[Some((1, 5)), Some((1, 2)), Some((2, 5)), Some((5, 5))]
    );
    assert_eq!(captures.get(0).map(|m| m.as_str()), Some("abcd"));
    assert_eq!(captures.get(2).map(|m| m.range()), Some(2..5));
    assert!(captures.get(3).unwrap().is_empty());
    assert_eq!(captures.get(4), None);

    let re = Regexp::new("(?:(a)|b)c").unwrap();
    let captures = re.captures("bc").unwrap();
    assert_eq!(captures.spans(), &[Some((0, 2)), None]);
    assert_eq!(captures.iter().flatten().count(), 1);

    assert!(re.captures("xx").is_none());
}

#[test]
fn multibyte_input() {
    let re = Regexp::new("ú.").unwrap();
    assert_eq!(re.find_string_index("ñandú!"), Some((5, 8)));

    let re = Regexp::new("").unwrap();
    assert_eq!(re.find_string_index("ñ"), Some((0, 0)));

    // A match can't start in the middle of a character.
    let re = Regexp::new("[^a]").unwrap();
    let m = re.find("añ").unwrap();
    assert_eq!((m.start(), m.end(), m.as_str()), (1, 3, "ñ"));
}

#[test]
fn empty_match() {
    let re = Regexp::new("x*").unwrap();

    let m = re.find("abc").unwrap();
    assert_eq!(m.range(), 0..0);
    assert!(m.is_empty());
    assert_eq!(re.find_string("abc"), "");
    assert!(re.is_match(""));

    // `find_string` can't tell apart an empty match from no match.
    let re = Regexp::new("y").unwrap();
    assert_eq!(re.find_string("abc"), "");
    assert_eq!(re.find("abc"), None);
}

#[test]
fn determinism() {
    let re = Regexp::with_config("(a|b|c)*(c)", &speculative()).unwrap();
    let text = "abcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcx";
    let expected = re.captures(text).map(|c| c.spans().to_vec());

    assert_eq!(
        expected,
        Some(vec![Some((0, 48)), Some((46, 47)), Some((47, 48))])
    );

    for _ in 0..50 {
        assert_eq!(re.captures(text).map(|c| c.spans().to_vec()), expected);
    }
}

#[test]
fn shared_between_threads() {
    let re = Regexp::new(r"([a-z]+)@([a-z]+)\.com").unwrap();
    let texts = ["foo@bar.com", "x foo@bar.org", "<baz@qux.com>"];

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..100 {
                    assert_eq!(re.find_string(texts[0]), "foo@bar.com");
                    assert!(!re.is_match(texts[1]));
                    assert_eq!(re.find_string_index(texts[2]), Some((1, 12)));
                }
            });
        }
    });
}

#[test]
fn metadata() {
    let re = Regexp::new("(foo)(bar)?baz").unwrap();

    assert_eq!(re.as_str(), "(foo)(bar)?baz");
    assert_eq!(re.to_string(), "(foo)(bar)?baz");
    assert_eq!(re.num_captures(), 2);
    assert_eq!(re.min_len(), 6);
    assert!(!re.is_anchored());
    assert!(!re.is_precompiled());
    assert!(re.op_tree().is_some());
}

#[test]
fn errors() {
    let err = Regexp::new("(foo").unwrap_err();
    let Error::Parse(err) = err else { panic!("expected a parse error") };
    assert_eq!(err.kind(), &ParseErrorKind::UnmatchedOpenParen);

    let err = Regexp::new("foo)").unwrap_err();
    assert!(err.to_string().starts_with("invalid regexp: unmatched `)`"));

    assert!(Regexp::new("a{3,2}").is_err());
    assert!(Regexp::new("[z-a]").is_err());
    assert!(Regexp::new(r"\q").is_err());
    assert!(Regexp::new("a**").is_err());
    assert!(Regexp::new(r"(a\1)").is_err());
}

#[test]
fn long_input() {
    // The engine doesn't recurse for each iteration, so long inputs don't
    // overflow the stack.
    let text = "a".repeat(1 << 18);
    let re = Regexp::new("(?:a|b)*c").unwrap();
    assert!(!re.is_match(&text[..1 << 12]));

    let re = Regexp::new("(?:a|b)*$").unwrap();
    assert_eq!(re.find_string_index(&text), Some((0, 1 << 18)));
}

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn dump_optree() {
    Command::cargo_bin("yrx")
        .unwrap()
        .arg("dump")
        .arg("--optree")
        .arg("foo|bar")
        .assert()
        .success()
        .stdout(
            r#"OPTREE:
 00000: SUCCESS (min 0)
 00001: LIT "foo" -> 00000 (min 3)
 00002: LIT "bar" -> 00000 (min 3)
*00003: ALT 00001 | 00002 (min 3)
"#,
        );
}

#[test]
fn dump_ast() {
    Command::cargo_bin("yrx")
        .unwrap()
        .arg("dump")
        .arg("--ast")
        .arg("a(?:b|c)*")
        .assert()
        .success()
        .stdout(predicate::str::contains("alternation"))
        .stdout(predicate::str::contains("OPTREE").not());
}

#[test]
fn dump_invalid_pattern() {
    Command::cargo_bin("yrx")
        .unwrap()
        .arg("dump")
        .arg("a{3,2}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid repetition range {3,2}"));
}

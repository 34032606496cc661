use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn find_lines() {
    Command::cargo_bin("yrx")
        .unwrap()
        .arg("find")
        .arg("(^|A)*foo bar")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .success()
        .stdout("foo bar\nAAfoo bar\n");
}

#[test]
fn find_back_reference() {
    Command::cargo_bin("yrx")
        .unwrap()
        .arg("find")
        .arg("--line-number")
        .arg(r"(hoge)\1fuga")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .success()
        .stdout("2:hogehogefuga\n");
}

#[test]
fn find_only_matching() {
    Command::cargo_bin("yrx")
        .unwrap()
        .arg("find")
        .arg("-o")
        .arg("[A-Z0-9][a-z]")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .success()
        .stdout("Af\nOb\n");
}

#[test]
fn find_count() {
    Command::cargo_bin("yrx")
        .unwrap()
        .arg("find")
        .arg("--count")
        .arg("--speculative")
        .arg("foo|fuga")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .success()
        .stdout("5\n");
}

#[test]
fn find_stdin() {
    Command::cargo_bin("yrx")
        .unwrap()
        .arg("find")
        .arg("-o")
        .arg("fo*oh")
        .write_stdin("fh\nfoooh\nfo\n")
        .assert()
        .success()
        .stdout("foooh\n");
}

#[test]
fn find_invalid_pattern() {
    Command::cargo_bin("yrx")
        .unwrap()
        .arg("find")
        .arg("(foo")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("can not compile `(foo`"));
}

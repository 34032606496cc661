use criterion::{criterion_group, criterion_main, Criterion};

macro_rules! gen_bench {
    ($name:ident, $samples:expr, $desc:literal, $pattern:literal, $data:expr) => {
        fn $name(c: &mut Criterion) {
            let mut group = c.benchmark_group($desc);

            group.sample_size($samples);

            group.bench_function("regex", |b| {
                let re = regex::Regex::new($pattern).unwrap();
                b.iter(|| {
                    for text in $data {
                        let _ = re.is_match(text);
                    }
                })
            });

            group.bench_function("yarex", |b| {
                let re = yarex::Regexp::new($pattern).unwrap();
                b.iter(|| {
                    for text in $data {
                        let _ = re.is_match(text);
                    }
                });
            });

            group.bench_function("yarex-speculative", |b| {
                let mut config = yarex::Config::default();
                config.engine.speculative = true;
                let re = yarex::Regexp::with_config($pattern, &config).unwrap();
                b.iter(|| {
                    for text in $data {
                        let _ = re.is_match(text);
                    }
                });
            });
        }
    };
}

const SIP_STRINGS: &[&str] = &[
    "\"display_name\"<sip:0312341234@10.0.0.1:5060>;user=phone;hogehoge",
    "<sip:0312341234@10.0.0.1>",
    "\"display_name\"<sip:0312341234@10.0.0.1>",
    "<sip:whois.this>;user=phone",
    "\"0333334444\"<sip:[2001:30:fe::4:123]>;user=phone",
];

gen_bench!(
    bench_sip_pattern,
    100,
    "SIP pattern",
    r#"^["]{0,1}([^"]*)["]{0,1}[ ]*<(sip|tel|sips):(([^@]*)@){0,1}([^>^:]*|\[[a-fA-F0-9:]*\]):{0,1}([0-9]*){0,1}>(;.*){0,1}$"#,
    SIP_STRINGS
);

gen_bench!(
    bench_simple_pattern,
    500,
    "Simple pattern",
    "fabada",
    &["fabadafabafabadafabafabafafabadafabafabadafabafabafafabadafabafabadafabafabafa"]
);

gen_bench!(
    bench_backtracking,
    100,
    "Backtracking",
    "(?:a|b|c)*d",
    &["abcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabc"]
);

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_sip_pattern, bench_simple_pattern, bench_backtracking);

criterion_main!(benches);

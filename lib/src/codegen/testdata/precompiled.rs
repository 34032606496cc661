// Code generated by yrx. DO NOT EDIT.

use linkme::distributed_slice;
use yarex::codegen::CompiledRegexp;
use yarex::re::context::{ContextKey, MatchContext};
use yarex::COMPILED_REGEXPS;

#[distributed_slice(COMPILED_REGEXPS)]
static TEST_0: CompiledRegexp = CompiledRegexp {
    pattern: "(hoge)\\1fuga",
    anchored: false,
    min_req: 8,
    num_captures: 1,
    entry: 5,
    exec: test_0,
};

#[allow(unused_parens)]
fn test_0(
    ctx: &mut MatchContext<'_, '_>,
    entry: u32,
    pos: usize,
    on_match: &mut dyn FnMut(&MatchContext<'_, '_>),
) -> bool {
    let bytes = ctx.text().as_bytes();
    let mut choices: Vec<(u32, usize, usize)> = Vec::new();
    let mut state = entry;
    let mut pos = pos;

    loop {
        let matched = match state {
            0 => {
                ctx.push(ContextKey::capture(0), pos);
                on_match(ctx);
                return true;
            }
            1 if bytes.len() - pos >= 4
                && bytes[pos..].starts_with("fuga".as_bytes()) =>
            {
                pos += 4;
                state = 0;
                true
            }
            2 => match ctx.captured(1) {
                Some((start, end))
                    if bytes[pos..].starts_with(&bytes[start..end]) =>
                {
                    pos += end - start;
                    state = 1;
                    true
                }
                _ => false,
            },
            3 => {
                ctx.push(ContextKey::capture(1), pos);
                state = 2;
                true
            }
            4 if bytes.len() - pos >= 8
                && bytes[pos..].starts_with("hoge".as_bytes()) =>
            {
                pos += 4;
                state = 3;
                true
            }
            5 => {
                ctx.push(ContextKey::capture(1), pos);
                state = 4;
                true
            }
            _ => false,
        };

        if !matched {
            let Some((next, p, top)) = choices.pop() else {
                return false;
            };
            ctx.backtrack(top);
            state = next;
            pos = p;
        }
    }
}

#[distributed_slice(COMPILED_REGEXPS)]
static TEST_1: CompiledRegexp = CompiledRegexp {
    pattern: "[a-c]+.",
    anchored: false,
    min_req: 2,
    num_captures: 0,
    entry: 4,
    exec: test_1,
};

#[allow(unused_parens)]
fn test_1(
    ctx: &mut MatchContext<'_, '_>,
    entry: u32,
    pos: usize,
    on_match: &mut dyn FnMut(&MatchContext<'_, '_>),
) -> bool {
    let bytes = ctx.text().as_bytes();
    let mut choices: Vec<(u32, usize, usize)> = Vec::new();
    let mut state = entry;
    let mut pos = pos;

    loop {
        let matched = match state {
            0 => {
                ctx.push(ContextKey::capture(0), pos);
                on_match(ctx);
                return true;
            }
            1 if bytes.len() - pos >= 1 => {
                match ctx.text()[pos..].chars().next() {
                    Some(c) if c != '\n' => {
                        pos += c.len_utf8();
                        state = 0;
                        true
                    }
                    _ => false,
                }
            }
            2 if bytes.len() - pos >= 1 => {
                choices.push((1, pos, ctx.top()));
                state = 3;
                true
            }
            3 if bytes.len() - pos >= 2 => {
                match ctx.text()[pos..].chars().next() {
                    Some(c) if { let u = c as u32; (u < 128 && (0xe000000000000000000000000u128 >> u) & 1 != 0) } => {
                        pos += c.len_utf8();
                        state = 2;
                        true
                    }
                    _ => false,
                }
            }
            4 if bytes.len() - pos >= 2 => {
                match ctx.text()[pos..].chars().next() {
                    Some(c) if { let u = c as u32; (u < 128 && (0xe000000000000000000000000u128 >> u) & 1 != 0) } => {
                        pos += c.len_utf8();
                        state = 2;
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        };

        if !matched {
            let Some((next, p, top)) = choices.pop() else {
                return false;
            };
            ctx.backtrack(top);
            state = next;
            pos = p;
        }
    }
}

#[distributed_slice(COMPILED_REGEXPS)]
static TEST_2: CompiledRegexp = CompiledRegexp {
    pattern: "(^|A)*foo bar",
    anchored: false,
    min_req: 7,
    num_captures: 1,
    entry: 2,
    exec: test_2,
};

#[allow(unused_parens)]
fn test_2(
    ctx: &mut MatchContext<'_, '_>,
    entry: u32,
    pos: usize,
    on_match: &mut dyn FnMut(&MatchContext<'_, '_>),
) -> bool {
    let bytes = ctx.text().as_bytes();
    let mut choices: Vec<(u32, usize, usize)> = Vec::new();
    let mut state = entry;
    let mut pos = pos;

    loop {
        let matched = match state {
            0 => {
                ctx.push(ContextKey::capture(0), pos);
                on_match(ctx);
                return true;
            }
            1 if bytes.len() - pos >= 7
                && bytes[pos..].starts_with("foo bar".as_bytes()) =>
            {
                pos += 7;
                state = 0;
                true
            }
            2 if bytes.len() - pos >= 7 => {
                if ctx.find(ContextKey::repeat(1)) == Some(pos) {
                    state = 1;
                } else {
                    choices.push((1, pos, ctx.top()));
                    ctx.push(ContextKey::repeat(1), pos);
                    state = 7;
                }
                true
            }
            3 => {
                ctx.push(ContextKey::capture(1), pos);
                state = 2;
                true
            }
            4 if pos == 0 => {
                state = 3;
                true
            }
            5 if bytes.len() - pos >= 8
                && bytes[pos..].starts_with("A".as_bytes()) =>
            {
                pos += 1;
                state = 3;
                true
            }
            6 if bytes.len() - pos >= 7 => {
                choices.push((5, pos, ctx.top()));
                state = 4;
                true
            }
            7 => {
                ctx.push(ContextKey::capture(1), pos);
                state = 6;
                true
            }
            _ => false,
        };

        if !matched {
            let Some((next, p, top)) = choices.pop() else {
                return false;
            };
            ctx.backtrack(top);
            state = next;
            pos = p;
        }
    }
}

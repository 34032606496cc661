/*! Rewrites an [`Ast`] into an equivalent one that compiles to fewer ops.

The rewrites applied by [`optimize`] are:

* Nested sequences and nested alternations are spliced into their parent.
* Character classes with a single code point become literals.
* Adjacent literals in a sequence are joined into a single literal.
* Sequences and alternations with a single item are replaced by the item,
  and empty ones are replaced by the empty literal.

Children are optimized before their parents, which guarantees that a class
turned into a literal, or a literal coming from a flattened sequence, can
be joined with its new neighbours. Applying [`optimize`] to its own output
doesn't change it.
 */

use crate::re::ast::Ast;

/// Returns an optimized version of `ast`.
pub fn optimize(ast: Ast) -> Ast {
    match ast {
        Ast::Sequence(items) => optimize_sequence(items),
        Ast::Alternation(options) => optimize_alternation(options),
        Ast::CharacterClass(class) => match class.single_char() {
            Some(c) => Ast::Literal(c.to_string()),
            None => Ast::CharacterClass(class),
        },
        Ast::Repeat { node, min, max } => Ast::repeat(optimize(*node), min, max),
        Ast::Capture { index, node } => Ast::capture(index, optimize(*node)),
        ast => ast,
    }
}

fn optimize_sequence(items: Vec<Ast>) -> Ast {
    let mut result: Vec<Ast> = Vec::with_capacity(items.len());

    let flattened = items.into_iter().map(optimize).flat_map(|item| match item {
        Ast::Sequence(items) => items,
        item => vec![item],
    });

    for item in flattened {
        match (result.last_mut(), item) {
            (Some(Ast::Literal(prev)), Ast::Literal(s)) => prev.push_str(&s),
            (_, item) => result.push(item),
        }
    }

    unwrap_singleton(result, Ast::Sequence)
}

fn optimize_alternation(options: Vec<Ast>) -> Ast {
    let options = options
        .into_iter()
        .map(optimize)
        .flat_map(|option| match option {
            Ast::Alternation(options) => options,
            option => vec![option],
        })
        .collect();

    unwrap_singleton(options, Ast::Alternation)
}

fn unwrap_singleton(mut items: Vec<Ast>, wrap: fn(Vec<Ast>) -> Ast) -> Ast {
    match items.len() {
        0 => Ast::Literal(String::new()),
        1 => items.swap_remove(0),
        _ => wrap(items),
    }
}

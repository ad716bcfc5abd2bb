//! Three structural rewrites applied, in order, to a parsed [`Ast`] before it
//! is ever iterated (§4.5). Each pass is a pure tree-to-tree rewrite; none of
//! them touch iteration/constraint semantics, so they are safe to run once
//! right after parsing and cache the result.

use crate::ast::Ast;
use crate::character_block::CharacterBlock;

bitflags::bitflags! {
    /// Which optimizer passes to run. `crossword_fuzz` flips these off one
    /// at a time to check that turning an optimization off never makes
    /// `constrain` return a *looser* result (§8 Property 2).
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct OptimizerFlags: u8 {
        const GROUP_ELISION = 0b001;
        const UNION_FUSION = 0b010;
        const CONCAT_FUSION = 0b100;
    }
}

impl OptimizerFlags {
    pub const ALL: Self = Self::from_bits_truncate(0b111);
}

pub fn optimize(ast: Ast, flags: OptimizerFlags) -> Ast {
    let mut ast = ast;
    if flags.contains(OptimizerFlags::GROUP_ELISION) {
        ast = elide_groups(ast);
    }
    if flags.contains(OptimizerFlags::UNION_FUSION) {
        ast = fuse_unions(ast);
    }
    if flags.contains(OptimizerFlags::CONCAT_FUSION) {
        ast = fuse_concatenations(ast);
    }
    ast
}

/// Pass 1: drops `NonCapture` wrappers and any `Capture` whose group number
/// is never backreferenced anywhere in the whole tree -- group numbering
/// itself is fixed at parse time, so eliding an unused group only removes
/// the wrapper node, it never renumbers its siblings.
fn elide_groups(ast: Ast) -> Ast {
    let mut referenced = std::collections::HashSet::new();
    ast.collect_backreferenced_groups(&mut referenced);
    elide_groups_with(ast, &referenced)
}

fn elide_groups_with(ast: Ast, referenced: &std::collections::HashSet<usize>) -> Ast {
    match ast {
        Ast::NonCapture(child) => elide_groups_with(*child, referenced),
        Ast::Capture { number, child } => {
            let child = elide_groups_with(*child, referenced);
            if referenced.contains(&number) {
                Ast::Capture {
                    number,
                    child: Box::new(child),
                }
            } else {
                child
            }
        }
        Ast::Lookahead(child) => Ast::Lookahead(Box::new(elide_groups_with(*child, referenced))),
        Ast::Concat(l, r) => Ast::Concat(
            Box::new(elide_groups_with(*l, referenced)),
            Box::new(elide_groups_with(*r, referenced)),
        ),
        Ast::Union(l, r) => Ast::Union(
            Box::new(elide_groups_with(*l, referenced)),
            Box::new(elide_groups_with(*r, referenced)),
        ),
        Ast::Repeat { child, min, max } => Ast::Repeat {
            child: Box::new(elide_groups_with(*child, referenced)),
            min,
            max,
        },
        other => other,
    }
}

/// Pass 2: rotates right-leaning `Union(Union(a, b), c)` / left-leaning
/// chains of single-character unions into one `CharBlock::Composite`, so
/// e.g. `a|b|c` enumerates as one value instead of three.
fn fuse_unions(ast: Ast) -> Ast {
    match ast {
        Ast::Union(l, r) => {
            let l = fuse_unions(*l);
            let r = fuse_unions(*r);
            match (single_char_block(&l), single_char_block(&r)) {
                (Some(a), Some(b)) => Ast::CharBlock(merge_blocks(a, b)),
                _ => Ast::Union(Box::new(l), Box::new(r)),
            }
        }
        Ast::Concat(l, r) => Ast::Concat(Box::new(fuse_unions(*l)), Box::new(fuse_unions(*r))),
        Ast::Capture { number, child } => Ast::Capture {
            number,
            child: Box::new(fuse_unions(*child)),
        },
        Ast::NonCapture(child) => Ast::NonCapture(Box::new(fuse_unions(*child))),
        Ast::Lookahead(child) => Ast::Lookahead(Box::new(fuse_unions(*child))),
        Ast::Repeat { child, min, max } => Ast::Repeat {
            child: Box::new(fuse_unions(*child)),
            min,
            max,
        },
        other => other,
    }
}

fn single_char_block(ast: &Ast) -> Option<CharacterBlock> {
    match ast {
        Ast::CharBlock(b) => Some(b.clone()),
        _ => None,
    }
}

fn merge_blocks(a: CharacterBlock, b: CharacterBlock) -> CharacterBlock {
    let mut blocks = match a {
        CharacterBlock::Composite(existing) => existing,
        other => vec![other],
    };
    match b {
        CharacterBlock::Composite(more) => blocks.extend(more),
        other => blocks.push(other),
    }
    CharacterBlock::Composite(blocks)
}

/// Pass 3: rotates chains of adjacent single-character `Concat` nodes into
/// one `StringLeaf`, so a literal run like `cat` enumerates as one value of
/// length 3 instead of three values of length 1 each.
fn fuse_concatenations(ast: Ast) -> Ast {
    match ast {
        Ast::Concat(l, r) => {
            let l = fuse_concatenations(*l);
            let r = fuse_concatenations(*r);
            match (single_leaf_blocks(&l), single_leaf_blocks(&r)) {
                (Some(mut a), Some(b)) => {
                    a.extend(b);
                    Ast::StringLeaf(a)
                }
                _ => Ast::Concat(Box::new(l), Box::new(r)),
            }
        }
        Ast::Union(l, r) => Ast::Union(
            Box::new(fuse_concatenations(*l)),
            Box::new(fuse_concatenations(*r)),
        ),
        Ast::Capture { number, child } => Ast::Capture {
            number,
            child: Box::new(fuse_concatenations(*child)),
        },
        Ast::NonCapture(child) => Ast::NonCapture(Box::new(fuse_concatenations(*child))),
        Ast::Lookahead(child) => Ast::Lookahead(Box::new(fuse_concatenations(*child))),
        Ast::Repeat { child, min, max } => Ast::Repeat {
            child: Box::new(fuse_concatenations(*child)),
            min,
            max,
        },
        other => other,
    }
}

fn single_leaf_blocks(ast: &Ast) -> Option<Vec<CharacterBlock>> {
    match ast {
        Ast::CharBlock(b) => Some(vec![b.clone()]),
        Ast::StringLeaf(blocks) => Some(blocks.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elides_unreferenced_capture() {
        let ast = Ast::Capture {
            number: 1,
            child: Box::new(Ast::CharBlock(CharacterBlock::Single('a'))),
        };
        let optimized = optimize(ast, OptimizerFlags::ALL);
        assert_eq!(optimized, Ast::CharBlock(CharacterBlock::Single('a')));
    }

    #[test]
    fn keeps_referenced_capture() {
        let ast = Ast::Concat(
            Box::new(Ast::Capture {
                number: 1,
                child: Box::new(Ast::CharBlock(CharacterBlock::Single('a'))),
            }),
            Box::new(Ast::Backreference(1)),
        );
        let optimized = optimize(ast.clone(), OptimizerFlags::ALL);
        assert_eq!(optimized, ast);
    }

    #[test]
    fn fuses_literal_union_into_composite() {
        let ast = Ast::Union(
            Box::new(Ast::CharBlock(CharacterBlock::Single('a'))),
            Box::new(Ast::CharBlock(CharacterBlock::Single('b'))),
        );
        let optimized = optimize(ast, OptimizerFlags::ALL);
        match optimized {
            Ast::CharBlock(CharacterBlock::Composite(blocks)) => assert_eq!(blocks.len(), 2),
            other => panic!("expected composite block, got {:?}", other),
        }
    }

    #[test]
    fn fuses_literal_run_into_string_leaf() {
        let ast = Ast::Concat(
            Box::new(Ast::Concat(
                Box::new(Ast::CharBlock(CharacterBlock::Single('c'))),
                Box::new(Ast::CharBlock(CharacterBlock::Single('a'))),
            )),
            Box::new(Ast::CharBlock(CharacterBlock::Single('t'))),
        );
        let optimized = optimize(ast, OptimizerFlags::ALL);
        match optimized {
            Ast::StringLeaf(blocks) => assert_eq!(blocks.len(), 3),
            other => panic!("expected string leaf, got {:?}", other),
        }
    }
}

#![cfg(test)]

use std::collections::{HashMap, HashSet};

use crate::{
    api::{Comment, CommentId, Reaction},
    test_util::comment,
    CommentNode, Forest, ReactionKind, ReactionState,
};

fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt::try_init();
    }
}

/// Arbitrary listings: few distinct ids, so duplicates, dangling parents and cycles
/// show up often. Duplicates never share a timestamp, otherwise which one is kept
/// depends on the listing order.
fn arbitrary_listing(raw: &[(u8, Option<u8>, u8)]) -> Vec<Comment> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter(|(id, _, minute)| seen.insert((id % 24, *minute)))
        .map(|(id, parent, minute)| {
            let id = format!("c{}", id % 24);
            let parent = parent.map(|p| format!("c{}", p % 32));
            comment(&id, parent.as_deref(), u32::from(*minute))
        })
        .collect()
}

/// Listings with unique ids where every comment replies to an older entry
fn acyclic_listing(raw: &[(u8, u8)]) -> Vec<Comment> {
    raw.iter()
        .enumerate()
        .map(|(i, (parent, minute))| {
            let parent = match (i, *parent) {
                (0, _) | (_, 0) => None,
                (i, p) => Some(format!("c{}", usize::from(p) % i)),
            };
            comment(&format!("c{i}"), parent.as_deref(), u32::from(*minute))
        })
        .collect()
}

fn check_levels(nodes: &im::Vector<CommentNode>, level: usize, max_depth: usize) {
    for n in nodes {
        assert_eq!(n.depth, std::cmp::min(level, max_depth), "depth of {}", n.id);
        assert!(level <= max_depth + 1, "{} is nested too deep", n.id);
        check_levels(&n.children, level + 1, max_depth);
    }
}

#[test]
fn build_is_deterministic() {
    init_tracing();
    bolero::check!()
        .with_type::<(u8, Vec<(u8, Option<u8>, u8)>)>()
        .for_each(|(k, raw)| {
            let max_depth = usize::from(k % 5);
            let mut listing = arbitrary_listing(raw);
            let forest = Forest::build(listing.clone(), max_depth);
            assert_eq!(Forest::build(listing.clone(), max_depth), forest);
            listing.reverse();
            assert_eq!(Forest::build(listing, max_depth), forest);
        })
}

#[test]
fn build_keeps_every_comment_once() {
    init_tracing();
    bolero::check!()
        .with_type::<(u8, Vec<(u8, Option<u8>, u8)>)>()
        .for_each(|(k, raw)| {
            let max_depth = usize::from(k % 5);
            let listing = arbitrary_listing(raw);
            let unique = listing.iter().map(|c| &c.id).collect::<HashSet<_>>();
            let forest = Forest::build(listing.clone(), max_depth);
            assert_eq!(forest.count_all(), unique.len());
            let seen = forest.walk().map(|n| &n.id).collect::<HashSet<_>>();
            assert_eq!(seen, unique);
            check_levels(forest.roots(), 0, max_depth);
        })
}

#[test]
fn flattened_comments_hang_under_the_right_ancestor() {
    init_tracing();
    bolero::check!()
        .with_type::<(u8, Vec<(u8, u8)>)>()
        .for_each(|(k, raw)| {
            let max_depth = usize::from(k % 5);
            let listing = acyclic_listing(raw);
            let parents = listing
                .iter()
                .map(|c| (c.id.clone(), c.parent_comment_id.clone()))
                .collect::<HashMap<_, _>>();
            let forest = Forest::build(listing, max_depth);
            for node in forest.walk() {
                let mut ancestors = Vec::new();
                let mut cur = parents[&node.id].clone();
                while let Some(p) = cur {
                    cur = parents[&p].clone();
                    ancestors.push(p);
                }
                ancestors.reverse();
                let mut expected: Vec<CommentId> = match ancestors.len() {
                    0 => Vec::new(),
                    d => ancestors[..=std::cmp::min(d - 1, max_depth)].to_vec(),
                };
                expected.push(node.id.clone());
                let path = forest
                    .path_from_root(&node.id)
                    .expect("walked node has a path")
                    .into_iter()
                    .map(|n| n.id.clone())
                    .collect::<Vec<_>>();
                assert_eq!(path, expected);
            }
        })
}

#[test]
fn insertion_adds_exactly_one() {
    init_tracing();
    bolero::check!()
        .with_type::<(u8, u8, Vec<(u8, Option<u8>, u8)>)>()
        .for_each(|(k, target, raw)| {
            let max_depth = usize::from(k % 5);
            let forest = Forest::build(arbitrary_listing(raw), max_depth);
            let Some(target) = forest.walk().nth(usize::from(*target)).map(|n| n.id.clone())
            else {
                return;
            };
            let after = forest.insert_reply(&target, comment("new", None, 1000), max_depth);
            assert_eq!(after.count_all(), forest.count_all() + 1);
            check_levels(after.roots(), 0, max_depth);
            let placement = forest
                .placement_for(&target, max_depth)
                .expect("target is in the forest");
            let new = after.find(&CommentId::from("new")).expect("reply was inserted");
            assert_eq!(new.parent_comment_id, Some(placement.parent));
        })
}

#[test]
fn reaction_counters() {
    bolero::check!()
        .with_type::<(u8, u16, u16, bool)>()
        .for_each(|(reaction, positive, negative, want_positive)| {
            let reaction = match reaction % 3 {
                0 => Reaction::None,
                1 => Reaction::Positive,
                _ => Reaction::Negative,
            };
            // The viewer's own reaction is always counted
            let positive = u32::from(*positive) + u32::from(reaction == Reaction::Positive);
            let negative = u32::from(*negative) + u32::from(reaction == Reaction::Negative);
            let state = ReactionState::new(reaction, positive, negative);
            let want = match want_positive {
                true => ReactionKind::Positive,
                false => ReactionKind::Negative,
            };

            let next = state.transition(want).next;
            let total = i64::try_from(state.total()).expect("small total");
            let next_total = i64::try_from(next.total()).expect("small total");
            let delta = match (state.reaction, next.reaction) {
                (Reaction::None, _) => 1,
                (_, Reaction::None) => -1,
                _ => 0,
            };
            assert_eq!(next_total - total, delta);
            let same = matches!(
                (state.reaction, want),
                (Reaction::None, _)
                    | (Reaction::Positive, ReactionKind::Positive)
                    | (Reaction::Negative, ReactionKind::Negative)
            );
            if same {
                assert_eq!(next.transition(want).next, state);
            }
        })
}

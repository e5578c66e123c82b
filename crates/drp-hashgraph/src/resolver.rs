// Path: crates/drp-hashgraph/src/resolver.rs
//! Pluggable ordering for vertices the DAG leaves genuinely concurrent.
//!
//! The graph's topology only gives a partial order; two vertices with
//! disjoint dependency sets (neither an ancestor of the other) must
//! still end up in *some* total order before a `Drp` can replay them.
//! A [`ConflictResolver`] supplies that order, and may also decide that
//! one side of a concurrent pair should never be applied at all (e.g. a
//! revoke outranking a grant it targets) by returning a `Drop*` action
//! instead of an ordering.

use std::collections::HashSet;

use drp_types::Vertex;

/// Whether a resolver wants concurrent vertices one pair at a time or
/// as a single batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Semantics {
    /// Concurrent vertices are resolved two at a time, folded
    /// left-to-right.
    Pair,
    /// The whole concurrent set is handed to the resolver at once.
    Multiple,
}

/// The outcome of resolving exactly two concurrent vertices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PairAction {
    /// Keep `a` ordered before `b`; both survive.
    Nop,
    /// Order `b` before `a`; both survive.
    Swap,
    /// `a` is excised from history entirely; `b` survives.
    DropLeft,
    /// `b` is excised from history entirely; `a` survives.
    DropRight,
    /// Every hash listed is excised from history, regardless of which
    /// side of the pair it came from.
    Drop(Vec<String>),
}

/// The outcome of resolving a batch of mutually concurrent vertices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManyAction {
    /// An explicit total order over the surviving input hashes. Must be
    /// a subset permutation of the input (every listed hash must have
    /// been part of it, with no duplicates); anything from the input
    /// not listed is dropped.
    Order(Vec<String>),
    /// Excise exactly the listed hashes; everything else keeps its
    /// relative topological order.
    Drop(Vec<String>),
}

/// Orders vertices the hash graph's topology leaves concurrent.
pub trait ConflictResolver {
    /// Which resolution method this resolver wants called.
    fn semantics(&self) -> Semantics;

    /// Orders exactly two concurrent vertices. Called when
    /// `semantics() == Semantics::Pair`.
    fn resolve_pair(&self, a: &Vertex, b: &Vertex) -> PairAction;

    /// Orders a batch of mutually concurrent vertices. Called when
    /// `semantics() == Semantics::Multiple`.
    fn resolve_many(&self, concurrent: &[Vertex]) -> ManyAction;
}

/// Folds `vertices` pairwise through `resolve`, inserting each
/// candidate against the vertices already placed (most recent first)
/// until it finds where it belongs, swaps past, or gets dropped —
/// along with anything `resolve` says to drop alongside it.
///
/// Vertices are first sorted by `(timestamp asc, hash asc)`, the
/// baseline tie-break every pair resolver is entitled to assume: a
/// resolver that returns `Nop` for everything except a specific
/// conflict (as `ObjectAcl`'s does) relies on that order already being
/// correct rather than arrival order.
///
/// Shared between [`crate::HashGraph`]'s own `Semantics::Pair` handling
/// and any caller (e.g. a resolver that itself delegates to several
/// per-layer `Pair` resolvers) that needs the same fold without going
/// through a graph at all.
pub fn fold_pairwise(resolve: impl Fn(&Vertex, &Vertex) -> PairAction, vertices: &[Vertex]) -> Vec<String> {
    let mut sorted = vertices.to_vec();
    sorted.sort_by(|a, b| (a.timestamp, &a.hash).cmp(&(b.timestamp, &b.hash)));

    let mut ordered: Vec<Vertex> = Vec::new();
    let mut dropped: HashSet<String> = HashSet::new();

    for candidate in sorted {
        if dropped.contains(&candidate.hash) {
            continue;
        }
        let mut insert_at = ordered.len();
        let mut candidate_dropped = false;
        while insert_at > 0 {
            let a = &ordered[insert_at - 1];
            match resolve(a, &candidate) {
                PairAction::Nop => break,
                PairAction::Swap => insert_at -= 1,
                PairAction::DropLeft => {
                    dropped.insert(a.hash.clone());
                    ordered.remove(insert_at - 1);
                    insert_at -= 1;
                }
                PairAction::DropRight => {
                    dropped.insert(candidate.hash.clone());
                    candidate_dropped = true;
                    break;
                }
                PairAction::Drop(hashes) => {
                    candidate_dropped = hashes.contains(&candidate.hash);
                    dropped.extend(hashes);
                    break;
                }
            }
        }
        if !candidate_dropped {
            ordered.insert(insert_at, candidate);
        }
    }

    ordered.into_iter().map(|v| v.hash).filter(|h| !dropped.contains(h)).collect()
}

/// Turns a resolver's [`ManyAction`] into a concrete hash order over
/// `vertices`, falling back to ascending `(timestamp, hash)` if
/// `Order` doesn't name a valid subset permutation of the batch.
///
/// Shared between [`crate::HashGraph`]'s own `Semantics::Multiple`
/// handling and any caller that composes several `Multiple` resolvers
/// over disjoint partitions of a concurrent batch.
pub fn apply_many_action(action: ManyAction, vertices: &[Vertex]) -> Vec<String> {
    match action {
        ManyAction::Order(order) => {
            let seen: HashSet<&String> = order.iter().collect();
            let all_known = order.iter().all(|h| vertices.iter().any(|v| &v.hash == h));
            if seen.len() == order.len() && all_known {
                order
            } else {
                let mut fallback: Vec<&Vertex> = vertices.iter().collect();
                fallback.sort_by(|a, b| (a.timestamp, &a.hash).cmp(&(b.timestamp, &b.hash)));
                fallback.into_iter().map(|v| v.hash.clone()).collect()
            }
        }
        ManyAction::Drop(hashes) => {
            let dropped: HashSet<String> = hashes.into_iter().collect();
            let mut remaining: Vec<&Vertex> = vertices.iter().filter(|v| !dropped.contains(&v.hash)).collect();
            remaining.sort_by(|a, b| (a.timestamp, &a.hash).cmp(&(b.timestamp, &b.hash)));
            remaining.into_iter().map(|v| v.hash.clone()).collect()
        }
    }
}

/// The default resolver: orders concurrent vertices by ascending
/// timestamp, breaking exact ties by ascending hash so the order is
/// still deterministic between peers with clocks that collide. Never
/// drops anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimestampResolver;

impl ConflictResolver for TimestampResolver {
    fn semantics(&self) -> Semantics {
        Semantics::Multiple
    }

    fn resolve_pair(&self, a: &Vertex, b: &Vertex) -> PairAction {
        if (a.timestamp, &a.hash) <= (b.timestamp, &b.hash) {
            PairAction::Nop
        } else {
            PairAction::Swap
        }
    }

    fn resolve_many(&self, concurrent: &[Vertex]) -> ManyAction {
        let mut keyed: Vec<(u64, String)> = concurrent
            .iter()
            .map(|v| (v.timestamp, v.hash.clone()))
            .collect();
        keyed.sort();
        ManyAction::Order(keyed.into_iter().map(|(_, h)| h).collect())
    }
}

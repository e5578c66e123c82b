// Path: crates/drp-hashgraph/src/graph.rs
//! The causal DAG itself: storage, the frontier, topological order, LCA,
//! and conflict-resolved linearization.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use drp_bitset::BitSet;
use drp_types::Vertex;

use crate::error::HashGraphError;
use crate::resolver::{apply_many_action, fold_pairwise, ConflictResolver, Semantics};

/// A causally-ordered DAG of signed operation vertices.
///
/// Every vertex but the synthetic root must name at least one
/// dependency already present in the graph (invariant G1); because of
/// that requirement, insertion order is always a valid topological
/// order, so `HashGraph` never needs to re-sort on insert — it only
/// needs to remember that order.
pub struct HashGraph<R: ConflictResolver> {
    vertices: HashMap<String, Vertex>,
    forward_edges: HashMap<String, Vec<String>>,
    frontier: HashSet<String>,
    topo_order: Vec<String>,
    topo_index: HashMap<String, usize>,
    ancestor_cache: Mutex<HashMap<String, BitSet>>,
    resolver: R,
    max_skew_ms: u64,
}

impl<R: ConflictResolver> HashGraph<R> {
    /// Creates a new hash graph seeded with the synthetic root vertex.
    /// `max_skew_ms` bounds how far behind a dependency's timestamp a
    /// dependent vertex's own timestamp may be (invariant H2), since
    /// peer clocks are never perfectly synchronized.
    pub fn new(resolver: R, max_skew_ms: u64) -> Self {
        let root = Vertex::root();
        let mut graph = Self {
            vertices: HashMap::new(),
            forward_edges: HashMap::new(),
            frontier: HashSet::new(),
            topo_order: Vec::new(),
            topo_index: HashMap::new(),
            ancestor_cache: Mutex::new(HashMap::new()),
            resolver,
            max_skew_ms,
        };
        graph.insert_unchecked(root);
        graph
    }

    fn insert_unchecked(&mut self, vertex: Vertex) {
        let hash = vertex.hash.clone();
        let index = self.topo_order.len();
        self.topo_order.push(hash.clone());
        self.topo_index.insert(hash.clone(), index);
        for dep in &vertex.dependencies {
            self.forward_edges.entry(dep.clone()).or_default().push(hash.clone());
            self.frontier.remove(dep);
        }
        self.forward_edges.entry(hash.clone()).or_default();
        self.frontier.insert(hash.clone());
        self.vertices.insert(hash, vertex);
    }

    /// Inserts a vertex, enforcing G1 (dependencies exist), a
    /// self-dependency cycle check, and H2 (a dependent's timestamp
    /// can't trail a dependency's by more than `max_skew_ms`). Callers
    /// should run [`crate::validate_vertex`] first for the vertex-local
    /// invariants H1/H3.
    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<(), HashGraphError> {
        if self.vertices.contains_key(&vertex.hash) {
            return Err(HashGraphError::AlreadyPresent(vertex.hash));
        }
        if vertex.dependencies.is_empty() {
            return Err(HashGraphError::MissingDependency {
                vertex: vertex.hash.clone(),
                dependency: "<none given>".into(),
            });
        }
        if vertex.dependencies.contains(&vertex.hash) {
            return Err(HashGraphError::CycleDetected(vertex.hash));
        }
        for dep in &vertex.dependencies {
            let dep_vertex = self.vertices.get(dep).ok_or_else(|| HashGraphError::MissingDependency {
                vertex: vertex.hash.clone(),
                dependency: dep.clone(),
            })?;
            let skewed_floor = dep_vertex.timestamp.saturating_sub(self.max_skew_ms);
            if !dep_vertex.is_root() && vertex.timestamp < skewed_floor {
                return Err(HashGraphError::InvalidTimestamp {
                    vertex: vertex.hash.clone(),
                });
            }
        }
        self.insert_unchecked(vertex);
        Ok(())
    }

    /// Looks up a vertex by hash.
    pub fn get_vertex(&self, hash: &str) -> Option<&Vertex> {
        self.vertices.get(hash)
    }

    /// The current frontier: vertices with no recorded children yet.
    pub fn frontier(&self) -> Vec<String> {
        let mut tips: Vec<String> = self.frontier.iter().cloned().collect();
        tips.sort();
        tips
    }

    /// The vertices that immediately depend on `hash`.
    pub fn forward_edges(&self, hash: &str) -> Vec<String> {
        self.forward_edges.get(hash).cloned().unwrap_or_default()
    }

    /// The number of vertices stored, including the root.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True if only the root is present.
    pub fn is_empty(&self) -> bool {
        self.vertices.len() <= 1
    }

    fn ancestors_bitset(&self, hash: &str) -> Result<BitSet, HashGraphError> {
        if let Some(cached) = self.ancestor_cache.lock().unwrap().get(hash) {
            return Ok(cached.clone());
        }
        let index = *self
            .topo_index
            .get(hash)
            .ok_or_else(|| HashGraphError::UnknownVertex(hash.to_string()))?;
        let mut bits = BitSet::new(self.topo_order.len());
        if bits.set(index).is_err() {
            return Err(HashGraphError::UnknownVertex(hash.to_string()));
        }
        let deps = self
            .vertices
            .get(hash)
            .map(|v| v.dependencies.clone())
            .unwrap_or_default();
        for dep in deps {
            let dep_bits = self.ancestors_bitset(&dep)?;
            bits = bits.or(&dep_bits);
        }
        self.ancestor_cache.lock().unwrap().insert(hash.to_string(), bits.clone());
        Ok(bits)
    }

    /// True if `a` and `b` are the same vertex or one is a (transitive)
    /// ancestor of the other.
    pub fn are_causally_related(&self, a: &str, b: &str) -> Result<bool, HashGraphError> {
        if a == b {
            return Ok(true);
        }
        let a_idx = *self
            .topo_index
            .get(a)
            .ok_or_else(|| HashGraphError::UnknownVertex(a.to_string()))?;
        let b_idx = *self
            .topo_index
            .get(b)
            .ok_or_else(|| HashGraphError::UnknownVertex(b.to_string()))?;
        let a_ancestors = self.ancestors_bitset(a)?;
        let b_ancestors = self.ancestors_bitset(b)?;
        Ok(a_ancestors.get(b_idx).unwrap_or(false) || b_ancestors.get(a_idx).unwrap_or(false))
    }

    /// True if `ancestor` is `descendant` itself or one of its
    /// transitive dependencies. Lets a peer answer "does the other side
    /// already have this vertex" from nothing but the other side's
    /// frontier, without walking dependency edges by hand.
    pub fn is_ancestor_of(&self, ancestor: &str, descendant: &str) -> Result<bool, HashGraphError> {
        let idx = *self
            .topo_index
            .get(ancestor)
            .ok_or_else(|| HashGraphError::UnknownVertex(ancestor.to_string()))?;
        let bits = self.ancestors_bitset(descendant)?;
        Ok(bits.get(idx).unwrap_or(false))
    }

    /// The lowest (most recent) common ancestor of the given vertices —
    /// the common ancestor with the greatest topological index — paired
    /// with the conflict-resolved linear order of every vertex strictly
    /// between that ancestor (exclusive) and `hashes` (inclusive).
    ///
    /// Empty `hashes` yields the graph root with nothing between.
    pub fn lowest_common_ancestor(&self, hashes: &[String]) -> Result<(String, Vec<String>), HashGraphError> {
        if hashes.is_empty() {
            return Ok((drp_codec::ROOT_HASH.to_string(), Vec::new()));
        }
        let mut common = self.ancestors_bitset(&hashes[0])?;
        for h in &hashes[1..] {
            common = common.and(&self.ancestors_bitset(h)?);
        }
        let mut best: Option<(usize, &str)> = None;
        for (hash, idx) in &self.topo_index {
            if common.get(*idx).unwrap_or(false)
                && best.map(|(best_idx, _)| *idx > best_idx).unwrap_or(true)
            {
                best = Some((*idx, hash));
            }
        }
        let lca = best
            .map(|(_, hash)| hash.to_string())
            .ok_or_else(|| HashGraphError::UnknownVertex("no common ancestor found".into()))?;
        let between = self.linearized_between(&lca, hashes)?;
        Ok((lca, between))
    }

    /// The linearized order of every vertex reachable from `frontier`
    /// but not reachable from `lca` (i.e. not one of `lca`'s own
    /// ancestors or `lca` itself).
    fn linearized_between(&self, lca: &str, frontier: &[String]) -> Result<Vec<String>, HashGraphError> {
        let full = self.linearize_vertices(frontier)?;
        let lca_ancestors = self.ancestors_bitset(lca)?;
        Ok(full
            .into_iter()
            .filter(|h| {
                let idx = self.topo_index.get(h).copied().unwrap_or(usize::MAX);
                !lca_ancestors.get(idx).unwrap_or(false)
            })
            .collect())
    }

    fn resolve_batch(&self, batch: &[String]) -> Vec<String> {
        if batch.len() <= 1 {
            return batch.to_vec();
        }
        let vertices: Vec<Vertex> = batch.iter().filter_map(|h| self.vertices.get(h).cloned()).collect();
        match self.resolver.semantics() {
            Semantics::Pair => fold_pairwise(|a, b| self.resolver.resolve_pair(a, b), &vertices),
            Semantics::Multiple => apply_many_action(self.resolver.resolve_many(&vertices), &vertices),
        }
    }

    /// Produces a single total order over every ancestor of `frontier`
    /// (inclusive), resolving any vertices the DAG leaves concurrent
    /// via the configured [`ConflictResolver`]. A resolver that drops a
    /// vertex removes it from the returned order entirely.
    pub fn linearize_vertices(&self, frontier: &[String]) -> Result<Vec<String>, HashGraphError> {
        let mut subset_bits = BitSet::new(self.topo_order.len());
        for h in frontier {
            subset_bits = subset_bits.or(&self.ancestors_bitset(h)?);
        }
        let subset: Vec<String> = self
            .topo_order
            .iter()
            .enumerate()
            .filter(|(i, _)| subset_bits.get(*i).unwrap_or(false))
            .map(|(_, h)| h.clone())
            .collect();
        let subset_set: HashSet<&String> = subset.iter().collect();

        let mut in_degree: HashMap<String, usize> = HashMap::new();
        for h in &subset {
            let count = self
                .vertices
                .get(h)
                .map(|v| v.dependencies.iter().filter(|d| subset_set.contains(d)).count())
                .unwrap_or(0);
            in_degree.insert(h.clone(), count);
        }

        let mut ready: Vec<String> = subset
            .iter()
            .filter(|h| in_degree.get(*h).copied().unwrap_or(0) == 0)
            .cloned()
            .collect();
        ready.sort_by_key(|h| self.topo_index.get(h).copied().unwrap_or(usize::MAX));

        let mut order = Vec::with_capacity(subset.len());
        while !ready.is_empty() {
            let batch = std::mem::take(&mut ready);
            let ordered_batch = self.resolve_batch(&batch);
            for h in &batch {
                for child in self.forward_edges.get(h).cloned().unwrap_or_default() {
                    if !subset_set.contains(&child) {
                        continue;
                    }
                    if let Some(deg) = in_degree.get_mut(&child) {
                        *deg = deg.saturating_sub(1);
                        if *deg == 0 {
                            ready.push(child);
                        }
                    }
                }
            }
            order.extend(ordered_batch);
            ready.sort_by_key(|h| self.topo_index.get(h).copied().unwrap_or(usize::MAX));
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::TimestampResolver;
    use drp_codec::{Value, ROOT_HASH};
    use drp_types::{DrpType, Operation};

    const SKEW: u64 = 0;

    fn op_vertex(peer: &str, deps: Vec<String>, ts: u64, kind: &str, arg: i64) -> Vertex {
        Vertex::new(peer, Operation::new(DrpType::Drp, kind, vec![Value::Int(arg)]), deps, ts)
    }

    #[test]
    fn fresh_graph_has_only_the_root_in_its_frontier() {
        let graph: HashGraph<TimestampResolver> = HashGraph::new(TimestampResolver, SKEW);
        assert_eq!(graph.frontier(), vec![ROOT_HASH.to_string()]);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn adding_a_vertex_advances_the_frontier() {
        let mut graph = HashGraph::new(TimestampResolver, SKEW);
        let v = op_vertex("p1", vec![ROOT_HASH.to_string()], 100, "add", 1);
        let hash = v.hash.clone();
        graph.add_vertex(v).unwrap();
        assert_eq!(graph.frontier(), vec![hash]);
    }

    #[test]
    fn missing_dependency_is_rejected() {
        let mut graph = HashGraph::new(TimestampResolver, SKEW);
        let v = op_vertex("p1", vec!["nonexistent".into()], 100, "add", 1);
        assert!(matches!(
            graph.add_vertex(v),
            Err(HashGraphError::MissingDependency { .. })
        ));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut graph = HashGraph::new(TimestampResolver, SKEW);
        let mut v = op_vertex("p1", vec![ROOT_HASH.to_string()], 100, "add", 1);
        let self_hash = v.hash.clone();
        v.dependencies.push(self_hash);
        assert!(matches!(graph.add_vertex(v), Err(HashGraphError::CycleDetected(_))));
    }

    #[test]
    fn a_dependent_timestamp_within_skew_of_its_dependency_is_accepted() {
        let mut graph = HashGraph::new(TimestampResolver, 50);
        let base = op_vertex("p1", vec![ROOT_HASH.to_string()], 1000, "add", 1);
        let base_hash = base.hash.clone();
        graph.add_vertex(base).unwrap();
        let child = op_vertex("p2", vec![base_hash], 960, "add", 2);
        assert!(graph.add_vertex(child).is_ok());
    }

    #[test]
    fn a_dependent_timestamp_beyond_skew_is_rejected() {
        let mut graph = HashGraph::new(TimestampResolver, 50);
        let base = op_vertex("p1", vec![ROOT_HASH.to_string()], 1000, "add", 1);
        let base_hash = base.hash.clone();
        graph.add_vertex(base).unwrap();
        let child = op_vertex("p2", vec![base_hash], 900, "add", 2);
        assert!(matches!(
            graph.add_vertex(child),
            Err(HashGraphError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn lca_of_two_forked_branches_is_their_shared_parent() {
        let mut graph = HashGraph::new(TimestampResolver, SKEW);
        let base = op_vertex("p1", vec![ROOT_HASH.to_string()], 100, "add", 1);
        let base_hash = base.hash.clone();
        graph.add_vertex(base).unwrap();

        let left = op_vertex("p1", vec![base_hash.clone()], 200, "add", 2);
        let left_hash = left.hash.clone();
        graph.add_vertex(left).unwrap();

        let right = op_vertex("p2", vec![base_hash.clone()], 201, "add", 3);
        let right_hash = right.hash.clone();
        graph.add_vertex(right).unwrap();

        let (lca, between) = graph.lowest_common_ancestor(&[left_hash.clone(), right_hash.clone()]).unwrap();
        assert_eq!(lca, base_hash);
        assert_eq!(between.len(), 2);
        assert!(between.contains(&left_hash));
        assert!(between.contains(&right_hash));
    }

    #[test]
    fn lca_of_a_single_hash_has_nothing_between() {
        let mut graph = HashGraph::new(TimestampResolver, SKEW);
        let base = op_vertex("p1", vec![ROOT_HASH.to_string()], 100, "add", 1);
        let base_hash = base.hash.clone();
        graph.add_vertex(base).unwrap();

        let (lca, between) = graph.lowest_common_ancestor(&[base_hash.clone()]).unwrap();
        assert_eq!(lca, base_hash);
        assert!(between.is_empty());
    }

    #[test]
    fn causally_related_chain_is_detected() {
        let mut graph = HashGraph::new(TimestampResolver, SKEW);
        let a = op_vertex("p1", vec![ROOT_HASH.to_string()], 100, "add", 1);
        let a_hash = a.hash.clone();
        graph.add_vertex(a).unwrap();
        let b = op_vertex("p1", vec![a_hash.clone()], 200, "add", 2);
        let b_hash = b.hash.clone();
        graph.add_vertex(b).unwrap();

        assert!(graph.are_causally_related(&a_hash, &b_hash).unwrap());
    }

    #[test]
    fn concurrent_forks_are_not_causally_related() {
        let mut graph = HashGraph::new(TimestampResolver, SKEW);
        let left = op_vertex("p1", vec![ROOT_HASH.to_string()], 100, "add", 1);
        let left_hash = left.hash.clone();
        graph.add_vertex(left).unwrap();
        let right = op_vertex("p2", vec![ROOT_HASH.to_string()], 101, "add", 2);
        let right_hash = right.hash.clone();
        graph.add_vertex(right).unwrap();

        assert!(!graph.are_causally_related(&left_hash, &right_hash).unwrap());
    }

    #[test]
    fn linearization_orders_concurrent_vertices_by_timestamp() {
        let mut graph = HashGraph::new(TimestampResolver, SKEW);
        let early = op_vertex("p2", vec![ROOT_HASH.to_string()], 50, "add", 2);
        let early_hash = early.hash.clone();
        let late = op_vertex("p1", vec![ROOT_HASH.to_string()], 100, "add", 1);
        let late_hash = late.hash.clone();
        // Insert in reverse-timestamp order to prove linearization, not
        // insertion order, decides the final sequence.
        graph.add_vertex(late.clone()).unwrap();
        graph.add_vertex(early.clone()).unwrap();

        let order = graph
            .linearize_vertices(&[late_hash.clone(), early_hash.clone()])
            .unwrap();
        let early_pos = order.iter().position(|h| h == &early_hash).unwrap();
        let late_pos = order.iter().position(|h| h == &late_hash).unwrap();
        assert!(early_pos < late_pos);
        assert_eq!(order[0], ROOT_HASH.to_string());
    }

    #[test]
    fn is_ancestor_of_recognizes_transitive_dependencies_but_not_forks() {
        let mut graph = HashGraph::new(TimestampResolver, SKEW);
        let a = op_vertex("p1", vec![ROOT_HASH.to_string()], 100, "add", 1);
        let a_hash = a.hash.clone();
        graph.add_vertex(a).unwrap();
        let b = op_vertex("p1", vec![a_hash.clone()], 200, "add", 2);
        let b_hash = b.hash.clone();
        graph.add_vertex(b).unwrap();
        let fork = op_vertex("p2", vec![ROOT_HASH.to_string()], 150, "add", 3);
        let fork_hash = fork.hash.clone();
        graph.add_vertex(fork).unwrap();

        assert!(graph.is_ancestor_of(&a_hash, &b_hash).unwrap());
        assert!(graph.is_ancestor_of(ROOT_HASH, &fork_hash).unwrap());
        assert!(!graph.is_ancestor_of(&fork_hash, &b_hash).unwrap());
    }

    #[test]
    fn linearization_is_deterministic_regardless_of_insertion_order() {
        let ops = vec![("p1", 300, "add", 3), ("p2", 100, "add", 1), ("p3", 200, "add", 2)];

        let mut graph_a = HashGraph::new(TimestampResolver, SKEW);
        let mut hashes_a = Vec::new();
        for (peer, ts, kind, arg) in &ops {
            let v = op_vertex(peer, vec![ROOT_HASH.to_string()], *ts, kind, *arg);
            hashes_a.push(v.hash.clone());
            graph_a.add_vertex(v).unwrap();
        }

        let mut graph_b = HashGraph::new(TimestampResolver, SKEW);
        let mut hashes_b = Vec::new();
        for (peer, ts, kind, arg) in ops.iter().rev() {
            let v = op_vertex(peer, vec![ROOT_HASH.to_string()], *ts, kind, *arg);
            hashes_b.push(v.hash.clone());
            graph_b.add_vertex(v).unwrap();
        }

        let order_a = graph_a.linearize_vertices(&hashes_a).unwrap();
        let order_b = graph_b.linearize_vertices(&hashes_b).unwrap();
        assert_eq!(order_a, order_b);
    }
}

//! Referential integrity for step graphs
//!
//! Three deterministic repairs run in order:
//! 1. drop steps whose id was already seen
//! 2. drop dependency references to the step itself or to unknown steps
//! 3. drop every dependency edge that closes a cycle
//!
//! None of them can fail. The result always admits a topological order.

use crate::schema::DecompositionDraft;
use decomp_model::Step;
use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashSet;

/// One dependency reference: `step` depends on `dependency`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyEdge {
    /// Step owning the dependency list
    pub step: String,
    /// Referenced step id
    pub dependency: String,
}

impl DependencyEdge {
    fn new(step: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            dependency: dependency.into(),
        }
    }
}

/// What the integrity pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// Ids of steps dropped as later duplicates
    pub duplicate_ids: Vec<String>,
    /// Steps that listed themselves as a dependency
    pub self_references: Vec<String>,
    /// References to steps that do not exist
    pub dangling_references: Vec<DependencyEdge>,
    /// Repeated entries within one dependency list
    pub repeated_references: Vec<DependencyEdge>,
    /// Edges removed to break cycles
    pub cycle_edges_removed: Vec<DependencyEdge>,
    /// Gap step references that did not resolve
    pub gap_references_pruned: usize,
}

impl IntegrityReport {
    /// Whether nothing needed repair
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.repair_count() == 0
    }

    /// Total number of individual repairs
    #[must_use]
    pub fn repair_count(&self) -> usize {
        self.duplicate_ids.len()
            + self.self_references.len()
            + self.dangling_references.len()
            + self.repeated_references.len()
            + self.cycle_edges_removed.len()
            + self.gap_references_pruned
    }
}

/// Adjacency list over step ids, in step order
///
/// Edges point from a step to the steps it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    adjacency: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl DependencyGraph {
    /// Build from steps
    ///
    /// The first step with a given id wins; references to unknown ids are
    /// not represented.
    #[must_use]
    pub fn from_steps(steps: &[Step]) -> Self {
        let mut adjacency: IndexMap<String, Vec<String>> = IndexMap::with_capacity(steps.len());
        for step in steps {
            adjacency
                .entry(step.id.clone())
                .or_insert_with(|| step.dependencies.clone());
        }
        let known: HashSet<String> = adjacency.keys().cloned().collect();
        for deps in adjacency.values_mut() {
            deps.retain(|d| known.contains(d));
        }
        Self { adjacency }
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of dependency edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Dependencies of a step
    #[must_use]
    pub fn dependencies(&self, id: &str) -> Option<&[String]> {
        self.adjacency.get(id).map(Vec::as_slice)
    }

    /// One depth-first pass in step order, returning every edge that points
    /// back into the current recursion stack
    #[must_use]
    pub fn back_edges(&self) -> Vec<DependencyEdge> {
        let targets: Vec<Vec<usize>> = self
            .adjacency
            .values()
            .map(|deps| {
                deps.iter()
                    .filter_map(|d| self.adjacency.get_index_of(d))
                    .collect()
            })
            .collect();

        let mut marks = vec![Mark::Unvisited; targets.len()];
        let mut found = Vec::new();

        for root in 0..targets.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::OnStack;
            let mut stack = vec![(root, 0usize)];

            while let Some(frame) = stack.last_mut() {
                let (node, cursor) = *frame;
                if let Some(&next) = targets[node].get(cursor) {
                    frame.1 += 1;
                    match marks[next] {
                        Mark::Unvisited => {
                            marks[next] = Mark::OnStack;
                            stack.push((next, 0));
                        }
                        Mark::OnStack => found.push(self.edge_at(node, next)),
                        Mark::Done => {}
                    }
                } else {
                    marks[node] = Mark::Done;
                    stack.pop();
                }
            }
        }

        found
    }

    fn edge_at(&self, from: usize, to: usize) -> DependencyEdge {
        let key = |i: usize| {
            self.adjacency
                .get_index(i)
                .map(|(id, _)| id.clone())
                .unwrap_or_default()
        };
        DependencyEdge::new(key(from), key(to))
    }

    /// Remove back-edges until a full pass finds none
    ///
    /// Returns the acyclic graph and the removed edges in removal order.
    #[must_use]
    pub fn break_cycles(mut self) -> (Self, Vec<DependencyEdge>) {
        let mut removed = Vec::new();
        loop {
            let back = self.back_edges();
            if back.is_empty() {
                break;
            }
            for edge in back {
                if let Some(deps) = self.adjacency.get_mut(&edge.step) {
                    deps.retain(|d| *d != edge.dependency);
                }
                removed.push(edge);
            }
        }
        (self, removed)
    }

    /// Steps ordered so every dependency precedes its dependents
    ///
    /// Returns `None` if the graph has a cycle.
    #[must_use]
    pub fn topological_order(&self) -> Option<Vec<String>> {
        let mut graph = DiGraphMap::<usize, ()>::with_capacity(self.node_count(), self.edge_count());
        for i in 0..self.adjacency.len() {
            graph.add_node(i);
        }
        for (i, deps) in self.adjacency.values().enumerate() {
            for dep in deps {
                if let Some(j) = self.adjacency.get_index_of(dep) {
                    graph.add_edge(j, i, ());
                }
            }
        }

        let order = toposort(&graph, None).ok()?;
        Some(
            order
                .into_iter()
                .filter_map(|i| self.adjacency.get_index(i).map(|(id, _)| id.clone()))
                .collect(),
        )
    }

    /// Whether the graph has no cycle
    #[inline]
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        self.back_edges().is_empty()
    }
}

/// Dedup steps, prune references and break cycles
#[must_use]
pub fn enforce_integrity(mut draft: DecompositionDraft) -> (DecompositionDraft, IntegrityReport) {
    let mut report = IntegrityReport::default();

    // 1. dedup, first occurrence wins
    let mut seen = HashSet::with_capacity(draft.steps.len());
    draft.steps.retain(|step| {
        if seen.insert(step.id.clone()) {
            true
        } else {
            report.duplicate_ids.push(step.id.clone());
            false
        }
    });

    // 2. prune self, dangling and repeated references
    let known: HashSet<String> = draft.steps.iter().map(|s| s.id.clone()).collect();
    for step in &mut draft.steps {
        let mut kept: Vec<String> = Vec::with_capacity(step.dependencies.len());
        for dep in std::mem::take(&mut step.dependencies) {
            if dep == step.id {
                report.self_references.push(step.id.clone());
            } else if !known.contains(&dep) {
                report.dangling_references.push(DependencyEdge::new(&step.id, dep));
            } else if kept.contains(&dep) {
                report.repeated_references.push(DependencyEdge::new(&step.id, dep));
            } else {
                kept.push(dep);
            }
        }
        step.dependencies = kept;
    }

    // 3. break cycles
    let (_, removed) = DependencyGraph::from_steps(&draft.steps).break_cycles();
    for edge in &removed {
        if let Some(step) = draft.steps.iter_mut().find(|s| s.id == edge.step) {
            step.dependencies.retain(|d| *d != edge.dependency);
        }
    }
    report.cycle_edges_removed = removed;

    for gap in &mut draft.gaps {
        let before = gap.step_ids.len();
        let mut seen_ids = HashSet::with_capacity(before);
        gap.step_ids
            .retain(|id| known.contains(id) && seen_ids.insert(id.clone()));
        report.gap_references_pruned += before - gap.step_ids.len();
    }

    log_report(&report);
    (draft, report)
}

fn log_report(report: &IntegrityReport) {
    if report.is_clean() {
        return;
    }
    for id in &report.duplicate_ids {
        tracing::warn!(step_id = %id, "dropped duplicate step");
    }
    for id in &report.self_references {
        tracing::warn!(step_id = %id, "removed self dependency");
    }
    for edge in &report.dangling_references {
        tracing::warn!(step_id = %edge.step, dependency = %edge.dependency, "removed dangling dependency");
    }
    for edge in &report.repeated_references {
        tracing::warn!(step_id = %edge.step, dependency = %edge.dependency, "collapsed repeated dependency");
    }
    for edge in &report.cycle_edges_removed {
        tracing::warn!(step_id = %edge.step, dependency = %edge.dependency, "removed cycle-closing dependency");
    }
    if report.gap_references_pruned > 0 {
        tracing::warn!(count = report.gap_references_pruned, "pruned unresolved gap step references");
    }
    metrics::counter!("decomp_integrity_repairs_total").increment(report.repair_count() as u64);
}

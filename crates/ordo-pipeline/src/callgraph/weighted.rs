//! Weighted call-graph generation.
//!
//! Every notification gets a weight: one more than the heaviest notification
//! it must follow. Weights are relaxed until stable, which also detects
//! cycles: in a cyclic graph weights keep growing and never settle within
//! `n + 1` sweeps.
//!
//! The order is then produced by a walk starting at the bootstrap. A
//! notification is placed once every predecessor is placed, pulling in
//! unplaced predecessors first. After placing a notification the walk
//! descends into the notifications that declared `after` it, lightest first.
//! This keeps dependent chains together:
//!
//! ```text
//! W after Begin, V after W, U before W, T after U
//!
//! Begin ─→ W ─→ V         order: Begin, U, T, W, V
//!          ↑
//!          U ─→ T
//! ```

use super::{CallGraph, CallGraphGenerator, DependencyGraph};
use crate::error::PipelineError;
use crate::notification::NotificationRegistry;
use tracing::debug;

/// Orders notifications by relaxed weight and dependency walk.
///
/// This is the default generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedCallGraphGenerator;

impl CallGraphGenerator for WeightedCallGraphGenerator {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn generate(&self, registry: &NotificationRegistry) -> Result<CallGraph, PipelineError> {
        let graph = DependencyGraph::build(registry)?;
        let weights = relax(&graph).ok_or_else(|| graph.cycle_error(registry))?;
        debug!(weights = ?weights, "Relaxed notification weights");

        let mut walk = Walk {
            graph: &graph,
            weights: &weights,
            marks: vec![Mark::Unvisited; graph.len()],
            order: Vec::with_capacity(graph.len()),
        };
        // Nodes deferred behind a pending predecessor are picked up by a later pass.
        loop {
            let placed = walk.order.len();
            for node in 0..graph.len() {
                walk.visit(node);
            }
            if walk.order.len() == graph.len() || walk.order.len() == placed {
                break;
            }
        }

        if walk.order.len() != graph.len() {
            return Err(graph.cycle_error(registry));
        }
        Ok(CallGraph::from_order(registry, &walk.order, self.name()))
    }
}

/// Returns stable weights, or `None` if they never settle.
fn relax(graph: &DependencyGraph) -> Option<Vec<usize>> {
    let mut weights = vec![0_usize; graph.len()];
    for _ in 0..=graph.len() {
        let mut changed = false;
        for node in 0..graph.len() {
            for &pred in graph.predecessors(node) {
                let required = weights[pred] + 1;
                if weights[node] < required {
                    weights[node] = required;
                    changed = true;
                }
            }
        }
        if !changed {
            return Some(weights);
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Pending,
    Settled,
}

struct Walk<'g> {
    graph: &'g DependencyGraph,
    weights: &'g [usize],
    marks: Vec<Mark>,
    order: Vec<usize>,
}

impl Walk<'_> {
    fn visit(&mut self, node: usize) {
        if self.marks[node] != Mark::Unvisited {
            return;
        }
        self.marks[node] = Mark::Pending;

        for pred in self.by_weight(self.graph.predecessors(node)) {
            if self.marks[pred] == Mark::Unvisited {
                self.visit(pred);
            }
            // A pending predecessor is further up the walk; retry later.
            if self.marks[pred] != Mark::Settled {
                self.marks[node] = Mark::Unvisited;
                return;
            }
        }

        self.marks[node] = Mark::Settled;
        self.order.push(node);

        for follower in self.by_weight(self.graph.followers(node)) {
            self.visit(follower);
        }
    }

    fn by_weight(&self, nodes: &[usize]) -> Vec<usize> {
        let mut sorted = nodes.to_vec();
        sorted.sort_by_key(|&n| (self.weights[n], n));
        sorted
    }
}

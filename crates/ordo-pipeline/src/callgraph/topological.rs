//! Topological call-graph generation.

use super::{CallGraph, CallGraphGenerator, DependencyGraph};
use crate::error::PipelineError;
use crate::notification::NotificationRegistry;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Orders notifications with Kahn's algorithm.
///
/// Among notifications whose predecessors have all been placed, the one
/// registered first runs first.
#[derive(Debug, Default, Clone, Copy)]
pub struct TopologicalCallGraphGenerator;

impl CallGraphGenerator for TopologicalCallGraphGenerator {
    fn name(&self) -> &'static str {
        "topological"
    }

    fn generate(&self, registry: &NotificationRegistry) -> Result<CallGraph, PipelineError> {
        let graph = DependencyGraph::build(registry)?;

        let mut in_degree: Vec<usize> = (0..graph.len())
            .map(|node| graph.predecessors(node).len())
            .collect();
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(node, _)| Reverse(node))
            .collect();

        let mut order = Vec::with_capacity(graph.len());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for &next in graph.successors(node) {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() != graph.len() {
            return Err(graph.cycle_error(registry));
        }
        Ok(CallGraph::from_order(registry, &order, self.name()))
    }
}

//! Call-graph generation.
//!
//! A generator turns a [`NotificationRegistry`] into a [`CallGraph`]: the
//! fixed order in which notifications are invoked for every request.
//!
//! Two strategies exist:
//!
//! | Strategy | Generator | Tie-break between unrelated notifications |
//! |----------|-----------|-------------------------------------------|
//! | `weighted` (default) | [`WeightedCallGraphGenerator`] | depth-first from the bootstrap, lightest dependent first |
//! | `topological` | [`TopologicalCallGraphGenerator`] | earliest registration first |
//!
//! Both honor every constraint, place the bootstrap first and report cycles
//! as [`PipelineError::Cycle`].

mod topological;
mod weighted;

pub use topological::TopologicalCallGraphGenerator;
pub use weighted::WeightedCallGraphGenerator;

use crate::constraint::ConstraintKind;
use crate::error::PipelineError;
use crate::notification::{Action, Notification, NotificationRegistry};
use ordo_core::{stages, CallGraphStrategy, ContributorKey};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builds a call graph from registered notifications.
pub trait CallGraphGenerator: Send + Sync {
    /// Returns the generator name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Orders the notifications of `registry`.
    ///
    /// The registry is expected to hold the bootstrap notification at index 0.
    fn generate(&self, registry: &NotificationRegistry) -> Result<CallGraph, PipelineError>;
}

/// Returns the generator implementing `strategy`.
#[must_use]
pub fn generator_for(strategy: CallGraphStrategy) -> Arc<dyn CallGraphGenerator> {
    match strategy {
        CallGraphStrategy::Weighted => Arc::new(WeightedCallGraphGenerator),
        CallGraphStrategy::Topological => Arc::new(TopologicalCallGraphGenerator),
    }
}

/// One entry of a call graph.
#[derive(Clone)]
pub struct ContributorCall {
    notification: Notification,
}

impl ContributorCall {
    /// Returns the underlying notification.
    #[must_use]
    pub const fn notification(&self) -> &Notification {
        &self.notification
    }

    /// Returns the owning contributor's key.
    #[must_use]
    pub const fn owner(&self) -> ContributorKey {
        self.notification.owner()
    }

    /// Returns the owning contributor's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.notification.owner_name()
    }

    /// Returns the action to invoke.
    #[must_use]
    pub fn action(&self) -> &Arc<dyn Action> {
        self.notification.action()
    }

    /// Returns the notification's registration index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.notification.index()
    }

    /// Returns `true` if this call starts or belongs to the response phase.
    #[must_use]
    pub fn is_response_coding(&self) -> bool {
        self.notification
            .provides()
            .contains(&ContributorKey::of::<stages::ResponseCoding>())
    }
}

impl fmt::Debug for ContributorCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContributorCall")
            .field("index", &self.index())
            .field("contributor", &self.name())
            .finish()
    }
}

/// The immutable call order of an initialized pipeline.
///
/// Cloning is cheap; the calls are shared.
#[derive(Clone)]
pub struct CallGraph {
    calls: Arc<[ContributorCall]>,
    response_start: Option<usize>,
    generator: &'static str,
}

impl CallGraph {
    /// Builds a call graph from an order of registration indices.
    pub(crate) fn from_order(
        registry: &NotificationRegistry,
        order: &[usize],
        generator: &'static str,
    ) -> Self {
        let calls: Arc<[ContributorCall]> = order
            .iter()
            .filter_map(|&i| registry.get(i))
            .map(|n| ContributorCall {
                notification: n.clone(),
            })
            .collect();
        let response_start = calls.iter().position(ContributorCall::is_response_coding);
        Self {
            calls,
            response_start,
            generator,
        }
    }

    /// Returns the calls in invocation order.
    #[must_use]
    pub fn calls(&self) -> &[ContributorCall] {
        &self.calls
    }

    /// Iterates the calls in invocation order.
    pub fn iter(&self) -> std::slice::Iter<'_, ContributorCall> {
        self.calls.iter()
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns `true` if the graph has no calls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Returns the position of the first response-phase call, if any.
    ///
    /// The response phase starts at the first call owned by a contributor
    /// providing [`stages::ResponseCoding`].
    #[must_use]
    pub const fn response_start(&self) -> Option<usize> {
        self.response_start
    }

    /// Returns the name of the generator that produced this graph.
    #[must_use]
    pub const fn generator(&self) -> &'static str {
        self.generator
    }

    /// Returns the contributor names in invocation order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.calls.iter().map(ContributorCall::name).collect()
    }
}

impl fmt::Debug for CallGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallGraph")
            .field("generator", &self.generator)
            .field("calls", &self.names())
            .field("response_start", &self.response_start)
            .finish()
    }
}

/// Dependency edges derived from notification constraints.
///
/// An edge `a -> b` means `a` must be invoked before `b`.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    predecessors: Vec<Vec<usize>>,
    successors: Vec<Vec<usize>>,
    followers: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Resolves every constraint in `registry` into edges.
    ///
    /// "N after T" adds `M -> N` for every notification `M` matching `T`;
    /// "N before T" adds `N -> M`. Self edges are dropped and targets that
    /// match nothing are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConstraint`] when a notification asks to
    /// run before the bootstrap notification.
    pub fn build(registry: &NotificationRegistry) -> Result<Self, PipelineError> {
        let n = registry.len();
        let mut graph = Self {
            predecessors: vec![Vec::new(); n],
            successors: vec![Vec::new(); n],
            followers: vec![Vec::new(); n],
        };

        for notification in registry {
            let node = notification.index();
            for constraint in notification.constraints() {
                let mut matched = false;
                for target in registry.iter().filter(|m| m.matches(&constraint.target)) {
                    let other = target.index();
                    matched = true;
                    if other == node {
                        continue;
                    }
                    match constraint.kind {
                        ConstraintKind::After => {
                            graph.add_edge(other, node);
                            if !graph.followers[other].contains(&node) {
                                graph.followers[other].push(node);
                            }
                        }
                        ConstraintKind::Before => {
                            if other == 0 {
                                return Err(PipelineError::InvalidConstraint {
                                    contributor: notification.owner_name().to_string(),
                                    reason: format!(
                                        "cannot run {constraint}: the pipeline start always runs first"
                                    ),
                                });
                            }
                            graph.add_edge(node, other);
                        }
                    }
                }
                if !matched {
                    debug!(
                        contributor = notification.owner_name(),
                        constraint = %constraint,
                        "Ignoring constraint with no matching contributor"
                    );
                }
            }
        }

        Ok(graph)
    }

    fn add_edge(&mut self, from: usize, to: usize) {
        if !self.successors[from].contains(&to) {
            self.successors[from].push(to);
            self.predecessors[to].push(from);
        }
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predecessors.len()
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predecessors.is_empty()
    }

    /// Returns the nodes that must run before `node`.
    #[must_use]
    pub fn predecessors(&self, node: usize) -> &[usize] {
        self.predecessors.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the nodes that must run after `node`.
    #[must_use]
    pub fn successors(&self, node: usize) -> &[usize] {
        self.successors.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the nodes that declared they run after `node`.
    #[must_use]
    pub fn followers(&self, node: usize) -> &[usize] {
        self.followers.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Finds one cycle, returned as the nodes along it with the first node repeated last.
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<usize>> {
        let mut colors = vec![Color::White; self.len()];
        let mut stack = Vec::new();
        (0..self.len()).find_map(|start| {
            if colors[start] == Color::White {
                self.cycle_from(start, &mut colors, &mut stack)
            } else {
                None
            }
        })
    }

    fn cycle_from(
        &self,
        node: usize,
        colors: &mut [Color],
        stack: &mut Vec<usize>,
    ) -> Option<Vec<usize>> {
        colors[node] = Color::Grey;
        stack.push(node);
        for &next in self.successors(node) {
            match colors[next] {
                Color::Grey => {
                    let start = stack.iter().position(|&n| n == next)?;
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                Color::White => {
                    if let Some(cycle) = self.cycle_from(next, colors, stack) {
                        return Some(cycle);
                    }
                }
                Color::Black => {}
            }
        }
        stack.pop();
        colors[node] = Color::Black;
        None
    }

    /// Builds the error reported for a cyclic registry.
    pub(crate) fn cycle_error(&self, registry: &NotificationRegistry) -> PipelineError {
        let participants = self
            .find_cycle()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|i| registry.get(i))
            .map(|n| n.owner_name().to_string())
            .collect();
        PipelineError::Cycle { participants }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Grey,
    Black,
}


#[cfg(test)]
mod tests {
    use super::test_support::{entry, registry_of};
    use super::*;
    use crate::contributor::Contributor;
    use crate::notification::PipelineBuilder;
    use ordo_core::Continuation;

    struct A;
    struct B;
    struct Encoder;

    impl Contributor for A {
        fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
            pipeline
                .notify(|_| Ok(Continuation::Continue))
                .after::<B>();
        }
    }

    impl Contributor for B {
        fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
            pipeline
                .notify(|_| Ok(Continuation::Continue))
                .after::<A>();
        }
    }

    impl Contributor for Encoder {
        fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
            pipeline
                .notify(|_| Ok(Continuation::Continue))
                .after::<stages::Begin>()
                .after::<stages::End>();
        }

        fn provides(&self) -> Vec<ContributorKey> {
            vec![ContributorKey::of::<stages::ResponseCoding>()]
        }
    }

    #[test]
    fn test_find_cycle_reports_path() {
        let registry = registry_of(&[entry(&A), entry(&B)]);
        let graph = DependencyGraph::build(&registry).expect("graph builds");
        let cycle = graph.find_cycle().expect("cycle exists");
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 3);

        match graph.cycle_error(&registry) {
            PipelineError::Cycle { participants } => {
                assert!(participants.contains(&"A".to_string()));
                assert!(participants.contains(&"B".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unmatched_target_is_ignored() {
        let registry = registry_of(&[entry(&Encoder)]);
        let graph = DependencyGraph::build(&registry).expect("graph builds");
        assert_eq!(graph.predecessors(1), &[0]);
        assert_eq!(graph.followers(0), &[1]);
        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn test_response_start_is_first_response_coding_call() {
        let registry = registry_of(&[entry(&Encoder)]);
        let graph = CallGraph::from_order(&registry, &[0, 1], "test");
        assert_eq!(graph.response_start(), Some(1));
        assert_eq!(graph.names(), vec!["BootstrapContributor", "Encoder"]);
        assert_eq!(graph.generator(), "test");
    }

    #[test]
    fn test_generator_for_strategy() {
        assert_eq!(generator_for(CallGraphStrategy::Weighted).name(), "weighted");
        assert_eq!(
            generator_for(CallGraphStrategy::Topological).name(),
            "topological"
        );
    }
}

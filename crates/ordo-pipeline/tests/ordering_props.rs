//! Property tests for call-graph ordering.

use ordo_core::{stages, CallGraphStrategy, Continuation, ContributorKey, RequestContext};
use ordo_pipeline::{
    generator_for, BootstrapContributor, CallGraphGenerator, Contributor, ContributorRegistry,
    NotificationRegistry, Pipeline, PipelineBuilder, PipelineRunner, TwoPhasePipelineAdaptor,
};
use proptest::prelude::*;

#[derive(Debug, Default)]
struct Visited(Vec<usize>);

macro_rules! link {
    ($name:ident, $position:expr, $previous:ty) => {
        #[derive(Default)]
        struct $name;

        impl Contributor for $name {
            fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
                pipeline
                    .notify(|ctx| {
                        match ctx.get_extension_mut::<Visited>() {
                            Some(visited) => visited.0.push($position),
                            None => ctx.set_extension(Visited(vec![$position])),
                        }
                        Ok(Continuation::Continue)
                    })
                    .after::<$previous>();
            }
        }
    };
}

link!(L0, 0, stages::Begin);
link!(L1, 1, L0);
link!(L2, 2, L1);
link!(L3, 3, L2);
link!(L4, 4, L3);

fn register(registry: ContributorRegistry, position: usize) -> ContributorRegistry {
    match position {
        0 => registry.register::<L0>(),
        1 => registry.register::<L1>(),
        2 => registry.register::<L2>(),
        3 => registry.register::<L3>(),
        _ => registry.register::<L4>(),
    }
}

struct K0;
struct K1;
struct K2;
struct K3;
struct K4;
struct K5;

const RANKS: usize = 6;

fn key(rank: usize) -> ContributorKey {
    match rank {
        0 => ContributorKey::of::<K0>(),
        1 => ContributorKey::of::<K1>(),
        2 => ContributorKey::of::<K2>(),
        3 => ContributorKey::of::<K3>(),
        4 => ContributorKey::of::<K4>(),
        _ => ContributorKey::of::<K5>(),
    }
}

/// An edge `(from, to, declared_by_target)` between ranks, `from < to`.
///
/// `declared_by_target` picks whether `to` says "after `from`" or `from`
/// says "before `to`".
type Edge = (usize, usize, bool);

fn acyclic_edges() -> impl Strategy<Value = Vec<Edge>> {
    proptest::collection::vec((0..RANKS, 0..RANKS, any::<bool>()), 0..12).prop_map(|edges| {
        edges
            .into_iter()
            .filter(|(a, b, _)| a != b)
            .map(|(a, b, by_target)| (a.min(b), a.max(b), by_target))
            .collect()
    })
}

fn notifications(
    registration: &[usize],
    edges: &[Edge],
    anchored: &[bool],
) -> NotificationRegistry {
    let mut registry = NotificationRegistry::new();
    let bootstrap = BootstrapContributor;
    bootstrap.initialize(&mut registry.builder_for(
        ContributorKey::of::<BootstrapContributor>(),
        bootstrap.name(),
        bootstrap.provides(),
    ));

    for &rank in registration {
        let mut builder = registry.builder_for(key(rank), format!("K{rank}"), Vec::new());
        let mut notification = builder.notify(|_| Ok(Continuation::Continue));
        if anchored[rank] {
            notification = notification.after::<stages::Begin>();
        }
        for &(from, to, by_target) in edges {
            if by_target && to == rank {
                notification = notification.after_key(key(from));
            } else if !by_target && from == rank {
                notification = notification.before_key(key(to));
            }
        }
    }
    registry
}

fn strategy() -> impl Strategy<Value = CallGraphStrategy> {
    prop_oneof![
        Just(CallGraphStrategy::Weighted),
        Just(CallGraphStrategy::Topological),
    ]
}

proptest! {
    #[test]
    fn unique_order_ignores_registration_order(
        order in Just(vec![0_usize, 1, 2, 3, 4]).prop_shuffle(),
        strategy in strategy(),
    ) {
        let registry = order
            .iter()
            .fold(ContributorRegistry::new(), |registry, &position| register(registry, position))
            .with_strategy(strategy);

        let pipelines: Vec<Box<dyn Pipeline>> = vec![
            Box::new(PipelineRunner::new(registry.clone())),
            Box::new(TwoPhasePipelineAdaptor::new(registry)),
        ];

        for mut pipeline in pipelines {
            pipeline.initialize().expect("chain is acyclic");
            let names = pipeline.call_graph().map(|g| g.names()).unwrap_or_default();
            prop_assert_eq!(names, vec!["BootstrapContributor", "L0", "L1", "L2", "L3", "L4"]);

            let mut ctx = RequestContext::new();
            tokio_test::block_on(pipeline.run(&mut ctx)).expect("initialized");
            let visited = ctx.get_extension::<Visited>().map(|v| v.0.clone());
            prop_assert_eq!(visited, Some(vec![0, 1, 2, 3, 4]));
        }
    }

    #[test]
    fn bootstrap_is_always_first(
        subset in proptest::sample::subsequence(vec![0_usize, 1, 2, 3, 4], 0..=5),
        strategy in strategy(),
    ) {
        let registry = subset
            .iter()
            .fold(ContributorRegistry::new(), |registry, &position| register(registry, position))
            .with_strategy(strategy);

        let mut pipeline = PipelineRunner::new(registry);
        pipeline.initialize().expect("chain is acyclic");
        let graph = pipeline.call_graph().expect("initialized");
        prop_assert_eq!(graph.names().first().copied(), Some("BootstrapContributor"));
        prop_assert_eq!(graph.len(), subset.len() + 1);
    }

    #[test]
    fn every_constraint_is_honored(
        registration in Just((0..RANKS).collect::<Vec<_>>()).prop_shuffle(),
        edges in acyclic_edges(),
        anchored in proptest::collection::vec(any::<bool>(), RANKS),
        strategy in strategy(),
    ) {
        let registry = notifications(&registration, &edges, &anchored);
        let graph = generator_for(strategy)
            .generate(&registry)
            .expect("edges only point to higher ranks");

        prop_assert_eq!(graph.len(), RANKS + 1);
        prop_assert_eq!(graph.names().first().copied(), Some("BootstrapContributor"));

        let position = |rank: usize| graph.iter().position(|call| call.owner() == key(rank));
        let mut seen: Vec<usize> = graph.iter().map(|call| call.index()).collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..=RANKS).collect::<Vec<_>>());

        for &(from, to, _) in &edges {
            prop_assert!(
                position(from) < position(to),
                "K{} must run before K{} in {:?}",
                from,
                to,
                graph.names()
            );
        }
    }
}

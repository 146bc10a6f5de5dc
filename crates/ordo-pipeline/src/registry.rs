//! Contributor registry.
//!
//! The registry is the explicit list of contributors a pipeline is built
//! from. Contributors are registered by type, with a factory or as a ready
//! instance, and are instantiated once when the pipeline initializes.
//!
//! # Example
//!
//! ```rust
//! use ordo_core::{stages, CallGraphStrategy, Continuation};
//! use ordo_pipeline::{Contributor, ContributorRegistry, PipelineBuilder};
//!
//! #[derive(Default)]
//! struct Authenticate;
//!
//! impl Contributor for Authenticate {
//!     fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
//!         pipeline
//!             .notify(|_| Ok(Continuation::Continue))
//!             .after::<stages::Begin>();
//!     }
//! }
//!
//! let registry = ContributorRegistry::new()
//!     .register::<Authenticate>()
//!     .with_strategy(CallGraphStrategy::Topological);
//!
//! assert_eq!(registry.len(), 1);
//! assert!(registry.contains::<Authenticate>());
//! assert_eq!(registry.generator().name(), "topological");
//! ```

use crate::callgraph::{generator_for, CallGraph, CallGraphGenerator};
use crate::contributor::{BootstrapContributor, Contributor};
use crate::error::PipelineError;
use crate::notification::NotificationRegistry;
use indexmap::IndexMap;
use ordo_core::{CallGraphStrategy, ContributorKey};
use ordo_telemetry::metrics;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Creates a contributor instance.
pub type ContributorFactory = Arc<dyn Fn() -> Arc<dyn Contributor> + Send + Sync>;

/// The explicit set of contributors a pipeline is built from.
///
/// Registration order is preserved and is the tie-break order the call-graph
/// generators see. Registering the same type twice replaces the earlier
/// factory in place. The bootstrap contributor is always added by the
/// pipeline and cannot be replaced.
#[derive(Clone)]
pub struct ContributorRegistry {
    factories: IndexMap<ContributorKey, ContributorFactory>,
    generator: Arc<dyn CallGraphGenerator>,
}

impl ContributorRegistry {
    /// Creates an empty registry using the default weighted generator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
            generator: generator_for(CallGraphStrategy::default()),
        }
    }

    /// Registers a contributor constructed with `Default`.
    pub fn register<C: Contributor + Default>(self) -> Self {
        self.register_with(C::default)
    }

    /// Registers a contributor constructed by `factory`.
    pub fn register_with<C, F>(mut self, factory: F) -> Self
    where
        C: Contributor,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let factory: ContributorFactory = Arc::new(move || Arc::new(factory()) as Arc<dyn Contributor>);
        self.insert(ContributorKey::of::<C>(), factory);
        self
    }

    /// Registers an existing contributor instance.
    pub fn register_instance<C: Contributor>(mut self, instance: Arc<C>) -> Self {
        let factory: ContributorFactory =
            Arc::new(move || Arc::clone(&instance) as Arc<dyn Contributor>);
        self.insert(ContributorKey::of::<C>(), factory);
        self
    }

    /// Uses `generator` to build the call graph.
    pub fn with_generator(mut self, generator: Arc<dyn CallGraphGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Uses the generator implementing `strategy`.
    pub fn with_strategy(self, strategy: CallGraphStrategy) -> Self {
        self.with_generator(generator_for(strategy))
    }

    /// Returns the configured generator.
    #[must_use]
    pub fn generator(&self) -> &Arc<dyn CallGraphGenerator> {
        &self.generator
    }

    /// Checks if a contributor type is registered.
    #[must_use]
    pub fn contains<C: Contributor>(&self) -> bool {
        self.factories.contains_key(&ContributorKey::of::<C>())
    }

    /// Returns the registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &ContributorKey> {
        self.factories.keys()
    }

    /// Returns the number of registered contributors, excluding the bootstrap.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no contributors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn insert(&mut self, key: ContributorKey, factory: ContributorFactory) {
        if key == ContributorKey::of::<BootstrapContributor>() {
            warn!("Ignoring registration of the bootstrap contributor; it is always present");
            return;
        }
        if self.factories.insert(key, factory).is_some() {
            debug!(contributor = key.name(), "Replaced contributor registration");
        }
    }

    /// Instantiates every contributor, collects notifications and builds the call graph.
    pub(crate) fn resolve(&self) -> Result<Resolved, PipelineError> {
        let generator = self.generator.name();
        let result = self.resolve_with_generator();
        match &result {
            Ok(resolved) => {
                info!(
                    contributors = resolved.contributors.len(),
                    notifications = resolved.graph.len(),
                    generator,
                    "Pipeline initialized"
                );
                metrics::record_initialization(generator, "ok");
            }
            Err(error) => {
                warn!(generator, error = %error, "Pipeline initialization failed");
                metrics::record_initialization(generator, error.kind());
            }
        }
        result
    }

    fn resolve_with_generator(&self) -> Result<Resolved, PipelineError> {
        let bootstrap: (ContributorKey, Arc<dyn Contributor>) = (
            ContributorKey::of::<BootstrapContributor>(),
            Arc::new(BootstrapContributor),
        );
        let instances: Vec<(ContributorKey, Arc<dyn Contributor>)> = std::iter::once(bootstrap)
            .chain(self.factories.iter().map(|(key, factory)| (*key, factory())))
            .collect();

        let mut notifications = NotificationRegistry::new();
        for (key, contributor) in &instances {
            let before = notifications.len();
            contributor.initialize(&mut notifications.builder_for(
                *key,
                contributor.name(),
                contributor.provides(),
            ));
            debug!(
                contributor = contributor.name(),
                notifications = notifications.len() - before,
                "Contributor initialized"
            );
        }

        let graph = self.generator.generate(&notifications)?;
        let contributors = instances.into_iter().map(|(_, c)| c).collect();
        Ok(Resolved {
            contributors,
            graph,
        })
    }
}

impl Default for ContributorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContributorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContributorRegistry")
            .field("contributors", &self.factories.keys().collect::<Vec<_>>())
            .field("generator", &self.generator.name())
            .finish()
    }
}

/// The products of a successful initialization.
#[derive(Clone)]
pub(crate) struct Resolved {
    pub(crate) contributors: Arc<[Arc<dyn Contributor>]>,
    pub(crate) graph: CallGraph,
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field(
                "contributors",
                &self.contributors.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("graph", &self.graph)
            .finish()
    }
}

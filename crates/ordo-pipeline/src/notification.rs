//! Notifications and the registry that collects them.
//!
//! A notification is one action a contributor wants invoked for every
//! request, together with the constraints that place it in the call order.
//! Contributors register notifications through a [`PipelineBuilder`] while
//! the pipeline initializes. The resulting [`NotificationRegistry`] is the
//! only input of a call-graph generator.
//!
//! # Example
//!
//! ```
//! use ordo_core::{stages, Continuation};
//! use ordo_pipeline::{Contributor, PipelineBuilder};
//!
//! struct Authenticate;
//!
//! impl Contributor for Authenticate {
//!     fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
//!         pipeline
//!             .notify(|_ctx| Ok(Continuation::Continue))
//!             .after::<stages::Begin>()
//!             .and()
//!             .before::<stages::UriMatching>()
//!             .describe("resolve caller credentials");
//!     }
//!
//!     fn provides(&self) -> Vec<ordo_core::ContributorKey> {
//!         vec![ordo_core::ContributorKey::of::<stages::Authentication>()]
//!     }
//! }
//! ```

use crate::constraint::{Constraint, ConstraintKind};
use ordo_core::{ContributorKey, ContributorResult, RequestContext};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future that is `Send` and borrows for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something the pipeline can invoke with the request context.
///
/// Most contributors never implement this directly and register closures
/// through [`PipelineBuilder::notify`] or [`PipelineBuilder::notify_async`]
/// instead.
pub trait Action: Send + Sync + 'static {
    /// Invokes the action.
    fn invoke<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, ContributorResult>;
}

/// An action backed by a synchronous function.
pub struct SyncAction<F> {
    func: F,
}

impl<F> SyncAction<F> {
    /// Wraps a synchronous function.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Action for SyncAction<F>
where
    F: Fn(&mut RequestContext) -> ContributorResult + Send + Sync + 'static,
{
    fn invoke<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, ContributorResult> {
        Box::pin(async move { (self.func)(ctx) })
    }
}

/// An action backed by a function returning a boxed future.
///
/// # Example
///
/// ```
/// use ordo_core::{Continuation, ContributorResult, RequestContext};
/// use ordo_pipeline::{AsyncAction, BoxFuture};
///
/// fn accept(ctx: &mut RequestContext) -> BoxFuture<'_, ContributorResult> {
///     Box::pin(async move {
///         ctx.set_status(http::StatusCode::ACCEPTED);
///         Ok(Continuation::Continue)
///     })
/// }
///
/// let action = AsyncAction::new(accept);
/// # let _ = action;
/// ```
pub struct AsyncAction<F> {
    func: F,
}

impl<F> AsyncAction<F> {
    /// Wraps an async function.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Action for AsyncAction<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, ContributorResult>
        + Send
        + Sync
        + 'static,
{
    fn invoke<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, ContributorResult> {
        (self.func)(ctx)
    }
}

/// A registered action with its owner and ordering constraints.
#[derive(Clone)]
pub struct Notification {
    owner: ContributorKey,
    owner_name: Arc<str>,
    provides: Arc<[ContributorKey]>,
    action: Arc<dyn Action>,
    constraints: Vec<Constraint>,
    description: Option<String>,
    index: usize,
}

impl Notification {
    /// Returns the key of the contributor that registered this notification.
    #[must_use]
    pub const fn owner(&self) -> ContributorKey {
        self.owner
    }

    /// Returns the display name of the owning contributor.
    #[must_use]
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// Returns the stage markers the owning contributor provides.
    #[must_use]
    pub fn provides(&self) -> &[ContributorKey] {
        &self.provides
    }

    /// Returns the action to invoke.
    #[must_use]
    pub fn action(&self) -> &Arc<dyn Action> {
        &self.action
    }

    /// Returns the constraints in declaration order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Returns the description, if one was attached.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the registration index. The bootstrap notification has index 0.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if a constraint targeting `target` applies to this notification.
    ///
    /// A target matches when it names the owning contributor or one of the
    /// stage markers the owner provides.
    #[must_use]
    pub fn matches(&self, target: &ContributorKey) -> bool {
        self.owner == *target || self.provides.contains(target)
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("index", &self.index)
            .field("owner", &self.owner_name)
            .field("constraints", &self.constraints)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// All notifications registered during initialization, in registration order.
#[derive(Debug, Default, Clone)]
pub struct NotificationRegistry {
    notifications: Vec<Notification>,
}

impl NotificationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Returns the notification at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Notification> {
        self.notifications.get(index)
    }

    /// Iterates notifications in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.notifications.iter()
    }

    /// Returns all notifications as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Notification] {
        &self.notifications
    }

    /// Opens a builder that registers notifications on behalf of one contributor.
    pub fn builder_for(
        &mut self,
        owner: ContributorKey,
        owner_name: impl Into<Arc<str>>,
        provides: Vec<ContributorKey>,
    ) -> PipelineBuilder<'_> {
        PipelineBuilder {
            registry: self,
            owner,
            owner_name: owner_name.into(),
            provides: provides.into(),
        }
    }

    fn push(&mut self, mut notification: Notification) -> &mut Notification {
        let index = self.notifications.len();
        notification.index = index;
        self.notifications.push(notification);
        &mut self.notifications[index]
    }
}

impl<'r> IntoIterator for &'r NotificationRegistry {
    type Item = &'r Notification;
    type IntoIter = std::slice::Iter<'r, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Registers notifications for a single contributor.
///
/// Handed to [`Contributor::initialize`](crate::Contributor::initialize).
/// Every notification registered through it is owned by that contributor.
pub struct PipelineBuilder<'r> {
    registry: &'r mut NotificationRegistry,
    owner: ContributorKey,
    owner_name: Arc<str>,
    provides: Arc<[ContributorKey]>,
}

impl PipelineBuilder<'_> {
    /// Registers a synchronous action.
    pub fn notify<F>(&mut self, action: F) -> NotificationBuilder<'_>
    where
        F: Fn(&mut RequestContext) -> ContributorResult + Send + Sync + 'static,
    {
        self.notify_action(Arc::new(SyncAction::new(action)))
    }

    /// Registers an asynchronous action.
    ///
    /// ```
    /// use ordo_core::Continuation;
    /// use ordo_pipeline::{Contributor, PipelineBuilder};
    ///
    /// struct Decode;
    ///
    /// impl Contributor for Decode {
    ///     fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
    ///         pipeline.notify_async(|ctx| {
    ///             Box::pin(async move {
    ///                 tokio::task::yield_now().await;
    ///                 ctx.set_extension(42_u32);
    ///                 Ok(Continuation::Continue)
    ///             })
    ///         });
    ///     }
    /// }
    /// ```
    pub fn notify_async<F>(&mut self, action: F) -> NotificationBuilder<'_>
    where
        F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, ContributorResult>
            + Send
            + Sync
            + 'static,
    {
        self.notify_action(Arc::new(AsyncAction::new(action)))
    }

    /// Registers an already constructed action.
    pub fn notify_action(&mut self, action: Arc<dyn Action>) -> NotificationBuilder<'_> {
        let notification = self.registry.push(Notification {
            owner: self.owner,
            owner_name: Arc::clone(&self.owner_name),
            provides: Arc::clone(&self.provides),
            action,
            constraints: Vec::new(),
            description: None,
            index: 0,
        });
        NotificationBuilder { notification }
    }

    /// Returns the key of the contributor being initialized.
    #[must_use]
    pub const fn owner(&self) -> ContributorKey {
        self.owner
    }
}

/// Accumulates constraints on a freshly registered notification.
pub struct NotificationBuilder<'b> {
    notification: &'b mut Notification,
}

impl NotificationBuilder<'_> {
    /// Requires the notification to run after everything matching `T`.
    pub fn after<T: ?Sized + 'static>(self) -> Self {
        self.after_key(ContributorKey::of::<T>())
    }

    /// Requires the notification to run before everything matching `T`.
    pub fn before<T: ?Sized + 'static>(self) -> Self {
        self.before_key(ContributorKey::of::<T>())
    }

    /// Requires the notification to run after everything matching `key`.
    pub fn after_key(self, key: ContributorKey) -> Self {
        self.constrain(Constraint::new(ConstraintKind::After, key))
    }

    /// Requires the notification to run before everything matching `key`.
    pub fn before_key(self, key: ContributorKey) -> Self {
        self.constrain(Constraint::new(ConstraintKind::Before, key))
    }

    /// Adds a constraint value.
    pub fn constrain(self, constraint: Constraint) -> Self {
        self.notification.constraints.push(constraint);
        self
    }

    /// Reads naturally between two constraints. Does nothing.
    pub fn and(self) -> Self {
        self
    }

    /// Attaches a human-readable description used in logs.
    pub fn describe(self, description: impl Into<String>) -> Self {
        self.notification.description = Some(description.into());
        self
    }
}

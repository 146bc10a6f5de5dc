//! Request context types.
//!
//! The [`RequestContext`] is the opaque, mutable object handed to every
//! contributor action during a pipeline run. The pipeline itself only reads
//! and writes the status code and the server-error list; everything else is
//! for contributors to share among themselves through typed extensions.

use crate::ServerError;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use ordo_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request state passed through the pipeline.
///
/// A fresh context is created for every request and owned by the caller of
/// the pipeline run. Nothing in it is shared between requests.
///
/// # Example
///
/// ```
/// use ordo_core::{RequestContext, ServerError};
/// use http::StatusCode;
///
/// let mut ctx = RequestContext::new();
/// assert!(ctx.status().is_none());
///
/// ctx.push_server_error(ServerError::new("Decoder", "bad entity"));
/// ctx.set_status(StatusCode::INTERNAL_SERVER_ERROR);
///
/// assert_eq!(ctx.server_errors().len(), 1);
/// assert_eq!(ctx.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
/// ```
#[derive(Debug)]
pub struct RequestContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// The response status, once a contributor (or the pipeline) decided it.
    status: Option<StatusCode>,

    /// Errors recorded while running the pipeline.
    server_errors: Vec<ServerError>,

    /// When the request started processing.
    started_at: Instant,

    /// Type-erased extension data shared between contributors.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestContext {
    /// Creates a new request context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    ///
    /// Useful when the request ID was provided by a client or upstream service.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            status: None,
            server_errors: Vec::new(),
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the response status, if one has been set.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Sets the response status.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Returns the server errors recorded so far, in order.
    #[must_use]
    pub fn server_errors(&self) -> &[ServerError] {
        &self.server_errors
    }

    /// Appends a server error.
    pub fn push_server_error(&mut self, error: ServerError) {
        self.server_errors.push(error);
    }

    /// Returns `true` if any server error has been recorded.
    #[must_use]
    pub fn has_server_errors(&self) -> bool {
        !self.server_errors.is_empty()
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value, replacing any previous value of that type.
    ///
    /// # Example
    ///
    /// ```
    /// use ordo_core::RequestContext;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct SelectedHandler(&'static str);
    ///
    /// let mut ctx = RequestContext::new();
    /// ctx.set_extension(SelectedHandler("users"));
    /// assert_eq!(ctx.get_extension::<SelectedHandler>(), Some(&SelectedHandler("users")));
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Retrieves a mutable typed extension value.
    pub fn get_extension_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.extensions
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

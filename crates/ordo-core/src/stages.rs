//! Well-known pipeline stage markers.
//!
//! Stage markers are types that never execute anything. They exist so that
//! contributors can order themselves against a *point* in the pipeline rather
//! than against each other. A contributor declares the markers it provides,
//! and every `after::<Marker>()` / `before::<Marker>()` constraint then
//! matches that contributor's notifications.
//!
//! The stages follow the life of a request:
//!
//! ```text
//! Begin → Authentication → UriMatching → HandlerSelection → OperationCreation
//!       → OperationFiltering → RequestDecoding → OperationExecution
//!       → OperationResultInvocation → ResponseCoding → End
//! ```
//!
//! Only [`Begin`] is guaranteed to be present: the bootstrap contributor
//! provides it. [`ResponseCoding`] additionally marks the start of the
//! response phase, which is where `Continuation::RenderNow` jumps to.

use crate::ContributorKey;

/// The start of the pipeline. Provided by the bootstrap contributor.
#[derive(Debug, Clone, Copy)]
pub struct Begin;

/// Caller authentication.
#[derive(Debug, Clone, Copy)]
pub struct Authentication;

/// Matching the request URI to a resource.
#[derive(Debug, Clone, Copy)]
pub struct UriMatching;

/// Selecting the handler for the matched resource.
#[derive(Debug, Clone, Copy)]
pub struct HandlerSelection;

/// Creating candidate operations on the handler.
#[derive(Debug, Clone, Copy)]
pub struct OperationCreation;

/// Filtering candidate operations.
#[derive(Debug, Clone, Copy)]
pub struct OperationFiltering;

/// Decoding the request entity.
#[derive(Debug, Clone, Copy)]
pub struct RequestDecoding;

/// Executing the selected operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationExecution;

/// Turning the operation result into a response.
#[derive(Debug, Clone, Copy)]
pub struct OperationResultInvocation;

/// Encoding the response entity. Marks the start of the response phase.
#[derive(Debug, Clone, Copy)]
pub struct ResponseCoding;

/// The end of the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct End;

/// Returns the keys of all known stages, in request order.
#[must_use]
pub fn all() -> [ContributorKey; 11] {
    [
        ContributorKey::of::<Begin>(),
        ContributorKey::of::<Authentication>(),
        ContributorKey::of::<UriMatching>(),
        ContributorKey::of::<HandlerSelection>(),
        ContributorKey::of::<OperationCreation>(),
        ContributorKey::of::<OperationFiltering>(),
        ContributorKey::of::<RequestDecoding>(),
        ContributorKey::of::<OperationExecution>(),
        ContributorKey::of::<OperationResultInvocation>(),
        ContributorKey::of::<ResponseCoding>(),
        ContributorKey::of::<End>(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        let names: Vec<&str> = all().iter().map(ContributorKey::name).collect();
        assert_eq!(names[0], "Begin");
        assert_eq!(names[9], "ResponseCoding");
        assert_eq!(names[10], "End");
    }

    #[test]
    fn test_stage_keys_are_distinct() {
        let keys = all();
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}

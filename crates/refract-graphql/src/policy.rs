//! Mutation authorization.
//!
//! Every generated mutation consults a [`MutationPolicy`] before touching the
//! repository. A denied mutation resolves to `null` and performs no write;
//! the denial reason is only logged.

use std::fmt;

use crate::context::{Identity, RequestContext};

/// Kind of write a mutation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Remove,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// A mutation awaiting authorization.
#[derive(Debug, Clone, Copy)]
pub struct MutationRequest<'a> {
    pub kind: MutationKind,
    /// Alias of the target entity.
    pub entity: &'a str,
    /// Target record, when the mutation addresses an existing one.
    pub record_id: Option<&'a str>,
    pub context: Option<&'a RequestContext>,
}

impl<'a> MutationRequest<'a> {
    /// Identity of the caller, if any was resolved.
    #[must_use]
    pub fn identity(&self) -> Option<&'a Identity> {
        self.context.and_then(|c| c.identity.as_ref())
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny { reason: String },
}

impl PolicyDecision {
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides whether a mutation may proceed.
pub trait MutationPolicy: Send + Sync {
    fn check(&self, request: &MutationRequest<'_>) -> PolicyDecision;
}

impl<F> MutationPolicy for F
where
    F: Fn(&MutationRequest<'_>) -> PolicyDecision + Send + Sync,
{
    fn check(&self, request: &MutationRequest<'_>) -> PolicyDecision {
        self(request)
    }
}

/// Allows mutations only for requests carrying a resolved identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireIdentity;

impl MutationPolicy for RequireIdentity {
    fn check(&self, request: &MutationRequest<'_>) -> PolicyDecision {
        if request.identity().is_some() {
            PolicyDecision::Allow
        } else {
            PolicyDecision::deny(format!(
                "{} on {} requires an authenticated identity",
                request.kind, request.entity
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(context: Option<&'a RequestContext>) -> MutationRequest<'a> {
        MutationRequest {
            kind: MutationKind::Create,
            entity: "product",
            record_id: None,
            context,
        }
    }

    #[test]
    fn test_require_identity_denies_anonymous() {
        let decision = RequireIdentity.check(&request(None));
        assert_eq!(
            decision,
            PolicyDecision::deny("create on product requires an authenticated identity")
        );

        let anonymous = RequestContext::builder()
            .with_request_id("req-1")
            .build()
            .unwrap();
        assert!(!RequireIdentity.check(&request(Some(&anonymous))).is_allowed());
    }

    #[test]
    fn test_require_identity_allows_authenticated() {
        let context = RequestContext::builder()
            .with_user_id("editor")
            .with_request_id("req-1")
            .build()
            .unwrap();
        assert!(RequireIdentity.check(&request(Some(&context))).is_allowed());
    }

    #[test]
    fn test_closure_policy() {
        let read_only = |req: &MutationRequest<'_>| {
            if req.kind == MutationKind::Remove {
                PolicyDecision::deny("removal disabled")
            } else {
                PolicyDecision::Allow
            }
        };
        let remove = MutationRequest {
            kind: MutationKind::Remove,
            ..request(None)
        };
        assert!(!read_only.check(&remove).is_allowed());
        assert!(read_only.check(&request(None)).is_allowed());
    }
}

//! Per-request execution context.
//!
//! The transport layer resolves the caller's identity and attaches a
//! [`RequestContext`] to each request:
//!
//! ```ignore
//! let context = RequestContext::builder()
//!     .with_user_id("user-42")
//!     .with_request_id("req-123")
//!     .build()?;
//!
//! let response = schema
//!     .execute(async_graphql::Request::new(query).data(context))
//!     .await;
//! ```
//!
//! Requests without a context are treated as anonymous.

/// Identity resolved by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Request-scoped data available to resolvers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Resolved identity (None for unauthenticated requests).
    pub identity: Option<Identity>,

    /// Request ID for tracing and correlation.
    pub request_id: String,
}

impl RequestContext {
    /// Returns whether the request is authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Returns the user ID if authenticated.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.user_id.as_str())
    }

    /// Creates a new builder for RequestContext.
    #[must_use]
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }
}

/// Builder for constructing RequestContext.
#[derive(Debug, Default)]
pub struct RequestContextBuilder {
    identity: Option<Identity>,
    request_id: Option<String>,
}

impl RequestContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resolved identity.
    #[must_use]
    pub fn with_identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    /// Shorthand for an identity with only a user ID.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.identity = Some(Identity::new(user_id));
        self
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Builds the RequestContext.
    ///
    /// # Errors
    ///
    /// Returns an error if the request ID is missing.
    pub fn build(self) -> Result<RequestContext, ContextBuilderError> {
        let request_id = self
            .request_id
            .ok_or(ContextBuilderError::MissingField("request_id"))?;

        Ok(RequestContext {
            identity: self.identity,
            request_id,
        })
    }
}

/// Errors that can occur when building a RequestContext.
#[derive(Debug, thiserror::Error)]
pub enum ContextBuilderError {
    /// A required field was not provided.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

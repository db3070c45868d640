//! The adapter seam: one operation, decorators wrap it transparently.
//!
//! An adapter is anything that can execute a request and return ordered rows.
//! Decorators implement the identical signature and close over an inner
//! adapter, so a deployment can stack them in any order without a class
//! hierarchy.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::QueryError;
use crate::guard;
use crate::policy::ValidationPolicy;
use crate::types::{QueryRequest, Row};

/// A component that executes a query against a concrete engine (or a wrapped
/// inner adapter) and returns ordered rows.
#[async_trait]
pub trait QueryAdapter: Send + Sync {
    async fn execute(&self, request: &QueryRequest) -> Result<Vec<Row>, QueryError>;
}

#[async_trait]
impl<A: QueryAdapter + ?Sized> QueryAdapter for Arc<A> {
    async fn execute(&self, request: &QueryRequest) -> Result<Vec<Row>, QueryError> {
        self.as_ref().execute(request).await
    }
}

/// Decorator that runs the guard before ever touching the wrapped adapter.
///
/// On rejection the inner adapter is invoked exactly zero times, so rejected
/// requests never cost a connection.
pub struct ValidatedAdapter<A> {
    inner: A,
    policy: ValidationPolicy,
}

impl<A> ValidatedAdapter<A> {
    pub fn new(inner: A, policy: ValidationPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }
}

#[async_trait]
impl<A: QueryAdapter> QueryAdapter for ValidatedAdapter<A> {
    async fn execute(&self, request: &QueryRequest) -> Result<Vec<Row>, QueryError> {
        guard::validate(request, &self.policy)?;
        self.inner.execute(request).await
    }
}

//! Authorization and identity collaborator boundaries.
//!
//! Role checks and credential resolution live outside this crate; the core
//! only calls the gate and trusts the resolved identity for actor fields.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Identity resolved by the external identity collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: String,
}

/// Resource/action pair checked before every mutating operation.
pub mod actions {
    pub const SCAN: &str = "scan";
    pub const RECEIVE: &str = "receive";
    pub const REQUEST_DELETE: &str = "request_delete";
    pub const RESOLVE_DELETE: &str = "resolve_delete";
    pub const MANAGE: &str = "manage";
}

pub mod resources {
    pub const INVENTORY_ITEM: &str = "inventory_item";
    pub const CUSTOMER: &str = "customer";
    pub const PURCHASE_ORDER: &str = "purchase_order";
}

/// Allow/deny gate. Denial is terminal, never retried.
#[async_trait]
pub trait Authorization: Send + Sync {
    async fn authorize(
        &self,
        actor: &AuthenticatedUser,
        resource: &str,
        action: &str,
    ) -> Result<(), ServiceError>;
}

/// Resolves a bearer credential to an identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, bearer: &str) -> Result<AuthenticatedUser, ServiceError>;
}

/// Permissive gate for tests and single-tenant deployments.
#[derive(Debug, Default, Clone)]
pub struct AllowAll;

#[async_trait]
impl Authorization for AllowAll {
    async fn authorize(
        &self,
        _actor: &AuthenticatedUser,
        _resource: &str,
        _action: &str,
    ) -> Result<(), ServiceError> {
        Ok(())
    }
}

impl AuthenticatedUser {
    /// Convenience constructor used by tests and seed tooling.
    pub fn system(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: name.to_string(),
            name: name.to_string(),
            role: "system".to_string(),
        }
    }
}

use crate::{db::DbPool, errors::ServiceError, events::EventSender};
use async_trait::async_trait;
use std::sync::Arc;

/// Command trait for implementing the Command Pattern.
///
/// Each command encapsulates one unit of business work: validation, a single
/// database transaction, and the domain events it produces.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully.
    type Result;

    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError>;
}

pub mod deletions;
pub mod receiving;
pub mod scanning;

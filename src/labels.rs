//! QR/label rendering collaborator boundary.

use async_trait::async_trait;

use crate::errors::ServiceError;

/// Renders a scannable label for an item's unique id. The result is an
/// opaque encoded image stored on the item as-is.
#[async_trait]
pub trait LabelRenderer: Send + Sync {
    async fn render(&self, unique_id: &str) -> Result<String, ServiceError>;
}

/// Renderer that stores no image; used in tests and headless deployments.
#[derive(Debug, Default, Clone)]
pub struct NoopLabelRenderer;

#[async_trait]
impl LabelRenderer for NoopLabelRenderer {
    async fn render(&self, _unique_id: &str) -> Result<String, ServiceError> {
        Ok(String::new())
    }
}

use async_trait::async_trait;
use tracing::warn;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;

#[async_trait]
pub trait EventPublisher: Sync + Send {
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError>;
}

// Events go out after the write has committed, so a failure here is only logged.
pub(crate) async fn publish_after_commit(publisher: &dyn EventPublisher, event: serde_json::Result<DomainEvent>) {
    let res = match event {
        Ok(event) => publisher.publish(&event).await,
        Err(err) => Err(LibraryError::from(err)),
    };
    if let Err(err) = res {
        warn!(error = %err, "failed to publish domain event");
    }
}

use async_trait::async_trait;
use tracing::info;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;

// LogPublisher emits domain events as structured log records
#[derive(Debug, Clone)]
pub struct LogPublisher {
    branch_id: String,
}

impl LogPublisher {
    pub(crate) fn new(branch_id: &str) -> Self {
        Self {
            branch_id: branch_id.to_string(),
        }
    }
}

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        let json = serde_json::to_string(event)?;
        info!(branch = %self.branch_id, event_id = %event.event_id, name = %event.name,
            group = %event.group, key = %event.key, event = %json, "domain event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::authors::dto::AuthorDto;
    use crate::core::events::DomainEvent;
    use crate::gateway::events::EventPublisher;
    use crate::gateway::logs::LogPublisher;

    #[tokio::test]
    async fn test_should_publish_to_logs() {
        let publisher = LogPublisher::new("test");
        let event = DomainEvent::added("author_added", "catalog", &HashMap::new(), &AuthorDto::new("Cora Coralina", None))
            .expect("should build event");
        publisher.publish(&event).await.expect("should publish event");
    }
}

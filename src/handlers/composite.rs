use std::sync::Arc;
use async_trait::async_trait;
use tracing::debug;

use crate::traits::event_handler::TimelineSink;
use crate::models::timeline::Timeline;

/// Sink that forwards a timeline to several sinks in order.
/// The first failing sink stops the export.
pub struct CompositeSink {
    sinks: Vec<Arc<dyn TimelineSink>>,
}

impl CompositeSink {
    /// Create a new composite sink
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a sink to the composite
    pub fn add_sink(&mut self, sink: Arc<dyn TimelineSink>) {
        self.sinks.push(sink);
    }

    /// Check if there are any sinks
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Number of sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for CompositeSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimelineSink for CompositeSink {
    fn name(&self) -> &str {
        "composite"
    }

    async fn export(&self, timeline: &Timeline) -> anyhow::Result<()> {
        for sink in &self.sinks {
            debug!("Exporting to {}", sink.name());
            sink.export(timeline).await?;
        }
        Ok(())
    }
}

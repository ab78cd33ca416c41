use async_trait::async_trait;

use crate::models::timeline::Timeline;

/// Downstream consumer of a finished timeline (writers, reporters)
#[async_trait]
pub trait TimelineSink: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn export(&self, timeline: &Timeline) -> anyhow::Result<()>;
}

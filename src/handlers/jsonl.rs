use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tracing::info;

use crate::models::timeline::Timeline;
use crate::traits::event_handler::TimelineSink;

use super::rows::TimelineRow;

/// Writes `<prefix>.timeline.jsonl`, one JSON object per point
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(out_prefix: &str) -> Self {
        Self {
            path: PathBuf::from(format!("{}.timeline.jsonl", out_prefix)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn render_jsonl(timeline: &Timeline) -> anyhow::Result<String> {
    let mut out = String::new();
    for point in &timeline.points {
        out.push_str(&serde_json::to_string(&TimelineRow::from(point))?);
        out.push('\n');
    }
    Ok(out)
}

#[async_trait]
impl TimelineSink for JsonlSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn export(&self, timeline: &Timeline) -> anyhow::Result<()> {
        let body = render_jsonl(timeline)?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        info!("Wrote {}", self.path.display());
        Ok(())
    }
}

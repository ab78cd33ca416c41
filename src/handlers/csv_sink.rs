use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::models::timeline::{BalancePoint, Timeline};
use crate::traits::event_handler::TimelineSink;

use super::rows::{TailRow, TimelineRow};

/// Serialize rows to CSV with a header line
pub fn render_csv<'a, R, I>(points: I) -> anyhow::Result<Vec<u8>>
where
    R: Serialize + From<&'a BalancePoint>,
    I: IntoIterator<Item = &'a BalancePoint>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    for point in points {
        writer.serialize(R::from(point))?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV: {}", e.error()))
}

/// Writes the full series to `<prefix>.timeline.csv`
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(out_prefix: &str) -> Self {
        Self {
            path: PathBuf::from(format!("{}.timeline.csv", out_prefix)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TimelineSink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    async fn export(&self, timeline: &Timeline) -> anyhow::Result<()> {
        let body = render_csv::<TimelineRow, _>(&timeline.points)?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        info!("Wrote {}", self.path.display());
        Ok(())
    }
}

/// Writes the last `n` points to `<prefix>.tail_<n>.csv`; `n = 0` keeps all
pub struct TailCsvSink {
    path: PathBuf,
    n: usize,
}

impl TailCsvSink {
    pub fn new(out_prefix: &str, n: usize) -> Self {
        Self {
            path: PathBuf::from(format!("{}.tail_{}.csv", out_prefix, n)),
            n,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TimelineSink for TailCsvSink {
    fn name(&self) -> &str {
        "tail-csv"
    }

    async fn export(&self, timeline: &Timeline) -> anyhow::Result<()> {
        let body = render_csv::<TailRow, _>(timeline.tail(self.n))?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        info!("Wrote {}", self.path.display());
        Ok(())
    }
}

// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! In-process telemetry fan-out

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{TelemetryRecord, TelemetrySink};

/// Republishes records to any number of in-process subscribers.
///
/// Having no subscribers is not a failure; slow subscribers lag and lose
/// the oldest records.
pub struct BroadcastSink {
    tx: broadcast::Sender<TelemetryRecord>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryRecord> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl TelemetrySink for BroadcastSink {
    fn name(&self) -> &str {
        "broadcast"
    }

    async fn deliver(&self, record: &TelemetryRecord) -> Result<()> {
        let _ = self.tx.send(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{EmitReason, Severity};
    use crate::model::default_fleet;

    #[tokio::test]
    async fn test_subscribers_receive_records() {
        let sink = BroadcastSink::new(16);
        let mut rx = sink.subscribe();
        assert_eq!(sink.subscriber_count(), 1);

        let system = default_fleet().remove(3);
        let record = TelemetryRecord::new(&system, Severity::Warning, EmitReason::Escalation, 3.0);
        sink.deliver(&record).await.unwrap();

        let got = rx.recv().await.unwrap();
        assert_eq!(got, record);
    }

    #[tokio::test]
    async fn test_no_subscribers_is_fine() {
        let sink = BroadcastSink::new(4);
        let system = default_fleet().remove(0);
        let record = TelemetryRecord::new(&system, Severity::Normal, EmitReason::PeriodicFlush, 0.0);
        assert!(sink.deliver(&record).await.is_ok());
    }
}

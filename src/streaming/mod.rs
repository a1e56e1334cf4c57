//! Streaming module - telemetry records and delivery sinks

mod broadcast;
mod http;

pub use self::broadcast::BroadcastSink;
pub use self::http::HttpCollector;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::alert::{EmitReason, Severity};
use crate::core::EngineCounters;
use crate::model::NavalSystem;

/// One system snapshot sent to the telemetry collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    #[serde(flatten)]
    pub system: NavalSystem,
    pub severity: Severity,
    pub reason: EmitReason,
    /// Unix seconds of the tick that produced the record
    pub timestamp: f64,
}

impl TelemetryRecord {
    pub fn new(system: &NavalSystem, severity: Severity, reason: EmitReason, timestamp: f64) -> Self {
        Self {
            system: system.clone(),
            severity,
            reason,
            timestamp,
        }
    }
}

/// Destination for telemetry records
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, record: &TelemetryRecord) -> Result<()>;
}

/// Fans records out to every sink without blocking the caller.
///
/// Each delivery runs in its own task; failures are logged and counted and
/// never retried.
#[derive(Clone, Default)]
pub struct TelemetryDispatcher {
    sinks: Vec<Arc<dyn TelemetrySink>>,
    counters: Option<Arc<EngineCounters>>,
}

impl TelemetryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counters(mut self, counters: Arc<EngineCounters>) -> Self {
        self.counters = Some(counters);
        self
    }

    pub fn add_sink(&mut self, sink: Arc<dyn TelemetrySink>) {
        debug!("Registered telemetry sink '{}'", sink.name());
        self.sinks.push(sink);
    }

    /// Must be called from within a Tokio runtime
    pub fn dispatch(&self, records: Vec<TelemetryRecord>) {
        if records.is_empty() || self.sinks.is_empty() {
            return;
        }

        let records = Arc::new(records);
        for sink in &self.sinks {
            let sink = sink.clone();
            let records = records.clone();
            let counters = self.counters.clone();

            tokio::spawn(async move {
                for record in records.iter() {
                    if let Err(e) = sink.deliver(record).await {
                        warn!(
                            sink = sink.name(),
                            system = %record.system.id,
                            "Telemetry delivery failed: {}", e
                        );
                        if let Some(ref counters) = counters {
                            counters.delivery_failed();
                        }
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EngineStats;
    use crate::model::default_fleet;
    use anyhow::anyhow;

    struct FailingSink;

    #[async_trait]
    impl TelemetrySink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        async fn deliver(&self, _record: &TelemetryRecord) -> Result<()> {
            Err(anyhow!("collector unreachable"))
        }
    }

    fn record() -> TelemetryRecord {
        let system = default_fleet().remove(0);
        TelemetryRecord::new(&system, Severity::Normal, EmitReason::PeriodicFlush, 12.0)
    }

    #[test]
    fn test_record_wire_shape() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["id"], "sys_main_engine");
        assert_eq!(json["relay"]["state"], "ON");
        assert!(json["relay"]["tripped_at"].is_null());
        assert_eq!(json["sensors"][0]["type"], "TEMPERATURE");
        assert_eq!(json["sensors"][0]["critical_max"], 110.0);
        assert!(json["under_attack_ip"].is_null());
        assert_eq!(json["severity"], "NORMAL");
        assert_eq!(json["reason"], "periodic_flush");
    }

    #[tokio::test]
    async fn test_failed_delivery_is_counted_not_raised() {
        let counters = Arc::new(EngineCounters::default());
        let mut dispatcher = TelemetryDispatcher::new().with_counters(counters.clone());
        dispatcher.add_sink(Arc::new(FailingSink));

        dispatcher.dispatch(vec![record(), record()]);

        for _ in 0..50 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            if EngineStats::capture(&counters, chrono::Utc::now()).deliveries_failed == 2 {
                return;
            }
        }
        panic!("failures were not counted");
    }
}

// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! HTTP delivery to the telemetry collector

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use super::{TelemetryRecord, TelemetrySink};
use crate::config::CollectorConfig;

/// Posts each record as JSON to the collector endpoint
pub struct HttpCollector {
    client: reqwest::Client,
    url: String,
}

impl HttpCollector {
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        info!("Telemetry collector at {}", config.url);

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl TelemetrySink for HttpCollector {
    fn name(&self) -> &str {
        "http"
    }

    async fn deliver(&self, record: &TelemetryRecord) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(record)
            .send()
            .await
            .with_context(|| format!("POST {}", self.url))?;

        response
            .error_for_status()
            .with_context(|| format!("Collector rejected record for {}", record.system.id))?;

        debug!(system = %record.system.id, "Delivered telemetry");
        Ok(())
    }
}

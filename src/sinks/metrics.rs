//! Metric sinks.
//!
//! Emissions are counters, never aggregated here. [`RecorderMetricsSink`] hands
//! them to whatever `metrics` recorder the process installed.

use crate::constants::metrics::{NAMESPACE_LABEL, UNIT_LABEL};
use crate::error::Result;
use crate::models::MetricEmission;
use async_trait::async_trait;
use tracing::debug;

#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn put_metric_data(&self, emission: &MetricEmission) -> Result<()>;
}

/// Publishes emissions as counters through the `metrics` facade
#[derive(Debug, Default)]
pub struct RecorderMetricsSink;

impl RecorderMetricsSink {
    /// Increment the counter for one emission on the current recorder
    pub fn record(emission: &MetricEmission) {
        let mut labels = vec![
            ::metrics::Label::new(NAMESPACE_LABEL, emission.namespace.clone()),
            ::metrics::Label::new(UNIT_LABEL, emission.unit.as_str()),
        ];
        labels.extend(
            emission
                .dimensions
                .iter()
                .map(|(name, value)| ::metrics::Label::new(name.clone(), value.clone())),
        );

        ::metrics::counter!(emission.metric_name.clone(), labels).increment(emission.value);
    }
}

#[async_trait]
impl MetricsSink for RecorderMetricsSink {
    async fn put_metric_data(&self, emission: &MetricEmission) -> Result<()> {
        Self::record(emission);
        debug!(
            "Published {} = {} to {} with dimensions {:?}",
            emission.metric_name, emission.value, emission.namespace, emission.dimensions
        );
        Ok(())
    }
}

//! Destinations for the results of one event: the search index receiving the
//! metadata document and the metrics sink receiving counter emissions.

pub mod index;
pub mod metrics;

pub use index::{HttpSearchIndex, LogSearchIndex, SearchIndex};
pub use metrics::{MetricsSink, RecorderMetricsSink};

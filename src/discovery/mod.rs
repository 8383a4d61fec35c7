//! Traffic discovery.
//!
//! # Data Flow
//! ```text
//! access log batch
//!     → drop internal records
//!     → UrlTree::converge (observe the batch, promote crowded positions)
//!     → re-key stored aggregation if anything converged
//!     → insert batch URLs
//!     → resolve each record to (method, normalized URL) and aggregate
//! ```
//!
//! # Design Decisions
//! - Known endpoints are declared up front and never converge away
//! - Records whose URL the tree rejects are skipped, not fatal

pub mod access_log;
pub mod aggregation;
pub mod ingest;

use std::time::Instant;

use thiserror::Error;

use crate::config::KnownEndpointConfig;
use crate::observability::metrics;
use crate::urltree::{Method, UrlTree, UrlTreeConfig, UrlTreeError};

pub use access_log::{read_access_logs, AccessLog};
pub use ingest::{run_ingestion, AccessLogTail};
pub use aggregation::{Aggregation, DiscoveryReport, Endpoint, EndpointAgg, Interceptor, InterceptorAgg};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("known endpoint {method} {url}: {source}")]
    KnownEndpoint {
        method: String,
        url: String,
        #[source]
        source: UrlTreeError,
    },

    #[error("access log line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// What one [`Discovery::process`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub aggregated: usize,
    pub skipped: usize,
    pub converged: bool,
}

/// Aggregates access logs under inferred endpoint patterns.
#[derive(Debug)]
pub struct Discovery {
    tree: UrlTree<()>,
    aggregation: Aggregation,
}

impl Discovery {
    pub fn new(known_endpoints: &[KnownEndpointConfig], config: UrlTreeConfig) -> Result<Self, DiscoveryError> {
        let mut tree = UrlTree::from_config(config);
        for known in known_endpoints {
            tree.insert_declared_url(&known.url, ())
                .map_err(|source| DiscoveryError::KnownEndpoint {
                    method: known.method.clone(),
                    url: known.url.clone(),
                    source,
                })?;
        }
        tracing::debug!(known = known_endpoints.len(), "Discovery tree seeded");

        Ok(Self {
            tree,
            aggregation: Aggregation::default(),
        })
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    pub fn report(&self) -> DiscoveryReport {
        self.aggregation.report()
    }

    pub fn tree(&self) -> &UrlTree<()> {
        &self.tree
    }

    /// Fold one batch of access logs into the aggregation.
    pub fn process(&mut self, batch: &[AccessLog]) -> BatchSummary {
        let started = Instant::now();
        let records: Vec<&AccessLog> = batch.iter().filter(|record| !record.internal).collect();
        let mut summary = BatchSummary::default();
        if records.is_empty() {
            return summary;
        }

        summary.converged = self.tree.converge(records.iter().map(|record| record.path_url()));
        if summary.converged {
            metrics::record_convergence();
            let tree = &self.tree;
            self.aggregation.rekey(|endpoint| {
                let result = tree.lookup(&endpoint.url);
                if result.matched {
                    Endpoint::new(endpoint.method.clone(), result.normalized_url)
                } else {
                    endpoint.clone()
                }
            });
        }

        let mut accepted = Vec::with_capacity(records.len());
        for record in records {
            match self.tree.insert(record.path_url(), ()) {
                Ok(()) => accepted.push(record),
                Err(e) => {
                    tracing::warn!(url = %record.url, error = %e, "Skipping access log record");
                    summary.skipped += 1;
                }
            }
        }

        let mut batch_agg = Aggregation::default();
        for record in accepted {
            let normalized = self.tree.lookup(record.path_url()).normalized_url;
            batch_agg.record(Endpoint::new(Method::new(&record.method), normalized), record);
            summary.aggregated += 1;
        }
        self.aggregation.combine(&batch_agg);

        metrics::record_access_logs(summary.aggregated);
        metrics::record_discovery_batch(self.aggregation.endpoints.len(), started.elapsed());
        tracing::debug!(
            aggregated = summary.aggregated,
            skipped = summary.skipped,
            converged = summary.converged,
            "Discovery batch processed"
        );
        summary
    }

    /// Hand over the aggregation and start a fresh one; the tree is kept.
    pub fn take_aggregation(&mut self) -> Aggregation {
        std::mem::take(&mut self.aggregation)
    }
}

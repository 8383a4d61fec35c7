//! Versioned policy snapshots.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::{GatewayConfig, GlobalPolicyConfig};
use crate::observability::metrics;
use crate::urltree::EndpointTree;

use super::{build_endpoint_policy_tree, EndpointPolicy, PolicyError};

/// An immutable policy version.
#[derive(Debug)]
pub struct PolicySnapshot {
    pub version: u64,
    pub tree: EndpointTree<EndpointPolicy>,
    pub global: GlobalPolicyConfig,
}

impl PolicySnapshot {
    fn empty() -> Self {
        Self {
            version: 0,
            tree: EndpointTree::new(),
            global: GlobalPolicyConfig::default(),
        }
    }
}

/// Holds the active snapshot. Readers never block writers.
#[derive(Debug)]
pub struct PolicyStore {
    current: ArcSwap<PolicySnapshot>,
    last_version: AtomicU64,
}

impl PolicyStore {
    /// A store with version 0 and no policies.
    pub fn empty() -> Self {
        Self {
            current: ArcSwap::from_pointee(PolicySnapshot::empty()),
            last_version: AtomicU64::new(0),
        }
    }

    /// A store whose first snapshot is built from `config`.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, PolicyError> {
        let store = Self::empty();
        store.reload(config)?;
        Ok(store)
    }

    /// The active snapshot.
    pub fn load(&self) -> Arc<PolicySnapshot> {
        self.current.load_full()
    }

    pub fn version(&self) -> u64 {
        self.current.load().version
    }

    /// Build a snapshot from `config` and make it active.
    ///
    /// On failure the active snapshot is kept and the error returned.
    pub fn reload(&self, config: &GatewayConfig) -> Result<u64, PolicyError> {
        let tree = match build_endpoint_policy_tree(&config.endpoints) {
            Ok(tree) => tree,
            Err(e) => {
                let active = self.version();
                tracing::error!(error = %e, active_version = active, "Policy reload failed, keeping active snapshot");
                metrics::record_policy_reload("failure", active);
                return Err(e);
            }
        };

        let version = self.last_version.fetch_add(1, Ordering::SeqCst) + 1;
        self.current.store(Arc::new(PolicySnapshot {
            version,
            tree,
            global: config.global.clone(),
        }));

        tracing::info!(version, endpoints = config.endpoints.len(), "Policy snapshot activated");
        metrics::record_policy_reload("success", version);
        Ok(version)
    }
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::empty()
    }
}

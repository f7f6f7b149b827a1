//! Per-asset single-flight registry.
//!
//! Guarantees at most one in-progress `process_single` per asset id, so an
//! upload-triggered and a batch-triggered run racing on the same asset
//! produce exactly one hash write and no duplicate work.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Registry of asset ids currently being processed.
#[derive(Default)]
pub struct SingleFlight {
    in_flight: Mutex<HashSet<String>>,
}

impl SingleFlight {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim an asset id. Returns `None` if another caller holds it; the
    /// returned guard releases the claim on drop, on every exit path.
    pub fn try_begin(self: &Arc<Self>, asset_id: &str) -> Option<InFlightGuard> {
        let mut in_flight = self.in_flight.lock().expect("single-flight lock poisoned");
        if !in_flight.insert(asset_id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            registry: Arc::clone(self),
            asset_id: asset_id.to_string(),
        })
    }
}

/// RAII claim on an asset id.
pub struct InFlightGuard {
    registry: Arc<SingleFlight>,
    asset_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.registry.in_flight.lock() {
            in_flight.remove(&self.asset_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_rejected_while_held() {
        let registry = SingleFlight::new();
        let guard = registry.try_begin("a.jpg");
        assert!(guard.is_some());
        assert!(registry.try_begin("a.jpg").is_none());
        // A different asset is unaffected
        assert!(registry.try_begin("b.jpg").is_some());
    }

    #[test]
    fn test_claim_released_on_drop() {
        let registry = SingleFlight::new();
        drop(registry.try_begin("a.jpg"));
        assert!(registry.try_begin("a.jpg").is_some());
    }
}

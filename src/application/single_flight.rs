// Single-flight guard: at most one in-flight operation per key
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Held for the duration of an operation; releases the key on drop.
#[derive(Debug)]
pub struct FlightGuard {
    key: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or `None` when an operation for it is already running.
    pub fn try_acquire(&self, key: &str) -> Option<FlightGuard> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(key.to_string()) {
            return None;
        }
        Some(FlightGuard {
            key: key.to_string(),
            in_flight: self.in_flight.clone(),
        })
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused_until_release() {
        let flights = SingleFlight::new();
        let guard = flights.try_acquire("r1");
        assert!(guard.is_some());
        assert!(flights.try_acquire("r1").is_none());
        // Other keys are independent
        assert!(flights.try_acquire("r2").is_some());

        drop(guard);
        assert!(!flights.is_in_flight("r1"));
        assert!(flights.try_acquire("r1").is_some());
    }
}

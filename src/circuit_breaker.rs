//! # Circuit Breaker Module
//!
//! Implements the circuit breaker pattern for external provider calls.
//! A provider that keeps failing is short-circuited for a while so that
//! handlers answer "try later" immediately instead of waiting on timeouts.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::config::BreakerConfig;

/// Circuit breaker guarding one external provider
///
/// ```text
/// CLOSED ────failures ≥ threshold────► OPEN
///    ▲                                   │
///    └──────────reset timeout────────────┘
/// ```
///
/// - **CLOSED → OPEN**: when the consecutive failure count reaches `failure_threshold`
/// - **OPEN → CLOSED**: after `reset_timeout_secs` elapse; the next call probes the provider
/// - Any success resets the failure count
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: BreakerConfig,
}

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure_time: Option<Instant>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            config,
        }
    }

    /// Check if circuit breaker is open (blocking requests)
    ///
    /// Resets itself once the reset timeout has elapsed since the last failure.
    pub fn is_open(&self) -> bool {
        let mut state = self.state.lock();

        if state.failure_count >= self.config.failure_threshold {
            if let Some(last_time) = state.last_failure_time {
                if last_time.elapsed() < Duration::from_secs(self.config.reset_timeout_secs) {
                    return true;
                }
                *state = BreakerState::default();
            }
        }
        false
    }

    /// Record a failure to increment the failure counter
    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.failure_count += 1;
        state.last_failure_time = Some(Instant::now());
    }

    /// Record a success to reset the failure counter
    pub fn record_success(&self) {
        *self.state.lock() = BreakerState::default();
    }
}

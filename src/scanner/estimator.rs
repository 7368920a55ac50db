//! Adaptive per-host timeout estimation.
//!
//! Before the scan starts we time a handful of connects to well-known ports
//! and derive a dial timeout from the median. Whether those connects
//! succeed does not matter; only how long they took.

use crate::scanner::traits::Connector;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Ports sampled for round-trip time.
pub const SAMPLE_PORTS: [u16; 5] = [22, 80, 443, 53, 25];

/// Bound on each sampling connect.
pub const SAMPLE_TIMEOUT: Duration = Duration::from_millis(500);

/// Lowest timeout the estimator will hand out.
pub const MIN_TIMEOUT: Duration = Duration::from_millis(150);

/// Median floor, keeps loopback-fast networks from yielding a tiny estimate.
pub const MEDIAN_FLOOR: Duration = Duration::from_millis(50);

/// Timeout is this many medians.
pub const RTT_MULTIPLIER: u32 = 3;

/// Sample the target and derive a dial timeout no larger than `ceiling`.
///
/// Each sample connection is dropped as soon as it resolves. Never fails.
pub async fn estimate_timeout<C>(connector: &C, target: IpAddr, ceiling: Duration) -> Duration
where
    C: Connector + ?Sized,
{
    let mut samples = Vec::with_capacity(SAMPLE_PORTS.len());

    for port in SAMPLE_PORTS {
        let addr = SocketAddr::new(target, port);
        let started = Instant::now();
        let result = connector.connect(addr, SAMPLE_TIMEOUT).await;
        let elapsed = started.elapsed();
        drop(result);

        debug!(port, elapsed_ms = elapsed.as_millis() as u64, "rtt sample");
        samples.push(elapsed);
    }

    let timeout = derive_timeout(&samples, ceiling);
    info!(
        %target,
        timeout_ms = timeout.as_millis() as u64,
        ceiling_ms = ceiling.as_millis() as u64,
        "estimated connect timeout"
    );
    timeout
}

/// Turn RTT samples into a timeout.
///
/// `max(median, 50ms) * 3`, raised to at least 150ms, then capped at
/// `ceiling`. The cap wins when `ceiling` is below 150ms. No samples means
/// no information, so the ceiling is returned unchanged.
pub fn derive_timeout(samples: &[Duration], ceiling: Duration) -> Duration {
    let Some(median) = median(samples) else {
        return ceiling;
    };

    let candidate = median.max(MEDIAN_FLOOR).saturating_mul(RTT_MULTIPLIER);
    candidate.max(MIN_TIMEOUT).min(ceiling)
}

/// Upper median for even-sized input.
fn median(samples: &[Duration]) -> Option<Duration> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    Some(sorted[sorted.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::test_support::{RefusedConnector, ScriptedConnector};
    use proptest::prelude::*;
    use std::net::Ipv4Addr;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_median_of_five() {
        let samples = [ms(90), ms(10), ms(500), ms(40), ms(60)];
        assert_eq!(median(&samples), Some(ms(60)));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_derive_triples_median() {
        let samples = [ms(100), ms(100), ms(100), ms(100), ms(100)];
        assert_eq!(derive_timeout(&samples, ms(1000)), ms(300));
    }

    #[test]
    fn test_derive_floors_fast_networks() {
        // 1ms median is raised to 50ms, times three is exactly the floor.
        let samples = [ms(1); 5];
        assert_eq!(derive_timeout(&samples, ms(1000)), ms(150));
    }

    #[test]
    fn test_derive_caps_at_ceiling() {
        // Every sample hit the 500ms sampling limit.
        let samples = [SAMPLE_TIMEOUT; 5];
        assert_eq!(derive_timeout(&samples, ms(300)), ms(300));
    }

    #[test]
    fn test_ceiling_below_floor_wins() {
        let samples = [ms(1); 5];
        assert_eq!(derive_timeout(&samples, ms(100)), ms(100));
    }

    #[test]
    fn test_no_samples_returns_ceiling() {
        assert_eq!(derive_timeout(&[], ms(300)), ms(300));
    }

    proptest! {
        #[test]
        fn prop_timeout_within_bounds(
            samples in prop::collection::vec(0u64..5_000, 1..10),
            ceiling in 150u64..10_000,
        ) {
            let samples: Vec<Duration> = samples.into_iter().map(ms).collect();
            let timeout = derive_timeout(&samples, ms(ceiling));
            prop_assert!(timeout >= MIN_TIMEOUT);
            prop_assert!(timeout <= ms(ceiling));
        }
    }

    #[tokio::test]
    async fn test_estimate_folds_errors_into_samples() {
        let connector = RefusedConnector::default();
        let timeout =
            estimate_timeout(&connector, IpAddr::V4(Ipv4Addr::LOCALHOST), ms(300)).await;

        assert_eq!(connector.attempts(), SAMPLE_PORTS.len() as u32);
        assert_eq!(timeout, MIN_TIMEOUT);
    }

    #[tokio::test]
    async fn test_estimate_slow_host_hits_ceiling() {
        let connector = ScriptedConnector::new(ms(100)).with_open(80, b"");
        let timeout =
            estimate_timeout(&connector, IpAddr::V4(Ipv4Addr::LOCALHOST), ms(250)).await;

        // Median is at least 100ms, so 3x overshoots the ceiling.
        assert_eq!(timeout, ms(250));
    }
}

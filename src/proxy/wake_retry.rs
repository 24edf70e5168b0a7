//! The per-request wake/probe retry loop.
//!
//! For one incoming request: probe the backend's health endpoint once,
//! before sending any wake packet. If it is not awake, send one magic
//! packet, sleep `poll_interval`, and probe again, up to `max_retries`
//! cycles. Worst case this performs `max_retries + 1` probes and sends
//! exactly `max_retries` wake packets. Exhaustion is terminal for the
//! request; nothing retries beyond this budget.
//!
//! Concurrent requests to the same sleeping service each run their own
//! loop. Duplicate magic packets are harmless, so there is no
//! cross-request deduplication.

use crate::config::registry::ServiceConfig;
use crate::probe::Prober;
use crate::wake::WakeNotifier;

/// Run the retry loop. Returns `true` once a probe reports awake,
/// `false` when the budget is exhausted.
pub async fn wait_for_awake<P, N>(prober: &P, notifier: &N, service: &ServiceConfig) -> bool
where
    P: Prober + ?Sized,
    N: WakeNotifier + ?Sized,
{
    let health_url = &service.health_check_url;

    // First attempt is not a retry and must not trigger a wake packet.
    if prober.probe(health_url, service.probe_timeout).await {
        return true;
    }

    let mut retries = 0;
    while retries < service.max_retries {
        tracing::info!(
            service = %service.host,
            retry = retries + 1,
            max_retries = service.max_retries,
            poll_interval_secs = service.poll_interval.as_secs(),
            "backend not awake, sending magic packet and retrying"
        );

        notifier.wake(&service.mac_address).await;
        tokio::time::sleep(service.poll_interval).await;
        retries += 1;

        if prober.probe(health_url, service.probe_timeout).await {
            return true;
        }
    }

    false
}

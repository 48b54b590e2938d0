//! Claim verification: the scan state machine, the outcome decision seam,
//! and the async driver that runs a scan to completion.

mod machine;

pub use machine::{ScanError, ScanMachine, ScanOutcome, ScanPhase, SCAN_STEP, SCAN_TARGET};

use std::time::Duration;

/// Decides whether a claim scan on an item passes.
///
/// The decision is isolated behind this trait so a genuine authorization
/// check can replace the checksum placeholder without touching the state
/// machine or its driver.
pub trait ClaimAuthorizer: Send + Sync {
    fn authorize(&self, item_id: &str) -> ScanOutcome;
}

/// Deterministic stand-in for biometric verification: sums the character
/// codes of the item id and rejects iff the sum is congruent to 3 mod 10.
/// The same id therefore always produces the same outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumAuthorizer;

impl ClaimAuthorizer for ChecksumAuthorizer {
    fn authorize(&self, item_id: &str) -> ScanOutcome {
        let sum: u32 = item_id.chars().map(|c| c as u32).sum();
        if sum % 10 == 3 {
            ScanOutcome::Reject
        } else {
            ScanOutcome::Pass
        }
    }
}

/// Timing for the scan driver.
#[derive(Debug, Clone, Copy)]
pub struct ScanTiming {
    /// Interval between progress ticks.
    pub tick: Duration,
    /// Pause after a successful scan before the completion effects run.
    pub success_delay: Duration,
}

impl Default for ScanTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(150),
            success_delay: Duration::from_millis(1500),
        }
    }
}

/// Drive a scan to completion: start, tick on the configured cadence until
/// the machine resolves, and on success hold for the display delay. Returns
/// the outcome; the caller applies any data effects.
pub async fn run_scan(
    authorizer: &dyn ClaimAuthorizer,
    item_id: &str,
    timing: ScanTiming,
) -> ScanOutcome {
    let outcome = authorizer.authorize(item_id);

    let mut machine = ScanMachine::new();
    machine
        .start(outcome)
        .expect("fresh machine accepts start");

    loop {
        tokio::time::sleep(timing.tick).await;
        match machine.tick() {
            ScanPhase::Scanning => continue,
            ScanPhase::Succeeded => {
                tokio::time::sleep(timing.success_delay).await;
                return ScanOutcome::Pass;
            }
            ScanPhase::Failed => return ScanOutcome::Reject,
            ScanPhase::Idle => unreachable!("scan cannot return to idle mid-run"),
        }
    }
}

//! Claim verification scan state machine.
//!
//! Pure transition logic: no timer, no persistence. The async driver in the
//! parent module owns the tick cadence; HTTP handlers own the data effects.

/// Progress added per tick, out of [`SCAN_TARGET`].
pub const SCAN_STEP: u8 = 5;

/// Progress value at which the scan resolves.
pub const SCAN_TARGET: u8 = 100;

/// Outcome of a verification scan, fixed when the scan starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Pass,
    Reject,
}

/// Display state of the scan flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Scanning,
    Succeeded,
    Failed,
}

/// Invalid operations on the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// start() called while a scan is running or after success
    AlreadyRunning,
    /// cancel() called mid-scan
    CancelDuringScan,
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::AlreadyRunning => write!(f, "scan already running"),
            ScanError::CancelDuringScan => write!(f, "cannot cancel a scan in progress"),
        }
    }
}

impl std::error::Error for ScanError {}

/// The four-state scan machine: Idle -> Scanning -> Succeeded | Failed,
/// with Failed -> Scanning as the retry path. Succeeded is terminal.
#[derive(Debug)]
pub struct ScanMachine {
    phase: ScanPhase,
    progress: u8,
    outcome: Option<ScanOutcome>,
}

impl ScanMachine {
    pub fn new() -> Self {
        Self {
            phase: ScanPhase::Idle,
            progress: 0,
            outcome: None,
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Begin a scan. The outcome is recorded here, once; ticks never re-roll
    /// it. Valid from Idle or Failed (retry).
    pub fn start(&mut self, outcome: ScanOutcome) -> Result<(), ScanError> {
        match self.phase {
            ScanPhase::Idle | ScanPhase::Failed => {
                self.phase = ScanPhase::Scanning;
                self.progress = 0;
                self.outcome = Some(outcome);
                Ok(())
            }
            ScanPhase::Scanning | ScanPhase::Succeeded => Err(ScanError::AlreadyRunning),
        }
    }

    /// Advance progress by one step. At the target, resolve to the outcome
    /// recorded at start. A no-op outside the Scanning phase.
    pub fn tick(&mut self) -> ScanPhase {
        if self.phase == ScanPhase::Scanning {
            self.progress = self.progress.saturating_add(SCAN_STEP).min(SCAN_TARGET);
            if self.progress >= SCAN_TARGET {
                self.phase = match self.outcome {
                    Some(ScanOutcome::Pass) => ScanPhase::Succeeded,
                    Some(ScanOutcome::Reject) | None => ScanPhase::Failed,
                };
            }
        }
        self.phase
    }

    /// Abandon the flow. Permitted only while Idle or after a failure; a scan
    /// in progress must run to completion.
    pub fn cancel(&mut self) -> Result<(), ScanError> {
        match self.phase {
            ScanPhase::Idle | ScanPhase::Failed => {
                self.phase = ScanPhase::Idle;
                self.progress = 0;
                self.outcome = None;
                Ok(())
            }
            ScanPhase::Scanning | ScanPhase::Succeeded => Err(ScanError::CancelDuringScan),
        }
    }
}

impl Default for ScanMachine {
    fn default() -> Self {
        Self::new()
    }
}

pub mod preview;
pub mod vision;

/// Why an upstream call fell back to a local value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryReason {
    /// The image reference is host-relative to a loopback address, which the
    /// remote service cannot fetch; the call was skipped entirely.
    LoopbackHost,
    /// Transport or status failure talking to the remote service.
    RemoteFailure,
    /// The remote service answered but no color list could be extracted.
    UnparseableResponse,
}

/// Outcome of an external call. Upstream failures are absorbed into
/// `Recovered` so requests degrade gracefully; `Fatal` is reserved for
/// failures that must surface as a server error.
#[derive(Debug)]
pub enum UpstreamOutcome<T> {
    Success(T),
    Recovered { value: T, reason: RecoveryReason },
    Fatal(anyhow::Error),
}

impl<T> UpstreamOutcome<T> {
    /// Splits the outcome into the usable value and, when recovered, the
    /// reason the fallback fired.
    pub fn into_parts(self) -> anyhow::Result<(T, Option<RecoveryReason>)> {
        match self {
            UpstreamOutcome::Success(value) => Ok((value, None)),
            UpstreamOutcome::Recovered { value, reason } => Ok((value, Some(reason))),
            UpstreamOutcome::Fatal(err) => Err(err),
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, UpstreamOutcome::Recovered { .. })
    }
}

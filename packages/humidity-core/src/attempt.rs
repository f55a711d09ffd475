use log::info;

use crate::{
    catalog::Candidate,
    clock::Clock,
    config::{MAX_POLLS, POLL_INTERVAL_MS},
    radio::{LinkStatus, WifiRadio},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    Connected,
    Failed,
    TimedOut,
}

impl AttemptOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

/// Starts association with one candidate and polls until it settles or the
/// poll budget runs out.
pub async fn try_candidate<R, C>(radio: &mut R, clock: &mut C, candidate: &Candidate) -> AttemptOutcome
where
    R: WifiRadio,
    C: Clock,
{
    if let Err(err) = radio.begin(&candidate.identity).await {
        info!(
            "Begin failed for {} err={}",
            candidate.identity.name,
            err.as_str()
        );
        radio.abandon().await;
        return AttemptOutcome::Failed;
    }

    let mut status = LinkStatus::InProgress;
    for _ in 0..MAX_POLLS {
        status = radio.status();
        if status.is_settled() {
            break;
        }
        clock.sleep_ms(POLL_INTERVAL_MS).await;
    }

    // The link may come up during the final sleep.
    if !status.is_settled() {
        status = radio.status();
    }

    let outcome = match status {
        LinkStatus::Connected => return AttemptOutcome::Connected,
        LinkStatus::ConnectFailed => AttemptOutcome::Failed,
        LinkStatus::Idle | LinkStatus::InProgress => AttemptOutcome::TimedOut,
    };
    // A half-open association must not outlive its candidate.
    radio.abandon().await;
    outcome
}

/// Tries candidates in order and stops at the first one that connects.
pub async fn attempt_connection<R, C>(radio: &mut R, clock: &mut C, candidates: &[Candidate]) -> bool
where
    R: WifiRadio,
    C: Clock,
{
    for candidate in candidates {
        info!("Trying {}", candidate.identity.name);
        match try_candidate(radio, clock, candidate).await {
            AttemptOutcome::Connected => {
                info!("Connected to {}", candidate.identity.name);
                return true;
            }
            outcome => {
                info!(
                    "Failed to connect to {} outcome={}",
                    candidate.identity.name,
                    outcome.as_str()
                );
            }
        }
    }
    false
}

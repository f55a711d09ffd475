use alloc::vec::Vec;

use log::{info, warn};

use crate::{
    catalog::{self, Candidate, NetworkIdentity},
    radio::{ScanResult, WifiRadio},
};

/// Intersects a scan with the catalog and orders the matches strongest
/// first.
///
/// Every scan entry is checked against every catalog entry, so an SSID
/// broadcast by several access points yields one candidate per access
/// point. `sort_by` is stable, which keeps scan order among equal
/// strengths.
pub fn rank_candidates(scan: &[ScanResult], catalog: &[NetworkIdentity]) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for result in scan {
        for identity in catalog::matching(catalog, result.name.as_str()) {
            candidates.push(Candidate {
                signal_strength: result.signal_strength,
                identity: *identity,
            });
        }
    }
    candidates.sort_by(|a, b| b.signal_strength.cmp(&a.signal_strength));
    candidates
}

pub async fn select_candidates<R: WifiRadio>(
    radio: &mut R,
    catalog: &[NetworkIdentity],
) -> Vec<Candidate> {
    info!("Scanning networks");
    let scan = match radio.scan().await {
        Ok(scan) => scan,
        Err(err) => {
            warn!("Scan failed err={}", err.as_str());
            Vec::new()
        }
    };

    info!("Scan results:");
    for result in &scan {
        info!(
            "- {} ({}) ({})",
            result.name,
            result.signal_strength,
            result.security.label()
        );
    }

    rank_candidates(&scan, catalog)
}

use upwatch_store::PopularDoc;

use crate::snapshot::Snapshot;

/// Player count from which a server counts as popular.
pub const POPULAR_THRESHOLD: u32 = 10;

/// How long a server stays in the set after its last qualifying
/// observation.
pub const RETENTION_SECS: i64 = 60 * 60 * 12;

/// Refresh the popularity set from this tick's snapshot, then evict every
/// record whose last qualifying observation fell out of the trailing
/// window. Returns a new document; the caller publishes it wholesale.
pub fn update(doc: &PopularDoc, snapshot: &Snapshot, now: i64) -> PopularDoc {
    let mut next = doc.clone();

    for game in snapshot {
        if game.player_count >= POPULAR_THRESHOLD {
            next.insert(game.name.clone(), now);
        }
    }

    let cutoff = now - RETENTION_SECS;
    next.retain(|_, observed_at| *observed_at >= cutoff);
    next
}

use std::collections::HashMap;

use upwatch_store::{LeaderboardDoc, LeaderboardEntry, Window};

use crate::snapshot::Snapshot;

/// Entries kept per window.
pub const TOP_N: usize = 20;

/// Two observations of the same server within this span count as one
/// listing of the same online spike.
pub const DEDUP_WINDOW_SECS: i64 = 60 * 60 * 12;

/// The snapshot's top entries by player count, stamped with the tick time.
fn top_entries(snapshot: &Snapshot, now: i64) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = snapshot
        .iter()
        .map(|game| LeaderboardEntry {
            name: game.name.clone(),
            player_count: game.player_count,
            observed_at: now,
        })
        .collect();
    entries.sort_by(|a, b| b.player_count.cmp(&a.player_count));
    entries.truncate(TOP_N);
    entries
}

/// Rebuild all five window lists from the previous document and this
/// tick's snapshot. Per window: drop entries that aged out, append the
/// tick's top entries, re-sort descending by player count, dedupe, and
/// truncate to the top 20.
pub fn update(doc: &LeaderboardDoc, snapshot: &Snapshot, now: i64) -> LeaderboardDoc {
    let top = top_entries(snapshot, now);

    let mut next = LeaderboardDoc::default();
    for window in Window::ALL {
        let cutoff = window.cutoff(now);
        let mut list: Vec<LeaderboardEntry> = doc
            .window(window)
            .iter()
            .filter(|entry| entry.observed_at >= cutoff)
            .cloned()
            .chain(top.iter().cloned())
            .collect();
        // Stable sort: within equal scores, older cached entries stay
        // ahead of this tick's entries so dedupe keeps them.
        list.sort_by(|a, b| b.player_count.cmp(&a.player_count));
        let mut list = dedupe(list);
        list.truncate(TOP_N);
        next.servers.insert(window, list);
    }
    next
}

/// Drop entries that duplicate an earlier-kept entry for the same name
/// within [`DEDUP_WINDOW_SECS`].
///
/// Scans in list order keeping a per-name history of kept timestamps, so
/// the first entry of a within-12h cluster survives; with the list sorted
/// by score first, that is the highest-scoring observation of the spike.
/// Pure filter: produces a new list, never removes by index in place.
pub fn dedupe(entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    let mut seen: HashMap<String, Vec<i64>> = HashMap::new();
    let mut kept = Vec::with_capacity(entries.len());

    for entry in entries {
        let times = seen.entry(entry.name.clone()).or_default();
        let duplicate = times
            .iter()
            .any(|t| (t - entry.observed_at).abs() < DEDUP_WINDOW_SECS);
        if duplicate {
            continue;
        }
        times.push(entry.observed_at);
        kept.push(entry);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotEntry;

    const HOUR: i64 = 60 * 60;

    fn game(name: &str, player_count: u32) -> SnapshotEntry {
        SnapshotEntry {
            name: name.into(),
            player_count,
            max_players: 0,
            version: "unknown".into(),
            platform: "unknown".into(),
            build_mode: "unknown".into(),
            has_password: false,
            has_mods: false,
            observed_at: 0,
        }
    }

    fn entry(name: &str, player_count: u32, observed_at: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.into(),
            player_count,
            observed_at,
        }
    }

    #[test]
    fn windows_are_bounded_and_sorted() {
        let snapshot: Snapshot = (0..30).map(|i| game(&format!("s{i}"), i)).collect();
        let doc = update(&LeaderboardDoc::default(), &snapshot, 1_000_000);

        for window in Window::ALL {
            let list = doc.window(window);
            assert_eq!(list.len(), TOP_N);
            assert!(
                list.windows(2)
                    .all(|pair| pair[0].player_count >= pair[1].player_count),
                "window {} not sorted descending",
                window.as_str()
            );
        }
        // Highest counts survive the truncation.
        assert_eq!(doc.window(Window::Day)[0].player_count, 29);
        assert_eq!(doc.window(Window::Day)[TOP_N - 1].player_count, 10);
    }

    #[test]
    fn aged_out_entries_are_dropped_per_window() {
        let now = 100 * 24 * HOUR;
        let mut doc = LeaderboardDoc::default();
        // 2 days old: outside "day", inside all longer windows.
        let old = entry("old", 50, now - 48 * HOUR);
        for window in Window::ALL {
            doc.servers.insert(window, vec![old.clone()]);
        }

        let next = update(&doc, &Vec::new(), now);
        assert!(next.window(Window::Day).is_empty());
        for window in [Window::Week, Window::Month, Window::Year, Window::All] {
            assert_eq!(next.window(window), std::slice::from_ref(&old));
        }
    }

    #[test]
    fn repeat_observation_within_12h_is_deduplicated() {
        let now = 10 * 24 * HOUR;
        let mut doc = LeaderboardDoc::default();
        doc.servers.insert(
            Window::Day,
            vec![entry("Foo", 40, now - 6 * HOUR)],
        );

        // Same server observed again with fewer players: the earlier,
        // higher-scoring observation wins the cluster.
        let next = update(&doc, &vec![game("Foo", 30)], now);
        assert_eq!(
            next.window(Window::Day),
            &[entry("Foo", 40, now - 6 * HOUR)]
        );

        // Observed again with more players: the new observation outranks
        // the cached one and replaces it.
        let next = update(&doc, &vec![game("Foo", 60)], now);
        assert_eq!(next.window(Window::Day), &[entry("Foo", 60, now)]);
    }

    #[test]
    fn observations_more_than_12h_apart_both_stay() {
        let now = 10 * 24 * HOUR;
        let mut doc = LeaderboardDoc::default();
        doc.servers.insert(
            Window::Day,
            vec![entry("Foo", 40, now - 13 * HOUR)],
        );

        let next = update(&doc, &vec![game("Foo", 30)], now);
        assert_eq!(
            next.window(Window::Day),
            &[
                entry("Foo", 40, now - 13 * HOUR),
                entry("Foo", 30, now),
            ]
        );
    }

    #[test]
    fn dedupe_keeps_first_of_each_cluster() {
        let deduped = dedupe(vec![
            entry("Foo", 50, 1_000),
            entry("Bar", 45, 2_000),
            entry("Foo", 40, 1_000 + 11 * HOUR),
            entry("Foo", 35, 1_000 + 13 * HOUR),
        ]);
        assert_eq!(
            deduped,
            vec![
                entry("Foo", 50, 1_000),
                entry("Bar", 45, 2_000),
                entry("Foo", 35, 1_000 + 13 * HOUR),
            ]
        );
    }

    #[test]
    fn dedupe_is_idempotent() {
        let once = dedupe(vec![
            entry("Foo", 50, 1_000),
            entry("Foo", 40, 2_000),
            entry("Bar", 30, 1_000),
            entry("Foo", 20, 14 * HOUR),
        ]);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
    }
}

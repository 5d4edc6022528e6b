use std::collections::{HashMap, HashSet};

use upwatch_store::PopularDoc;

use crate::snapshot::Snapshot;

/// Server and player tallies for one statistics bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub servers: u32,
    pub players: u32,
}

impl Tally {
    fn add(&mut self, players: u32) {
        self.servers += 1;
        self.players += players;
    }
}

/// Tallies per game version.
pub fn by_version(snapshot: &Snapshot) -> HashMap<String, Tally> {
    let mut versions: HashMap<String, Tally> = HashMap::new();
    for game in snapshot {
        versions
            .entry(game.version.clone())
            .or_default()
            .add(game.player_count);
    }
    versions
}

/// Tallies per (platform, build_mode) pair.
pub fn by_platform(snapshot: &Snapshot) -> HashMap<(String, String), Tally> {
    let mut platforms: HashMap<(String, String), Tally> = HashMap::new();
    for game in snapshot {
        platforms
            .entry((game.platform.clone(), game.build_mode.clone()))
            .or_default()
            .add(game.player_count);
    }
    platforms
}

/// Tallies split by password protection.
pub fn by_password(snapshot: &Snapshot) -> HashMap<bool, Tally> {
    let mut passwords: HashMap<bool, Tally> = HashMap::new();
    for game in snapshot {
        passwords
            .entry(game.has_password)
            .or_default()
            .add(game.player_count);
    }
    passwords
}

/// Tallies split by mod usage.
pub fn by_mods(snapshot: &Snapshot) -> HashMap<bool, Tally> {
    let mut mods: HashMap<bool, Tally> = HashMap::new();
    for game in snapshot {
        mods.entry(game.has_mods).or_default().add(game.player_count);
    }
    mods
}

/// Current player counts for servers that are popular this tick or are
/// already members of the seed set.
pub fn popular_players(snapshot: &Snapshot, seed: &PopularDoc) -> HashMap<String, u32> {
    let mut popular = HashMap::new();
    for game in snapshot {
        if seed.contains_key(&game.name) || game.player_count >= crate::popular::POPULAR_THRESHOLD
        {
            popular.insert(game.name.clone(), game.player_count);
        }
    }
    popular
}

/// One-line overview of a tick's snapshot, logged every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub servers: u32,
    pub players: u32,
    pub versions: u32,
    pub passworded: u32,
    pub modded: u32,
}

pub fn summarize(snapshot: &Snapshot) -> SnapshotSummary {
    let mut versions = HashSet::new();
    let mut summary = SnapshotSummary {
        servers: snapshot.len() as u32,
        players: 0,
        versions: 0,
        passworded: 0,
        modded: 0,
    };

    for game in snapshot {
        summary.players += game.player_count;
        versions.insert(game.version.as_str());
        summary.passworded += u32::from(game.has_password);
        summary.modded += u32::from(game.has_mods);
    }

    summary.versions = versions.len() as u32;
    summary
}

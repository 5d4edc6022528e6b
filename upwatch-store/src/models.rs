use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Persisted presence state for one tracked server.
///
/// Both flags are tri-state: `None` means "never observed", a concrete
/// boolean means the last classified observation. `listed` leaves `None`
/// after the first classification and never returns to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityState {
  #[serde(default)]
  pub listed: Option<bool>,
  #[serde(default)]
  pub passworded: Option<bool>,
}

/// A server name being watched for listing changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedServer {
  /// Server name as it appears in the public games list.
  /// Unique within the owning target; names in the list itself may collide.
  pub name: String,
  #[serde(default)]
  pub state: EntityState,
}

impl TrackedServer {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      state: EntityState::default(),
    }
  }
}

/// A mention to append to a notification when a warning fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionRef {
  Role(u64),
  Member(u64),
}

/// One notification target with its curated list of tracked servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchTarget {
  /// Opaque target id; the notifier maps it to a destination channel.
  pub id: String,
  #[serde(default)]
  pub mentions: Vec<MentionRef>,
  #[serde(default)]
  pub servers: Vec<TrackedServer>,
}

impl WatchTarget {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      mentions: Vec::new(),
      servers: Vec::new(),
    }
  }
}

/// One of the five overlapping leaderboard retention windows.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Window {
  Day,
  Week,
  Month,
  Year,
  All,
}

impl Window {
  pub const ALL: [Window; 5] = [
    Window::Day,
    Window::Week,
    Window::Month,
    Window::Year,
    Window::All,
  ];

  /// Oldest `observed_at` still inside this window as of `now`.
  pub fn cutoff(self, now: i64) -> i64 {
    match self {
      Window::Day => now - 60 * 60 * 24,
      Window::Week => now - 60 * 60 * 24 * 7,
      Window::Month => now - 60 * 60 * 24 * 30,
      Window::Year => now - 60 * 60 * 24 * 365,
      Window::All => 0,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Window::Day => "day",
      Window::Week => "week",
      Window::Month => "month",
      Window::Year => "year",
      Window::All => "all",
    }
  }
}

/// A ranked observation of one server during one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
  pub name: String,
  pub player_count: u32,
  /// Unix timestamp of the tick that produced this entry.
  pub observed_at: i64,
}

/// The persisted leaderboard document, one top list per window.
///
/// `BTreeMap` keeps the JSON key order deterministic across rewrites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardDoc {
  #[serde(default)]
  pub servers: BTreeMap<Window, Vec<LeaderboardEntry>>,
}

impl LeaderboardDoc {
  pub fn window(&self, window: Window) -> &[LeaderboardEntry] {
    self.servers.get(&window).map(Vec::as_slice).unwrap_or(&[])
  }
}

/// Persisted popularity document: server name to the unix timestamp of its
/// last qualifying observation.
pub type PopularDoc = BTreeMap<String, i64>;

pub mod checker;
pub mod classify;
pub mod config;
pub mod fetch;
pub mod helpers;
pub mod leaderboard;
pub mod notify;
pub mod popular;
pub mod schedule;
pub mod snapshot;
pub mod stats;
pub mod track;

pub use checker::{Checker, TickError, TrackOpError};
pub use classify::{Event, EventClass};
pub use config::Config;
pub use fetch::{FetchError, HttpSnapshotFetcher, SnapshotFetcher};
pub use notify::{ConfiguredMentions, LogNotifier, MentionResolver, Notifier};
pub use snapshot::{Snapshot, SnapshotEntry};
pub use track::{TargetRegistry, TrackError};

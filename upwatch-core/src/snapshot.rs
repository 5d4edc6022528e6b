use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// The full public games list as observed during one tick.
///
/// Order is not stable across ticks and must not be used for identity;
/// only `name` identifies a server, and names may collide.
pub type Snapshot = Vec<SnapshotEntry>;

/// One game entry from the public listing, validated at the fetch boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub name: String,
    pub player_count: u32,
    /// 0 means unlimited.
    pub max_players: u32,
    pub version: String,
    pub platform: String,
    pub build_mode: String,
    pub has_password: bool,
    pub has_mods: bool,
    /// Unix timestamp of the tick that observed this entry.
    pub observed_at: i64,
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("expected a list of games, got {0}")]
    NotAList(&'static str),

    #[error("malformed game entry: {0}")]
    BadEntry(#[source] serde_json::Error),
}

/// Validate a raw listing payload into a typed snapshot.
///
/// Individual fields are lenient: missing name/version fall back to
/// "unknown", booleans accept `true`/`"true"`/`null`, a missing player
/// list counts as empty. A payload that is not a list at all is rejected
/// as malformed, which aborts the current tick only.
pub fn parse_listing(
    payload: serde_json::Value,
    observed_at: i64,
) -> Result<Snapshot, ListingError> {
    let items = match payload {
        serde_json::Value::Array(items) => items,
        other => return Err(ListingError::NotAList(json_type(&other))),
    };

    items
        .into_iter()
        .map(|item| {
            let raw: RawEntry =
                serde_json::from_value(item).map_err(ListingError::BadEntry)?;
            Ok(raw.into_entry(observed_at))
        })
        .collect()
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Wire shape of one game entry; loosely typed the way the listing
/// endpoint actually serves it.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    players: Vec<String>,
    #[serde(default)]
    max_players: u32,
    #[serde(default)]
    application_version: RawVersion,
    #[serde(default, deserialize_with = "flexible_bool")]
    has_password: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    has_mods: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawVersion {
    #[serde(default)]
    game_version: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    build_mode: Option<String>,
}

impl RawEntry {
    fn into_entry(self, observed_at: i64) -> SnapshotEntry {
        let unknown = || "unknown".to_string();
        SnapshotEntry {
            name: self.name.unwrap_or_else(unknown),
            player_count: self.players.len() as u32,
            max_players: self.max_players,
            version: self.application_version.game_version.unwrap_or_else(unknown),
            platform: self.application_version.platform.unwrap_or_else(unknown),
            build_mode: self.application_version.build_mode.unwrap_or_else(unknown),
            has_password: self.has_password,
            has_mods: self.has_mods,
            observed_at,
        }
    }
}

/// The listing serves booleans as `true`, `"true"`, `"false"` or `null`.
fn flexible_bool<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flex {
        Bool(bool),
        Str(String),
    }

    match Option::<Flex>::deserialize(de)? {
        None => Ok(false),
        Some(Flex::Bool(b)) => Ok(b),
        Some(Flex::Str(s)) => Ok(s == "true"),
    }
}

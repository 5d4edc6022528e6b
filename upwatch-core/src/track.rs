use scc::HashMap;
use upwatch_store::{EntityState, MentionRef, TrackedServer, WatchTarget};

/// In-memory registry of watch targets and their tracked servers.
///
/// Add/remove operations may run concurrently with a tick; the tick takes
/// a copy of every target, classifies against it, and writes states back
/// per server name, so classifier iteration never holds the map locked.
pub struct TargetRegistry {
    targets: HashMap<String, WatchTarget>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self {
            targets: HashMap::new(),
        }
    }

    /// Replace the whole registry with persisted targets, on startup.
    pub async fn replace_all(&self, targets: Vec<WatchTarget>) {
        self.targets.clear_async().await;
        for target in targets {
            let _ = self.targets.insert_async(target.id.clone(), target).await;
        }
    }

    /// Start tracking a server for a target, creating the target if
    /// needed. The seed state comes from the current snapshot when the
    /// caller has one, else unset/unset.
    pub async fn add_server(
        &self,
        target_id: &str,
        name: &str,
        seed: EntityState,
    ) -> Result<(), TrackError> {
        self.ensure_target(target_id).await;
        let name = name.to_string();
        self.targets
            .update_async(target_id, move |_, target| {
                if target.servers.iter().any(|s| s.name == name) {
                    return Err(TrackError::AlreadyTracked);
                }
                target.servers.push(TrackedServer { name, state: seed });
                Ok(())
            })
            .await
            .unwrap_or(Err(TrackError::TargetNotFound))
    }

    /// Stop tracking a server.
    pub async fn remove_server(&self, target_id: &str, name: &str) -> Result<(), TrackError> {
        self.targets
            .update_async(target_id, |_, target| {
                match target.servers.iter().position(|s| s.name == name) {
                    Some(index) => {
                        target.servers.remove(index);
                        Ok(())
                    }
                    None => Err(TrackError::NotTracked),
                }
            })
            .await
            .unwrap_or(Err(TrackError::TargetNotFound))
    }

    /// Configure the mentions appended to warning notifications.
    pub async fn set_mentions(&self, target_id: &str, mentions: Vec<MentionRef>) {
        self.ensure_target(target_id).await;
        self.targets
            .update_async(target_id, move |_, target| {
                target.mentions = mentions;
            })
            .await;
    }

    /// Copy of every target, sorted by id for deterministic persistence.
    pub async fn snapshot_targets(&self) -> Vec<WatchTarget> {
        let mut targets = Vec::new();
        self.targets
            .scan_async(|_, target| targets.push(target.clone()))
            .await;
        targets.sort_by(|a, b| a.id.cmp(&b.id));
        targets
    }

    /// Write classified states back after a tick. Servers removed while
    /// the tick ran are skipped; servers added keep their seed state.
    pub async fn apply_states(&self, classified: &WatchTarget) {
        self.targets
            .update_async(&classified.id, |_, target| {
                for server in &mut target.servers {
                    if let Some(updated) =
                        classified.servers.iter().find(|s| s.name == server.name)
                    {
                        server.state = updated.state.clone();
                    }
                }
            })
            .await;
    }

    async fn ensure_target(&self, target_id: &str) {
        let _ = self
            .targets
            .insert_async(target_id.to_string(), WatchTarget::new(target_id))
            .await;
    }
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("target not found in registry")]
    TargetNotFound,
    #[error("server with that name has already been added")]
    AlreadyTracked,
    #[error("no server with that name is being checked for")]
    NotTracked,
}

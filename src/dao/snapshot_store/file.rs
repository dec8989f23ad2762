//! Flat-file snapshot store. The whole games snapshot is serialized to one
//! JSON file after every mutation; reads re-parse the file so that work
//! scheduled in the past always observes the latest durable state.

use std::io::ErrorKind;
use std::path::PathBuf;

use futures::future::BoxFuture;

use crate::dao::snapshot_store::SnapshotStore;
use crate::dao::storage::{StorageError, StorageResult};
use crate::state::game::GamesSnapshot;

/// JSON-file backed implementation of [`SnapshotStore`].
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store persisting to `path`. The file is created on the first
    /// persist; a missing file reads back as the empty snapshot.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<GamesSnapshot>> {
        let path = self.path.clone();
        Box::pin(async move {
            match tokio::fs::read(&path).await {
                Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                    StorageError::unavailable(
                        format!("corrupt snapshot file {}", path.display()),
                        err,
                    )
                }),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(GamesSnapshot::default()),
                Err(err) => Err(StorageError::unavailable(
                    format!("failed to read snapshot file {}", path.display()),
                    err,
                )),
            }
        })
    }

    fn persist(&self, snapshot: GamesSnapshot) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path.clone();
        Box::pin(async move {
            let bytes = serde_json::to_vec(&snapshot).map_err(|err| {
                StorageError::unavailable("failed to serialize snapshot".into(), err)
            })?;

            // Write-then-rename so readers never observe a half-written file.
            let tmp = path.with_extension("json.tmp");
            tokio::fs::write(&tmp, &bytes).await.map_err(|err| {
                StorageError::unavailable(
                    format!("failed to write snapshot file {}", tmp.display()),
                    err,
                )
            })?;
            tokio::fs::rename(&tmp, &path).await.map_err(|err| {
                StorageError::unavailable(
                    format!("failed to move snapshot file into {}", path.display()),
                    err,
                )
            })?;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path.clone();
        Box::pin(async move {
            match tokio::fs::metadata(&path).await {
                Ok(_) => Ok(()),
                // Nothing persisted yet is a healthy empty store.
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(StorageError::unavailable(
                    format!("failed to stat snapshot file {}", path.display()),
                    err,
                )),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::{Game, QuizSnapshot};

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hotseat-store-{tag}-{}.json", std::process::id()))
    }

    fn empty_quiz(quiz_id: u64) -> QuizSnapshot {
        QuizSnapshot {
            quiz_id,
            name: "quiz".into(),
            description: String::new(),
            questions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty_snapshot() {
        let store = FileStore::new(temp_path("missing"));
        let snapshot = store.load().await.unwrap();
        assert!(snapshot.games.is_empty());
    }

    #[tokio::test]
    async fn persist_then_load_round_trips() {
        let path = temp_path("roundtrip");
        let store = FileStore::new(&path);

        let mut snapshot = GamesSnapshot::default();
        snapshot.games.push(Game::new(1, empty_quiz(42), 3));
        store.persist(snapshot).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.games.len(), 1);
        assert_eq!(loaded.games[0].game_id, 1);
        assert_eq!(loaded.games[0].quiz.quiz_id, 42);
        assert_eq!(loaded.games[0].auto_start_num, 3);

        let _ = tokio::fs::remove_file(&path).await;
    }
}

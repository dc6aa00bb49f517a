use std::collections::HashSet;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Header line of the mood log file, kept for compatibility with the CSV
/// consumers of the log.
const HEADER: &str = "mood";

/// Append-only log of distinct mood strings.
///
/// Each normalized mood is persisted at most once over the log's lifetime.
/// The seen-set is loaded from the file at startup and guarded by a mutex,
/// so concurrent requests with the same new mood produce a single entry.
/// Write failures are absorbed: telemetry never blocks a recommendation.
pub struct MoodLog {
    path: PathBuf,
    seen: Mutex<HashSet<String>>,
}

impl MoodLog {
    /// Loads previously seen moods from the log file. A missing or unreadable
    /// file starts an empty log.
    pub fn load(path: PathBuf) -> Self {
        let seen = match std::fs::read_to_string(&path) {
            Ok(contents) => contents
                .lines()
                .enumerate()
                .filter(|(position, line)| !(*position == 0 && *line == HEADER))
                .map(|(_, line)| line.to_string())
                .collect(),
            Err(error) => {
                if error.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %error, "Could not read mood log, starting empty");
                }
                HashSet::new()
            }
        };

        Self {
            path,
            seen: Mutex::new(seen),
        }
    }

    /// Records a normalized mood if it has not been seen before.
    pub async fn record(&self, mood: &str) {
        let mut seen = self.seen.lock().await;
        if !seen.insert(mood.to_string()) {
            return;
        }

        if let Err(error) = self.append(mood).await {
            tracing::warn!(mood = %mood, error = %error, "Failed to persist mood log entry");
        } else {
            tracing::debug!(mood = %mood, "New mood logged");
        }
    }

    async fn append(&self, mood: &str) -> std::io::Result<()> {
        let needs_header = !self.path.exists();
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        if needs_header {
            file.write_all(format!("{}\n", HEADER).as_bytes()).await?;
        }
        file.write_all(format!("{}\n", mood).as_bytes()).await?;
        Ok(())
    }

    /// Whether the mood has already been recorded this lifetime.
    pub async fn contains(&self, mood: &str) -> bool {
        self.seen.lock().await.contains(mood)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn log_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("user_moods.csv")
    }

    #[tokio::test]
    async fn test_record_writes_distinct_moods_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = MoodLog::load(log_path(&dir));

        log.record("adventure").await;
        log.record("adventure").await;
        log.record("calm").await;

        let contents = std::fs::read_to_string(log_path(&dir)).unwrap();
        assert_eq!(contents, "mood\nadventure\ncalm\n");
    }

    #[tokio::test]
    async fn test_load_dedups_against_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(log_path(&dir), "mood\nadventure\n").unwrap();

        let log = MoodLog::load(log_path(&dir));
        assert!(log.contains("adventure").await);

        log.record("adventure").await;
        let contents = std::fs::read_to_string(log_path(&dir)).unwrap();
        assert_eq!(contents, "mood\nadventure\n");
    }

    #[tokio::test]
    async fn test_concurrent_same_mood_is_logged_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(MoodLog::load(log_path(&dir)));

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let log = Arc::clone(&log);
            tasks.push(tokio::spawn(async move {
                log.record("wanderlust").await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let contents = std::fs::read_to_string(log_path(&dir)).unwrap();
        assert_eq!(contents.matches("wanderlust").count(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_is_absorbed() {
        // A directory path makes every append fail.
        let dir = tempfile::tempdir().unwrap();
        let log = MoodLog::load(dir.path().to_path_buf());

        log.record("adventure").await;
        assert!(log.contains("adventure").await);
    }
}

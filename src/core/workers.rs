// src/core/workers.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Default bound on concurrently processed files
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 4)
        .unwrap_or(16)
}

/// Read every file and run `work` on its contents, at most `limit` files at a
/// time. Results come back in input order; a failed read is returned as the
/// I/O error instead of aborting the batch.
pub async fn map_files<T, F>(paths: &[PathBuf], limit: usize, work: F) -> Vec<(PathBuf, std::io::Result<T>)>
where
    T: Send + 'static,
    F: Fn(&Path, String) -> T + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let work = Arc::new(work);
    let mut tasks = JoinSet::new();

    for (index, path) in paths.iter().cloned().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let work = Arc::clone(&work);

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let result = match tokio::fs::read_to_string(&path).await {
                Ok(content) => Ok(work(&path, content)),
                Err(e) => {
                    debug!("Skipping unreadable file {}: {}", path.display(), e);
                    Err(e)
                }
            };
            (index, path, result)
        });
    }

    let mut slots: Vec<Option<(PathBuf, std::io::Result<T>)>> = (0..paths.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, path, result)) => slots[index] = Some((path, result)),
            Err(e) => warn!("File worker failed: {}", e),
        }
    }

    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_map_files_preserves_order_and_reports_errors() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "one").unwrap();
        std::fs::write(&b, "three").unwrap();
        let missing = dir.path().join("missing.txt");

        let paths = vec![b.clone(), missing.clone(), a.clone()];
        let results = map_files(&paths, 1, |_, content| content.len()).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, b);
        assert_eq!(*results[0].1.as_ref().unwrap(), 5);
        assert!(results[1].1.is_err());
        assert_eq!(*results[2].1.as_ref().unwrap(), 3);
    }
}

use crate::foundation::error::SeewavResult;
use anyhow::Context as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Scratch directory owned by one run phase; removed with its contents on drop.
#[derive(Debug)]
pub(crate) struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Create a fresh directory under the system temp dir.
    pub(crate) fn create(label: &str) -> SeewavResult<Self> {
        let path = std::env::temp_dir().join(format!(
            "seewav_{label}_{}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            NEXT_ID.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create work directory '{}'", path.display()))?;
        Ok(Self { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Write `bytes` to `name` inside the directory and return the full path.
    pub(crate) fn write(&self, name: &str, bytes: &[u8]) -> SeewavResult<PathBuf> {
        let p = self.join(name);
        std::fs::write(&p, bytes).with_context(|| format!("failed to write '{}'", p.display()))?;
        Ok(p)
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

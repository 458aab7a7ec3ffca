//! Atomic file writes with optional owner-only permissions.

use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use rootlink_core::Result;

/// Write `contents` to `path` via a temp file and rename.
///
/// Parent directories are created as needed. With `private` set, the file is
/// created readable by its owner only (where the platform supports it), so a
/// secret is never briefly world-readable.
pub fn write_atomic(path: &Path, contents: &[u8], private: bool) -> Result<()> {
    let tmp_path = stage(path, contents, private)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let name = format!(
        ".{}.{}.{}.{suffix}",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    path.with_file_name(name)
}

/// Write `contents` next to `path` and return the temp file
fn stage(path: &Path, contents: &[u8], private: bool) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = sibling(path, "tmp");

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    if private {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    #[cfg(not(unix))]
    let _ = private;

    let written = options.open(&tmp_path).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(tmp_path)
}

fn with_newline(pem: &str) -> Cow<'_, str> {
    if pem.ends_with('\n') {
        Cow::Borrowed(pem)
    } else {
        Cow::Owned(format!("{pem}\n"))
    }
}

/// A set of files that replace their targets together.
///
/// Every file is written to a temp sibling first. [`FileBatch::commit`]
/// moves them into place and, if one move fails, restores the files the
/// batch had already replaced. Dropping an uncommitted batch removes the
/// temp files and leaves the targets untouched.
#[derive(Debug, Default)]
pub struct FileBatch {
    staged: Vec<(PathBuf, PathBuf)>,
}

impl FileBatch {
    /// Empty batch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `contents` for `path`
    pub fn add(&mut self, path: &Path, contents: &[u8], private: bool) -> Result<()> {
        let tmp = stage(path, contents, private)?;
        self.staged.push((tmp, path.to_path_buf()));
        Ok(())
    }

    /// Stage a PEM document, guaranteeing a trailing newline
    pub fn add_pem(&mut self, path: &Path, pem: &str, private: bool) -> Result<()> {
        self.add(path, with_newline(pem).as_bytes(), private)
    }

    /// Move every staged file into place, all or nothing
    pub fn commit(mut self) -> Result<()> {
        let staged = std::mem::take(&mut self.staged);
        let mut replaced: Vec<(PathBuf, Option<PathBuf>)> = Vec::with_capacity(staged.len());

        for (index, (tmp, target)) in staged.iter().enumerate() {
            let backup = match replace(tmp, target) {
                Ok(backup) => backup,
                Err(e) => {
                    for (tmp, _) in &staged[index..] {
                        let _ = std::fs::remove_file(tmp);
                    }
                    for (target, backup) in replaced.into_iter().rev() {
                        let _ = std::fs::remove_file(&target);
                        if let Some(backup) = backup {
                            let _ = std::fs::rename(backup, &target);
                        }
                    }
                    return Err(e);
                }
            };
            replaced.push((target.clone(), backup));
        }

        for backup in replaced.into_iter().filter_map(|(_, backup)| backup) {
            let _ = std::fs::remove_file(backup);
        }
        Ok(())
    }
}

/// Move `tmp` onto `target`, keeping the previous file aside
fn replace(tmp: &Path, target: &Path) -> Result<Option<PathBuf>> {
    let backup = if target.is_file() {
        let backup = sibling(target, "bak");
        std::fs::rename(target, &backup)?;
        Some(backup)
    } else {
        None
    };
    if let Err(e) = std::fs::rename(tmp, target) {
        if let Some(backup) = &backup {
            let _ = std::fs::rename(backup, target);
        }
        return Err(e.into());
    }
    Ok(backup)
}

impl Drop for FileBatch {
    fn drop(&mut self) {
        for (tmp, _) in &self.staged {
            let _ = std::fs::remove_file(tmp);
        }
    }
}

/// Write a PEM document, guaranteeing a trailing newline
pub fn write_pem(path: &Path, pem: &str, private: bool) -> Result<()> {
    write_atomic(path, with_newline(pem).as_bytes(), private)
}

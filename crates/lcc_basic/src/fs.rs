//! The filesystem probe used by the file manager.
//!
//! A probe answers one question: does this path exist, and if so what is its
//! on-disk identity and metadata. The file manager never touches the
//! filesystem any other way, which is what lets tests count probes.

use std::io;

/// Metadata returned by a successful probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileStat {
    /// Device holding the entry.
    pub device: u64,
    /// Inode number of the entry on `device`.
    pub inode: u64,
    /// Size in bytes.
    pub size: u64,
    /// Modification time, seconds since the Unix epoch.
    pub mod_time: i64,
    /// File mode bits as reported by `stat(2)`.
    pub mode: u32,
    /// True for directories, false for every other kind of entry.
    pub is_dir: bool,
}

impl FileStat {
    /// The `(device, inode)` pair naming the on-disk entry.
    #[inline]
    pub fn identity(&self) -> (u64, u64) {
        (self.device, self.inode)
    }
}

/// Answers metadata queries for paths.
///
/// Implementations must follow symbolic links, so that every alias of an
/// entry reports the same identity.
pub trait FileSystem {
    fn stat(&self, path: &str) -> io::Result<FileStat>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn stat(&self, path: &str) -> io::Result<FileStat> {
        (**self).stat(path)
    }
}

/// Probes the real filesystem of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

#[cfg(unix)]
impl FileSystem for RealFileSystem {
    fn stat(&self, path: &str) -> io::Result<FileStat> {
        use std::os::unix::fs::MetadataExt;

        let meta = std::fs::metadata(path)?;
        Ok(FileStat {
            device: meta.dev(),
            inode: meta.ino(),
            size: meta.size(),
            mod_time: meta.mtime(),
            mode: meta.mode(),
            is_dir: meta.is_dir(),
        })
    }
}

#[cfg(not(unix))]
impl FileSystem for RealFileSystem {
    fn stat(&self, path: &str) -> io::Result<FileStat> {
        use std::hash::{Hash, Hasher};

        let meta = std::fs::metadata(path)?;
        // No portable inode: the canonical path stands in for the identity.
        let canonical = std::fs::canonicalize(path)?;
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        canonical.hash(&mut hasher);
        let mod_time = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX));
        Ok(FileStat {
            device: 0,
            inode: hasher.finish(),
            size: meta.len(),
            mod_time,
            mode: u32::from(!meta.permissions().readonly()),
            is_dir: meta.is_dir(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_reports_kind_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.c");
        std::fs::write(&file, "int x;\n").unwrap();

        let fs = RealFileSystem;
        let d = fs.stat(dir.path().to_str().unwrap()).unwrap();
        assert!(d.is_dir);

        let f = fs.stat(file.to_str().unwrap()).unwrap();
        assert!(!f.is_dir);
        assert_eq!(f.size, 7);
        assert_ne!(f.identity(), d.identity());
    }

    #[test]
    fn stat_of_a_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.h");
        assert!(RealFileSystem.stat(missing.to_str().unwrap()).is_err());
        assert!(RealFileSystem.stat("").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn stat_follows_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("real.h");
        let link = dir.path().join("link.h");
        std::fs::write(&target, "").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let a = RealFileSystem.stat(target.to_str().unwrap()).unwrap();
        let b = RealFileSystem.stat(link.to_str().unwrap()).unwrap();
        assert_eq!(a.identity(), b.identity());
    }
}

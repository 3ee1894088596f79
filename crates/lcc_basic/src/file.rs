//! Resolution of path strings to canonical directory and file records.
//!
//! Callers hold path *strings*; correctness needs on-disk *identity*. The
//! [`FileManager`] bridges the two with a two-level cache:
//!
//! 1. A path cache keyed by the literal string a caller passed in. It
//!    remembers both hits and misses, so a given string is probed at most
//!    once per session.
//! 2. Identity indexes keyed by `(device, inode)`. Every alias of the same
//!    entry (`..` segments, symlinks, relative vs. absolute spellings) lands
//!    on the one canonical record created for it.
//!
//! Records are allocated in arenas owned by the manager and are named by
//! [`DirectoryId`] / [`FileId`] handles. Two handles are equal exactly when
//! they name the same on-disk entry.

use crate::fs::{FileStat, FileSystem, RealFileSystem};

use lcc_arena::{entity_impl, Arena, SideTable};
use lcc_interner::{Interner, Symbol};

use std::{
    cmp::Ordering,
    collections::{hash_map::Entry, HashMap},
    io::Write,
    ops::Index,
};

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Handle to a canonical [`DirectoryEntry`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirectoryId(u32);
entity_impl!(DirectoryId, "dir");

/// Handle to a canonical [`FileEntry`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);
entity_impl!(FileId, "file");

// ---------------------------------------------------------------------------
// DirectoryEntry
// ---------------------------------------------------------------------------

/// Cached information about one directory on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    name: Symbol,
}

impl DirectoryEntry {
    /// The first path string this directory was reached through.
    ///
    /// Resolve it with [`FileManager::resolve_name`].
    #[inline]
    pub fn name(&self) -> Symbol {
        self.name
    }
}

// ---------------------------------------------------------------------------
// FileEntry
// ---------------------------------------------------------------------------

/// Cached information about one file on disk.
///
/// Entries order by `(device, inode)`, which gives a stable sort order; the
/// identity of an entry is its [`FileId`].
#[derive(Debug, Clone, Copy)]
pub struct FileEntry {
    name: Symbol,
    size: u64,
    mod_time: i64,
    dir: DirectoryId,
    uid: u32,
    device: u64,
    inode: u64,
    mode: u32,
}

impl FileEntry {
    /// The first path string this file was reached through.
    #[inline]
    pub fn name(&self) -> Symbol {
        self.name
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn mod_time(&self) -> i64 {
        self.mod_time
    }

    /// The directory the file was first found in.
    #[inline]
    pub fn dir(&self) -> DirectoryId {
        self.dir
    }

    /// A small id, unique per canonical file and never reused in a session.
    #[inline]
    pub fn uid(&self) -> u32 {
        self.uid
    }

    #[inline]
    pub fn device(&self) -> u64 {
        self.device
    }

    #[inline]
    pub fn inode(&self) -> u64 {
        self.inode
    }

    #[inline]
    pub fn mode(&self) -> u32 {
        self.mode
    }
}

impl PartialEq for FileEntry {
    fn eq(&self, other: &Self) -> bool {
        (self.device, self.inode) == (other.device, other.inode)
    }
}

impl Eq for FileEntry {}

impl PartialOrd for FileEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FileEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.device, self.inode).cmp(&(other.device, other.inode))
    }
}

// ---------------------------------------------------------------------------
// FileManagerStats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileManagerStats {
    pub unique_dirs: usize,
    pub unique_files: usize,
    pub dir_lookups: u32,
    pub dir_cache_misses: u32,
    pub file_lookups: u32,
    pub file_cache_misses: u32,
}

// ---------------------------------------------------------------------------
// FileManager
// ---------------------------------------------------------------------------

/// What the path cache knows about one literal path string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathState<K> {
    /// Never queried.
    Unknown,
    /// Queried, and the probe failed or found the wrong kind of entry.
    Missing,
    Found(K),
}

/// Looks up, caches and uniques directories and files.
///
/// A file with several names (a symlink, a path through `..`, a relative
/// and an absolute spelling) resolves to a single [`FileId`]. The name kept
/// on the canonical record is the first spelling that reached it.
pub struct FileManager<F = RealFileSystem> {
    fs: F,
    /// Storage for every literal path string ever queried.
    names: Interner,
    /// Path cache for directory queries, keyed by the queried string.
    dir_cache: SideTable<Symbol, PathState<DirectoryId>>,
    /// Path cache for file queries, keyed by the queried string.
    file_cache: SideTable<Symbol, PathState<FileId>>,
    /// Identity index for directories.
    unique_dirs: HashMap<(u64, u64), DirectoryId>,
    /// Identity index for files.
    unique_files: HashMap<(u64, u64), FileId>,
    dirs: Arena<DirectoryId, DirectoryEntry>,
    files: Arena<FileId, FileEntry>,
    next_file_uid: u32,
    num_dir_lookups: u32,
    num_dir_cache_misses: u32,
    num_file_lookups: u32,
    num_file_cache_misses: u32,
}

impl Default for FileManager<RealFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl FileManager<RealFileSystem> {
    /// Creates a manager probing the host filesystem.
    pub fn new() -> Self {
        Self::with_file_system(RealFileSystem)
    }
}

impl<F: FileSystem> FileManager<F> {
    /// Creates a manager that sends every probe to `fs`.
    pub fn with_file_system(fs: F) -> Self {
        Self {
            fs,
            names: Interner::new(),
            dir_cache: SideTable::with_default(PathState::Unknown),
            file_cache: SideTable::with_default(PathState::Unknown),
            unique_dirs: HashMap::new(),
            unique_files: HashMap::new(),
            dirs: Arena::new(),
            files: Arena::new(),
            next_file_uid: 0,
            num_dir_lookups: 0,
            num_dir_cache_misses: 0,
            num_file_lookups: 0,
            num_file_cache_misses: 0,
        }
    }

    #[inline]
    pub fn file_system(&self) -> &F {
        &self.fs
    }

    /// Looks up, caches and verifies the directory at `path`.
    ///
    /// Returns `None` if nothing exists at `path` or if it is not a
    /// directory. Either answer is cached for the literal string `path`.
    pub fn get_directory(&mut self, path: &str) -> Option<DirectoryId> {
        self.num_dir_lookups += 1;
        let name = self.names.intern(path);
        match self.dir_cache[name] {
            PathState::Found(dir) => return Some(dir),
            PathState::Missing => return None,
            PathState::Unknown => {}
        }

        self.num_dir_cache_misses += 1;
        self.dir_cache[name] = PathState::Missing;
        let stat = self.probe(path, true)?;

        let dir = match self.unique_dirs.entry(stat.identity()) {
            Entry::Occupied(entry) => {
                let dir = *entry.get();
                tracing::debug!(path, canonical = %dir, "directory alias");
                dir
            }
            Entry::Vacant(entry) => {
                let dir = self.dirs.alloc(DirectoryEntry { name });
                tracing::debug!(path, id = %dir, "new directory");
                *entry.insert(dir)
            }
        };
        self.dir_cache[name] = PathState::Found(dir);
        Some(dir)
    }

    /// Looks up, caches and verifies the file at `path`.
    ///
    /// The parent directory is resolved first; if it does not exist the
    /// file itself is never probed. Returns `None` if nothing exists at
    /// `path`, if it is a directory, or if `path` ends in a separator.
    pub fn get_file(&mut self, path: &str) -> Option<FileId> {
        self.num_file_lookups += 1;
        let name = self.names.intern(path);
        match self.file_cache[name] {
            PathState::Found(file) => return Some(file),
            PathState::Missing => return None,
            PathState::Unknown => {}
        }

        self.num_file_cache_misses += 1;
        self.file_cache[name] = PathState::Missing;
        let dir = self.get_directory(parent_dir(path)?)?;
        let stat = self.probe(path, false)?;

        let file = match self.unique_files.entry(stat.identity()) {
            Entry::Occupied(entry) => {
                let file = *entry.get();
                tracing::debug!(path, canonical = %file, "file alias");
                file
            }
            Entry::Vacant(entry) => {
                let uid = self.next_file_uid;
                self.next_file_uid += 1;
                let file = self.files.alloc(FileEntry {
                    name,
                    dir,
                    uid,
                    size: stat.size,
                    mod_time: stat.mod_time,
                    device: stat.device,
                    inode: stat.inode,
                    mode: stat.mode,
                });
                tracing::debug!(path, id = %file, uid, "new file");
                *entry.insert(file)
            }
        };
        self.file_cache[name] = PathState::Found(file);
        Some(file)
    }

    /// Probes `path` and checks it is of the expected kind.
    fn probe(&self, path: &str, want_dir: bool) -> Option<FileStat> {
        match self.fs.stat(path) {
            Ok(stat) if stat.is_dir == want_dir => Some(stat),
            Ok(_) => {
                tracing::trace!(path, want_dir, "entry has the wrong kind");
                None
            }
            Err(err) => {
                tracing::trace!(path, %err, "probe failed");
                None
            }
        }
    }
}

impl<F> FileManager<F> {
    #[inline]
    pub fn directory(&self, dir: DirectoryId) -> &DirectoryEntry {
        &self.dirs[dir]
    }

    #[inline]
    pub fn file(&self, file: FileId) -> &FileEntry {
        &self.files[file]
    }

    /// Returns the path string behind a record's name.
    #[inline]
    pub fn resolve_name(&self, name: Symbol) -> &str {
        self.names.lookup(name)
    }

    /// Shorthand for the name of a directory record.
    #[inline]
    pub fn dir_name(&self, dir: DirectoryId) -> &str {
        self.resolve_name(self.dirs[dir].name)
    }

    /// Shorthand for the name of a file record.
    #[inline]
    pub fn file_name(&self, file: FileId) -> &str {
        self.resolve_name(self.files[file].name)
    }

    /// Iterates over the canonical files in discovery order.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &FileEntry)> {
        self.files.iter()
    }

    #[inline]
    pub fn num_unique_dirs(&self) -> usize {
        self.dirs.len()
    }

    #[inline]
    pub fn num_unique_files(&self) -> usize {
        self.files.len()
    }

    pub fn stats(&self) -> FileManagerStats {
        FileManagerStats {
            unique_dirs: self.dirs.len(),
            unique_files: self.files.len(),
            dir_lookups: self.num_dir_lookups,
            dir_cache_misses: self.num_dir_cache_misses,
            file_lookups: self.num_file_lookups,
            file_cache_misses: self.num_file_cache_misses,
        }
    }

    /// Writes the lookup counters to `writer`.
    pub fn print_stats(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let stats = self.stats();
        writeln!(writer, "\n*** File Manager Stats:")?;
        writeln!(
            writer,
            "{} files found, {} dirs found.",
            stats.unique_files, stats.unique_dirs
        )?;
        writeln!(
            writer,
            "{} dir lookups, {} dir cache misses.",
            stats.dir_lookups, stats.dir_cache_misses
        )?;
        writeln!(
            writer,
            "{} file lookups, {} file cache misses.",
            stats.file_lookups, stats.file_cache_misses
        )
    }
}

impl<F> Index<DirectoryId> for FileManager<F> {
    type Output = DirectoryEntry;

    fn index(&self, dir: DirectoryId) -> &DirectoryEntry {
        self.directory(dir)
    }
}

impl<F> Index<FileId> for FileManager<F> {
    type Output = FileEntry;

    fn index(&self, file: FileId) -> &FileEntry {
        self.file(file)
    }
}

/// The directory part of a file path.
///
/// A bare file name lives in `.`, a file directly under the root lives in
/// the root. A path ending in a separator names a directory, not a file.
/// Runs of separators before the file name are dropped, so `inc//a.h`
/// lives in `inc`.
fn parent_dir(path: &str) -> Option<&str> {
    match path.rfind(std::path::is_separator) {
        None => Some("."),
        Some(pos) if pos + 1 == path.len() => None,
        Some(pos) => match path[..pos].trim_end_matches(std::path::is_separator) {
            "" => Some(&path[..1]),
            dir => Some(dir),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{cell::Cell, collections::HashMap, io};

    #[derive(Default)]
    struct FakeFs {
        entries: HashMap<String, FileStat>,
        probes: Cell<usize>,
    }

    impl FakeFs {
        fn dir(mut self, path: &str, inode: u64) -> Self {
            let stat = FileStat {
                device: 1,
                inode,
                is_dir: true,
                mode: 0o040755,
                ..FileStat::default()
            };
            self.entries.insert(path.to_string(), stat);
            self
        }

        fn file(mut self, path: &str, inode: u64, size: u64) -> Self {
            let stat = FileStat {
                device: 1,
                inode,
                size,
                mod_time: 1_700_000_000,
                mode: 0o100644,
                is_dir: false,
            };
            self.entries.insert(path.to_string(), stat);
            self
        }

        fn probes(&self) -> usize {
            self.probes.get()
        }
    }

    impl FileSystem for FakeFs {
        fn stat(&self, path: &str) -> io::Result<FileStat> {
            self.probes.set(self.probes.get() + 1);
            self.entries
                .get(path)
                .copied()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    fn project() -> FakeFs {
        FakeFs::default()
            .dir(".", 1)
            .dir("/", 2)
            .dir("inc", 10)
            .dir("./inc", 10)
            .dir("src/../inc", 10)
            .dir("src", 11)
            .file("main.c", 100, 42)
            .file("/boot.c", 101, 7)
            .file("inc/a.h", 102, 12)
            .file("./inc/a.h", 102, 12)
            .file("src/../inc/a.h", 102, 12)
            .file("inc/b.h", 103, 3)
            .file("inc//b.h", 103, 3)
            .file("src/x.c", 104, 1)
    }

    #[test]
    fn directory_lookups_are_cached() {
        let mut fm = FileManager::with_file_system(project());
        let inc = fm.get_directory("inc");
        assert!(inc.is_some());
        assert_eq!(fm.file_system().probes(), 1);

        assert_eq!(fm.get_directory("inc"), inc);
        assert_eq!(fm.file_system().probes(), 1);
        assert_eq!(fm.dir_name(inc.unwrap()), "inc");
    }

    #[test]
    fn directory_aliases_share_one_record() {
        let mut fm = FileManager::with_file_system(project());
        let a = fm.get_directory("./inc").unwrap();
        let b = fm.get_directory("inc").unwrap();
        let c = fm.get_directory("src/../inc").unwrap();

        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(fm.num_unique_dirs(), 1);
        // First spelling wins.
        assert_eq!(fm.dir_name(b), "./inc");
    }

    #[test]
    fn file_aliases_share_one_record_and_uid() {
        let mut fm = FileManager::with_file_system(project());
        let a = fm.get_file("inc/a.h").unwrap();
        let b = fm.get_file("src/../inc/a.h").unwrap();
        let c = fm.get_file("./inc/a.h").unwrap();

        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(fm[a].uid(), fm[b].uid());
        assert_eq!(fm.num_unique_files(), 1);
        assert_eq!(fm.file_name(c), "inc/a.h");
        assert_eq!(fm.dir_name(fm[c].dir()), "inc");
    }

    #[test]
    fn uids_follow_discovery_order() {
        let mut fm = FileManager::with_file_system(project());
        let b = fm.get_file("inc/b.h").unwrap();
        let main = fm.get_file("main.c").unwrap();
        let a = fm.get_file("inc/a.h").unwrap();
        assert_eq!((fm[b].uid(), fm[main].uid(), fm[a].uid()), (0, 1, 2));

        let again = fm.get_file("./inc/a.h").unwrap();
        let x = fm.get_file("src/x.c").unwrap();
        assert_eq!(again, a);
        assert_eq!(fm[x].uid(), 3);
    }

    #[test]
    fn missing_files_are_cached_negatively() {
        let mut fm = FileManager::with_file_system(project());
        assert_eq!(fm.get_file("missing.c"), None);
        // One probe for ".", one for the file.
        assert_eq!(fm.file_system().probes(), 2);

        assert_eq!(fm.get_file("missing.c"), None);
        assert_eq!(fm.file_system().probes(), 2);
    }

    #[test]
    fn missing_parent_directory_skips_the_file_probe() {
        let fs = project().file("nowhere/a.h", 500, 1);
        let mut fm = FileManager::with_file_system(fs);
        assert_eq!(fm.get_file("nowhere/a.h"), None);
        assert_eq!(fm.file_system().probes(), 1);
        assert_eq!(fm.get_directory("nowhere"), None);
        assert_eq!(fm.file_system().probes(), 1);
    }

    #[test]
    fn kinds_are_checked() {
        let mut fm = FileManager::with_file_system(project());
        assert_eq!(fm.get_directory("main.c"), None);
        assert_eq!(fm.get_file("inc"), None);
        assert!(fm.get_file("main.c").is_some());
        assert!(fm.get_directory("inc").is_some());
    }

    #[test]
    fn trailing_separator_is_not_a_file() {
        let mut fm = FileManager::with_file_system(project());
        assert_eq!(fm.get_file("inc/"), None);
        assert_eq!(fm.file_system().probes(), 0);
    }

    #[test]
    fn parents_of_bare_and_rooted_names() {
        let mut fm = FileManager::with_file_system(project());
        let main = fm.get_file("main.c").unwrap();
        let boot = fm.get_file("/boot.c").unwrap();
        assert_eq!(fm.dir_name(fm[main].dir()), ".");
        assert_eq!(fm.dir_name(fm[boot].dir()), "/");
        assert_eq!(fm[main].size(), 42);
        assert_eq!(fm[main].mod_time(), 1_700_000_000);
        assert_eq!(fm[main].mode(), 0o100644);
    }

    #[test]
    fn parent_dir_splitting() {
        assert_eq!(parent_dir("a.c"), Some("."));
        assert_eq!(parent_dir("/a.c"), Some("/"));
        assert_eq!(parent_dir("x/y/a.c"), Some("x/y"));
        assert_eq!(parent_dir("x/"), None);
        assert_eq!(parent_dir(""), Some("."));
        assert_eq!(parent_dir("x/y//a.c"), Some("x/y"));
        assert_eq!(parent_dir("//a.c"), Some("/"));
    }

    #[test]
    fn doubled_separators_share_the_directory_cache() {
        let mut fm = FileManager::with_file_system(project());
        let a = fm.get_file("inc/a.h").unwrap();
        let probes = fm.file_system().probes();
        let b = fm.get_file("inc//b.h").unwrap();

        assert_eq!(fm[a].dir(), fm[b].dir());
        assert_eq!(fm.dir_name(fm[b].dir()), "inc");
        // Only b.h itself is probed; "inc" comes from the path cache.
        assert_eq!(fm.file_system().probes(), probes + 1);
        assert_eq!(fm.stats().dir_cache_misses, 1);
    }

    #[test]
    fn counters() {
        let mut fm = FileManager::with_file_system(project());
        fm.get_file("inc/a.h");
        fm.get_file("inc/a.h");
        fm.get_file("missing.c");
        fm.get_directory("inc");

        let stats = fm.stats();
        assert_eq!(stats.file_lookups, 3);
        assert_eq!(stats.file_cache_misses, 2);
        // "inc" twice (once via a.h, once directly) and "." once.
        assert_eq!(stats.dir_lookups, 3);
        assert_eq!(stats.dir_cache_misses, 2);
        assert_eq!(stats.unique_files, 1);
        assert_eq!(stats.unique_dirs, 2);
    }

    #[test]
    fn print_stats_does_not_touch_the_caches() {
        let mut fm = FileManager::with_file_system(project());
        fm.get_file("main.c");
        let before = fm.stats();
        let mut out = Vec::new();
        fm.print_stats(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("*** File Manager Stats:"));
        assert!(out.contains("1 files found, 1 dirs found."));
        assert!(out.contains("1 dir lookups, 1 dir cache misses."));
        assert!(out.contains("1 file lookups, 1 file cache misses."));
        assert_eq!(fm.stats(), before);
    }

    #[test]
    fn entries_order_by_device_and_inode() {
        let mut fm = FileManager::with_file_system(project());
        let b = fm.get_file("inc/b.h").unwrap();
        let a = fm.get_file("inc/a.h").unwrap();
        let main = fm.get_file("main.c").unwrap();

        let mut entries = vec![fm[b], fm[a], fm[main]];
        entries.sort();
        let inodes: Vec<_> = entries.iter().map(FileEntry::inode).collect();
        assert_eq!(inodes, vec![100, 102, 103]);

        // Discovery order, not identity order.
        let found: Vec<_> = fm.files().map(|(id, _)| id).collect();
        assert_eq!(found, vec![b, a, main]);
    }

    #[test]
    fn real_filesystem_aliases() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir(root.join("inc")).unwrap();
        std::fs::create_dir(root.join("src")).unwrap();
        std::fs::write(root.join("inc/a.h"), "int a;\n").unwrap();

        let direct = root.join("inc/a.h");
        let dotted = root.join("src/../inc/a.h");
        let mut fm = FileManager::new();
        let a = fm.get_file(direct.to_str().unwrap()).unwrap();
        let b = fm.get_file(dotted.to_str().unwrap()).unwrap();
        assert_eq!(a, b);
        assert_eq!(fm[a].size(), 7);
        assert_eq!(fm.file_name(b), direct.to_str().unwrap());

        let missing = root.join("inc/missing.h");
        assert_eq!(fm.get_file(missing.to_str().unwrap()), None);
    }

    #[cfg(unix)]
    #[test]
    fn real_filesystem_symlinks() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir(root.join("real")).unwrap();
        std::fs::write(root.join("real/a.h"), "").unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

        let mut fm = FileManager::new();
        let real = fm.get_directory(root.join("real").to_str().unwrap());
        let link = fm.get_directory(root.join("link").to_str().unwrap());
        assert!(real.is_some());
        assert_eq!(real, link);

        let a = fm.get_file(root.join("link/a.h").to_str().unwrap());
        let b = fm.get_file(root.join("real/a.h").to_str().unwrap());
        assert!(a.is_some());
        assert_eq!(a, b);
        assert_eq!(fm.num_unique_files(), 1);
    }
}

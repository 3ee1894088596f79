//! Identity resolution for the front end: which file is this path, and
//! which identifier is this spelling.

pub mod file;
pub mod fs;
pub mod ident;
pub mod lang;
pub mod token;

pub use file::{DirectoryEntry, DirectoryId, FileEntry, FileId, FileManager, FileManagerStats};
pub use fs::{FileStat, FileSystem, RealFileSystem};
pub use ident::{FeTokenInfo, IdentId, IdentifierInfo, IdentifierInfoLookup, IdentifierTable};
pub use lang::{LangError, LangOptions, LangStandard, VisibilityMode};
pub use token::{PPKeywordKind, TokenKind};

//! The identifier interning table.
//!
//! Every identifier the lexer sees goes through [`IdentifierTable::get`], so
//! the hit path is a single hash probe and never allocates. Each distinct
//! spelling gets exactly one [`IdentifierInfo`] record for the whole session;
//! the record keeps the keyword classification and the handful of flags the
//! preprocessor checks on every identifier token.

use crate::{
    lang::LangOptions,
    token::{KeywordFlags, PPKeywordKind, TokenKind, KEYWORDS, KEYWORD_ALIASES},
};

use lcc_arena::{entity_impl, Arena, SideTable};
use lcc_interner::{Interner, Symbol};

use std::{
    fmt,
    io::Write,
    ops::{Index, IndexMut},
};

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Handle to a canonical [`IdentifierInfo`].
///
/// Byte-identical spellings always produce equal handles within a table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentId(u32);
entity_impl!(IdentId, "ident");

/// Opaque data a later phase hangs off an identifier.
///
/// The identifier table stores it and hands it back, nothing more. A phase
/// would typically use it as a handle into an arena of its own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeTokenInfo(u32);
entity_impl!(FeTokenInfo, "fe");

// ---------------------------------------------------------------------------
// IdentifierInfo
// ---------------------------------------------------------------------------

const TOKEN_ID_BITS: u32 = 8;
const TOKEN_ID_MASK: u32 = (1 << TOKEN_ID_BITS) - 1;
const BUILTIN_ID_SHIFT: u32 = TOKEN_ID_BITS;
const BUILTIN_ID_BITS: u32 = 10;
const BUILTIN_ID_MASK: u32 = ((1 << BUILTIN_ID_BITS) - 1) << BUILTIN_ID_SHIFT;
const HAS_MACRO: u32 = 1 << 18;
const IS_EXTENSION: u32 = 1 << 19;
const IS_POISONED: u32 = 1 << 20;
const NEEDS_HANDLE_IDENTIFIER: u32 = 1 << 21;

/// Everything the front end knows about one identifier spelling.
///
/// The spelling itself lives in the owning table; the record only keeps the
/// [`Symbol`] of its hash-table slot.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IdentifierInfo {
    /// token id : 8 | builtin id : 10 | has macro | extension | poisoned |
    /// needs handle identifier
    bits: u32,
    fe_token_info: Option<FeTokenInfo>,
    entry: Symbol,
}

impl IdentifierInfo {
    fn new(entry: Symbol) -> Self {
        Self {
            bits: TokenKind::Identifier.as_u8() as u32,
            fe_token_info: None,
            entry,
        }
    }

    /// The slot holding this identifier's spelling.
    #[inline]
    pub fn entry(&self) -> Symbol {
        self.entry
    }

    /// The token kind the lexer should produce for this identifier.
    ///
    /// `TokenKind::Identifier` unless a keyword was registered.
    #[inline]
    pub fn token_id(&self) -> TokenKind {
        TokenKind::from_u8((self.bits & TOKEN_ID_MASK) as u8).unwrap_or(TokenKind::Identifier)
    }

    #[inline]
    pub fn set_token_id(&mut self, kind: TokenKind) {
        self.bits = (self.bits & !TOKEN_ID_MASK) | kind.as_u8() as u32;
    }

    /// 0 is not a builtin, 1 is a builtin for some non-primary target, and
    /// 2 and up name specific builtin functions.
    #[inline]
    pub fn builtin_id(&self) -> u32 {
        (self.bits & BUILTIN_ID_MASK) >> BUILTIN_ID_SHIFT
    }

    #[inline]
    pub fn set_builtin_id(&mut self, id: u32) {
        debug_assert!(id < (1 << BUILTIN_ID_BITS), "builtin id {id} out of range");
        self.bits = (self.bits & !BUILTIN_ID_MASK) | ((id << BUILTIN_ID_SHIFT) & BUILTIN_ID_MASK);
    }

    /// True if there is a `#define` for this identifier.
    #[inline]
    pub fn has_macro_definition(&self) -> bool {
        self.flag(HAS_MACRO)
    }

    #[inline]
    pub fn set_has_macro_definition(&mut self, value: bool) {
        self.set_flag(HAS_MACRO, value);
    }

    /// True if this keyword is only available as a language extension.
    #[inline]
    pub fn is_extension_token(&self) -> bool {
        self.flag(IS_EXTENSION)
    }

    #[inline]
    pub fn set_is_extension_token(&mut self, value: bool) {
        self.set_flag(IS_EXTENSION, value);
    }

    /// True if the identifier was poisoned with `#pragma GCC poison`.
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.flag(IS_POISONED)
    }

    #[inline]
    pub fn set_is_poisoned(&mut self, value: bool) {
        self.set_flag(IS_POISONED, value);
    }

    /// True if the preprocessor must look at every token of this
    /// identifier. Derived: poisoned, or a macro, or an extension.
    #[inline]
    pub fn is_handle_identifier_case(&self) -> bool {
        self.flag(NEEDS_HANDLE_IDENTIFIER)
    }

    #[inline]
    pub fn fe_token_info(&self) -> Option<FeTokenInfo> {
        self.fe_token_info
    }

    #[inline]
    pub fn set_fe_token_info(&mut self, info: Option<FeTokenInfo>) {
        self.fe_token_info = info;
    }

    #[inline]
    fn flag(&self, mask: u32) -> bool {
        self.bits & mask != 0
    }

    fn set_flag(&mut self, mask: u32, value: bool) {
        if self.flag(mask) == value {
            return;
        }
        if value {
            self.bits |= mask;
        } else {
            self.bits &= !mask;
        }
        self.recompute_needs_handle_identifier();
    }

    fn recompute_needs_handle_identifier(&mut self) {
        if self.is_poisoned() || self.has_macro_definition() || self.is_extension_token() {
            self.bits |= NEEDS_HANDLE_IDENTIFIER;
        } else {
            self.bits &= !NEEDS_HANDLE_IDENTIFIER;
        }
    }
}

impl fmt::Debug for IdentifierInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierInfo")
            .field("entry", &self.entry)
            .field("token_id", &self.token_id())
            .field("builtin_id", &self.builtin_id())
            .field("has_macro", &self.has_macro_definition())
            .field("is_extension", &self.is_extension_token())
            .field("is_poisoned", &self.is_poisoned())
            .field("needs_handle_identifier", &self.is_handle_identifier_case())
            .field("fe_token_info", &self.fe_token_info)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// IdentifierInfoLookup
// ---------------------------------------------------------------------------

/// An external source of identifier records, such as a precompiled header.
///
/// Sources are consulted in order when a spelling misses the table. A source
/// that knows the spelling typically registers it with
/// [`IdentifierTable::create_identifier_info`], fills in what it knows, and
/// returns the new handle. While sources are being consulted they are
/// detached from the table, so calling [`IdentifierTable::get`] from inside
/// a source never reaches the chain again.
pub trait IdentifierInfoLookup {
    fn get(&mut self, table: &mut IdentifierTable, spelling: &str) -> Option<IdentId>;
}

// ---------------------------------------------------------------------------
// IdentifierTable
// ---------------------------------------------------------------------------

/// Maps identifier spellings to their canonical [`IdentifierInfo`].
#[derive(Default)]
pub struct IdentifierTable {
    /// Spelling storage; the hash-table half of the table.
    spellings: Interner,
    /// The value half: which record a spelling is bound to.
    slots: SideTable<Symbol, Option<IdentId>>,
    infos: Arena<IdentId, IdentifierInfo>,
    external: Vec<Box<dyn IdentifierInfoLookup>>,
}

impl IdentifierTable {
    /// Creates a table with the keywords of `opts` registered.
    pub fn new(opts: &LangOptions) -> Self {
        let mut table = Self::default();
        table.add_keywords(opts);
        table
    }

    /// Like [`IdentifierTable::new`], with `lookup` consulted from the
    /// start, including for keyword registration.
    pub fn with_external_lookup(opts: &LangOptions, lookup: Box<dyn IdentifierInfoLookup>) -> Self {
        let mut table = Self::default();
        table.set_external_lookup(lookup);
        table.add_keywords(opts);
        table
    }

    /// Replaces the whole lookup chain with `lookup`.
    pub fn set_external_lookup(&mut self, lookup: Box<dyn IdentifierInfoLookup>) {
        self.external.clear();
        self.external.push(lookup);
    }

    /// Appends `lookup` to the end of the chain.
    pub fn push_external_lookup(&mut self, lookup: Box<dyn IdentifierInfoLookup>) {
        self.external.push(lookup);
    }

    pub fn clear_external_lookup(&mut self) {
        self.external.clear();
    }

    /// Returns the record for `spelling`, creating it on first sight.
    ///
    /// A miss consults the external chain first; a record it returns is
    /// bound to `spelling` so the chain is never asked about it again.
    pub fn get(&mut self, spelling: &str) -> IdentId {
        let entry = self.spellings.intern(spelling);
        if let Some(id) = self.slots[entry] {
            return id;
        }

        if !self.external.is_empty() {
            let mut chain = std::mem::take(&mut self.external);
            let found = chain.iter_mut().find_map(|source| source.get(self, spelling));
            // Keep anything a source appended while the chain was detached.
            chain.append(&mut self.external);
            self.external = chain;
            if let Some(id) = found {
                tracing::trace!(spelling, %id, "identifier from external source");
                self.slots[entry] = Some(id);
                return id;
            }
            // A source may have registered the spelling and still missed.
            if let Some(id) = self.slots[entry] {
                return id;
            }
        }

        self.alloc(entry)
    }

    /// Creates the record for a spelling the table has never seen.
    ///
    /// Meant for external sources registering identifiers ahead of the
    /// table. The chain is not consulted. Calling this for a spelling that
    /// already has a record is an integration bug: it panics in debug
    /// builds and rebinds the spelling otherwise.
    pub fn create_identifier_info(&mut self, spelling: &str) -> IdentId {
        let entry = self.spellings.intern(spelling);
        debug_assert!(
            self.slots[entry].is_none(),
            "IdentifierInfo for `{spelling}` already exists"
        );
        self.alloc(entry)
    }

    fn alloc(&mut self, entry: Symbol) -> IdentId {
        let id = self.infos.alloc(IdentifierInfo::new(entry));
        self.slots[entry] = Some(id);
        tracing::trace!(spelling = self.spellings.lookup(entry), %id, "new identifier");
        id
    }

    /// Returns the record already bound to `spelling`, without creating one
    /// and without consulting the chain.
    pub fn find(&self, spelling: &str) -> Option<IdentId> {
        self.spellings.find(spelling).and_then(|entry| self.slots[entry])
    }

    #[inline]
    pub fn info(&self, id: IdentId) -> &IdentifierInfo {
        &self.infos[id]
    }

    #[inline]
    pub fn info_mut(&mut self, id: IdentId) -> &mut IdentifierInfo {
        &mut self.infos[id]
    }

    /// The spelling of `id`.
    #[inline]
    pub fn name(&self, id: IdentId) -> &str {
        self.spellings.lookup(self.infos[id].entry)
    }

    /// Length of the spelling of `id`, in bytes.
    #[inline]
    pub fn length(&self, id: IdentId) -> usize {
        self.name(id).len()
    }

    /// True if `id` is the identifier spelled `s`.
    #[inline]
    pub fn is_str(&self, id: IdentId, s: &str) -> bool {
        self.name(id) == s
    }

    /// The preprocessor directive `id` names, if any.
    pub fn pp_keyword_id(&self, id: IdentId) -> PPKeywordKind {
        PPKeywordKind::from_spelling(self.name(id))
    }

    /// Number of identifier records.
    #[inline]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Iterates over the records in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (IdentId, &IdentifierInfo)> {
        self.infos.iter()
    }

    /// Iterates over every spelling bound to a record, in first-seen order.
    pub fn spellings(&self) -> impl Iterator<Item = (&str, IdentId)> {
        self.spellings
            .iter()
            .filter_map(|(entry, s)| self.slots[entry].map(|id| (s, id)))
    }

    /// Registers the keywords enabled by `opts`.
    ///
    /// Keywords the options leave disabled are not touched and stay plain
    /// identifiers. Calling this twice with the same options is a no-op the
    /// second time.
    pub fn add_keywords(&mut self, opts: &LangOptions) {
        let mut added = 0usize;
        for kw in KEYWORDS.iter().chain(KEYWORD_ALIASES) {
            let Some(extension) = keyword_status(kw.flags, opts) else {
                continue;
            };
            let id = self.get(kw.spelling);
            let info = &mut self.infos[id];
            info.set_token_id(kw.kind);
            info.set_is_extension_token(extension);
            added += 1;
        }
        tracing::debug!(added, "registered keywords");
    }

    /// Writes table statistics to `writer`.
    pub fn print_stats(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let (count, total_len, max_len) = self
            .spellings()
            .fold((0usize, 0usize, 0usize), |(n, total, max), (s, _)| {
                (n + 1, total + s.len(), max.max(s.len()))
            });
        let average = if count > 0 {
            total_len as f64 / count as f64
        } else {
            0.0
        };
        writeln!(writer, "\n*** Identifier Table Stats:")?;
        writeln!(writer, "# Identifiers:   {}", self.infos.len())?;
        writeln!(writer, "# Spellings:     {}", count)?;
        writeln!(writer, "Ave identifier length: {:.2}", average)?;
        writeln!(writer, "Max identifier length: {}", max_len)?;
        writeln!(
            writer,
            "Spelling storage: {} bytes",
            self.spellings.allocated_bytes()
        )
    }
}

/// Whether a keyword is active under `opts`, and if so whether only as an
/// extension.
fn keyword_status(flags: KeywordFlags, opts: &LangOptions) -> Option<bool> {
    if flags.contains(KeywordFlags::ALL) {
        Some(false)
    } else if opts.c99 && flags.contains(KeywordFlags::C99) {
        Some(false)
    } else if opts.gnu_mode && flags.contains(KeywordFlags::GNU) {
        Some(true)
    } else if opts.microsoft && flags.contains(KeywordFlags::MS) {
        Some(true)
    } else if opts.bool_ && flags.contains(KeywordFlags::BOOL) {
        Some(false)
    } else {
        None
    }
}

impl Index<IdentId> for IdentifierTable {
    type Output = IdentifierInfo;

    fn index(&self, id: IdentId) -> &IdentifierInfo {
        self.info(id)
    }
}

impl IndexMut<IdentId> for IdentifierTable {
    fn index_mut(&mut self, id: IdentId) -> &mut IdentifierInfo {
        self.info_mut(id)
    }
}

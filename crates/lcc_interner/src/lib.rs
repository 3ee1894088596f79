//! Spelling storage for the front end.
//!
//! Every distinct string the front end keeps around for the whole session
//! (identifier spellings, the literal path strings handed to the file
//! manager) is copied exactly once into an [`Interner`] and referred to by a
//! [`Symbol`] from then on. Records that need their spelling keep the symbol,
//! never a second copy of the bytes.
//!
//! # Implementation Details
//!
//! Strings are appended to a bump buffer that grows geometrically. A full
//! buffer is retired rather than reallocated, so every slice handed out
//! stays valid for the lifetime of the interner.

use lcc_arena::EntityRef;

use std::{collections::HashMap, num::NonZeroU32};

/// A lightweight handle naming an interned string.
///
/// Symbols are dense: the `n`-th distinct string interned gets index `n - 1`,
/// which lets a [`SideTable`](lcc_arena::SideTable) attach a slot to every
/// spelling. `Option<Symbol>` is the same size as `Symbol`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Symbol(NonZeroU32);

impl EntityRef for Symbol {
    #[inline]
    fn new(index: usize) -> Self {
        let id = u32::try_from(index + 1).unwrap_or(u32::MAX);
        Symbol(NonZeroU32::new(id).unwrap_or(NonZeroU32::MAX))
    }

    #[inline]
    fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

/// Stores each distinct string once and hands out [`Symbol`]s for them.
pub struct Interner {
    /// Buffer currently receiving new strings.
    buf: String,
    /// Retired buffers, kept alive so earlier slices stay valid.
    full: Vec<String>,
    /// Spelling of each symbol, indexed by `Symbol::index`.
    vec: Vec<&'static str>,
    /// Spelling to symbol.
    map: HashMap<&'static str, Symbol>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::with_capacity(1024)
    }
}

impl Interner {
    /// Creates a new `Interner` with a 1024 byte initial buffer.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Creates a new `Interner` whose first buffer holds `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Interner {
            vec: Vec::new(),
            full: Vec::new(),
            map: HashMap::new(),
            buf: String::with_capacity(capacity),
        }
    }

    /// Returns the number of distinct strings interned.
    #[inline]
    pub fn len(&self) -> usize {
        self.vec.len()
    }

    /// Checks if nothing has been interned yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// Total bytes of string data stored, across all buffers.
    pub fn allocated_bytes(&self) -> usize {
        self.full.iter().map(String::len).sum::<usize>() + self.buf.len()
    }

    /// Retrieves the string behind `sym`.
    ///
    /// # Panics
    ///
    /// Panics if `sym` was not produced by this interner.
    #[inline]
    pub fn lookup(&self, sym: Symbol) -> &str {
        self.vec[sym.index()]
    }

    /// Retrieves the string behind `sym`, if `sym` belongs to this interner.
    #[inline]
    pub fn get(&self, sym: Symbol) -> Option<&str> {
        self.vec.get(sym.index()).copied()
    }

    /// Returns the symbol of `name` if it has already been interned.
    ///
    /// Never allocates.
    #[inline]
    pub fn find(&self, name: &str) -> Option<Symbol> {
        self.map.get(name).copied()
    }

    /// Iterates over all `(symbol, string)` pairs in interning order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &str)> {
        self.vec
            .iter()
            .enumerate()
            .map(|(i, s)| (Symbol::new(i), *s))
    }

    /// Interns `name` and returns its symbol.
    ///
    /// Strings are compared byte for byte: no case folding and no
    /// normalization. If `name` is already present its symbol is returned
    /// without allocating.
    #[inline]
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(&sym) = self.map.get(name) {
            return sym;
        }
        let sym = Symbol::new(self.vec.len());
        // Safety: The slice lives in a buffer that is never reallocated and
        // is only dropped together with `self`.
        let name = unsafe { self.alloc(name) };
        self.map.insert(name, sym);
        self.vec.push(name);
        sym
    }

    /// Copies `name` into the bump buffer and returns a slice of the copy.
    ///
    /// # Safety
    ///
    /// The returned reference must not outlive `self`.
    #[inline]
    unsafe fn alloc(&mut self, name: &str) -> &'static str {
        let cap = self.buf.capacity();
        if cap < self.buf.len() + name.len() {
            let cap = (cap.max(name.len()) + 1).next_power_of_two();
            let full = std::mem::replace(&mut self.buf, String::with_capacity(cap));
            self.full.push(full);
        }
        let start = self.buf.len();
        self.buf.push_str(name);
        &*std::ptr::from_ref::<str>(&self.buf[start..])
    }
}

//! The symbol table.
//!
//! Variables come into existence on first mention, typed by their name's
//! sigil. The table is insertion-ordered so later phases can declare
//! locals deterministically and destroy them in reverse. Canonical name
//! equality is case-insensitive on the name and exact on the sigil, which
//! folding handles in one step since sigils have no case.

use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use zeebc_sem::Type;
use zeebc_util::{Diagnostic, Lexeme, Range, Result};

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Identifies a [`Symbol`] in its table. Passed around instead of
/// references so AST nodes stay free of borrows into the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Position of the symbol in insertion order.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A variable. The type is fixed at creation from the name's sigil and
/// never changes; the name keeps the spelling of the first mention.
#[derive(Clone, Copy, Debug)]
pub struct Symbol<'a> {
    /// First-mention spelling, including the sigil.
    pub name: Lexeme<'a>,
    /// Range of the first mention.
    pub declared_range: Range,
    /// Declared type, inferred from the sigil.
    pub ty: Type,
}

/// Insertion-ordered mapping from canonical names to symbols.
#[derive(Debug, Default)]
pub struct SymbolTable<'a> {
    symbols: FxIndexMap<String, Symbol<'a>>,
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `name`, creating the symbol on first mention.
    ///
    /// A given name resolves to exactly one symbol; asking for an existing
    /// name with a different type is rejected. The sigil rule makes that
    /// impossible from source text, so hitting it means a caller bug.
    pub fn find_or_create(
        &mut self,
        name: Lexeme<'a>,
        range: Range,
        ty: Type,
    ) -> Result<SymbolId> {
        let key = name.folded();

        if let Some((index, _, existing)) = self.symbols.get_full(&key) {
            if existing.ty != ty {
                return Err(Diagnostic::new(range, "Conflicting type for variable"));
            }
            return Ok(SymbolId(index as u32));
        }

        let (index, _) = self.symbols.insert_full(
            key,
            Symbol {
                name,
                declared_range: range,
                ty,
            },
        );
        Ok(SymbolId(index as u32))
    }

    /// Fetch a symbol by id.
    pub fn get(&self, id: SymbolId) -> &Symbol<'a> {
        &self.symbols[id.index()]
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in insertion order. The iterator is double-ended so callers
    /// can also walk the reverse (destruction) order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (SymbolId, &Symbol<'a>)> + '_ {
        self.symbols
            .values()
            .enumerate()
            .map(|(index, symbol)| (SymbolId(index as u32), symbol))
    }
}

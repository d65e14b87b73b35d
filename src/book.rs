// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Catalog entries and shelf arithmetic.
//!
//! A book tracks how many copies the library owns and how many are on the
//! shelf. Copies move between shelf and loan one at a time:
//!
//! ```text
//!  on shelf ──lend──► on loan ──shelve──► on shelf
//! ```
//!
//! # Example
//!
//! ```
//! use library_ledger::{BookId, Ledger};
//!
//! let mut ledger = Ledger::new();
//! ledger.add_book(10u64, "Clean Code", "Martin", 2).unwrap();
//!
//! let book = ledger.book(&BookId::Number(10)).unwrap();
//! assert_eq!(book.total(), 2);
//! assert_eq!(book.available(), 2);
//! ```

use crate::LedgerError;
use crate::base::BookId;
use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    total: u32,
    available: u32,
    active: bool,
}

impl Book {
    pub(crate) fn new(
        id: BookId,
        title: &str,
        author: &str,
        copies: u32,
    ) -> Result<Self, LedgerError> {
        if copies < 1 {
            return Err(LedgerError::InvalidCopies);
        }
        Ok(Self {
            id,
            title: title.to_string(),
            author: author.to_string(),
            total: copies,
            available: copies,
            active: true,
        })
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.available <= self.total,
            "Invariant violated: available {} exceeds total {} for book {}",
            self.available,
            self.total,
            self.id
        );
    }

    pub fn id(&self) -> &BookId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Copies owned by the library.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Copies currently on the shelf.
    pub fn available(&self) -> u32 {
        self.available
    }

    /// Copies currently on loan.
    pub fn on_loan(&self) -> u32 {
        self.total - self.available
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Case-insensitive substring match on title or author.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.author.to_lowercase().contains(needle)
    }

    /// Adds copies to both total and shelf, and puts the book back in circulation.
    pub(crate) fn restock(&mut self, copies: u32) -> Result<(), LedgerError> {
        if copies < 1 {
            return Err(LedgerError::InvalidCopies);
        }
        self.total += copies;
        self.available += copies;
        self.active = true;
        self.assert_invariants();
        Ok(())
    }

    /// Takes one copy off the shelf.
    pub(crate) fn lend(&mut self) -> Result<(), LedgerError> {
        if self.available == 0 {
            return Err(LedgerError::NoCopiesAvailable(self.id.clone()));
        }
        self.available -= 1;
        self.assert_invariants();
        Ok(())
    }

    /// Puts one copy back on the shelf.
    pub(crate) fn shelve(&mut self) {
        if self.available < self.total {
            self.available += 1;
        }
        self.assert_invariants();
    }

    /// Takes the book out of circulation. Only allowed with every copy on the shelf.
    pub(crate) fn withdraw(&mut self) -> Result<(), LedgerError> {
        if self.available != self.total {
            return Err(LedgerError::OutstandingLoans(self.id.clone()));
        }
        self.active = false;
        Ok(())
    }
}

impl Serialize for Book {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Book", 6)?;
        state.serialize_field("book", &self.id)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("author", &self.author)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("available", &self.available)?;
        state.serialize_field("active", &self.active)?;
        state.end()
    }
}

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

//! Boolean calling convention over the ledger.
//!
//! Every operation that fails in the strict API returns `false` (or `None`)
//! here. Callers that need the reason use the [`Ledger`] methods directly.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use library_ledger::{BookId, Ledger, UserId};
//!
//! let mut ledger = Ledger::new();
//! let mut desk = ledger.permissive();
//! let today = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
//!
//! desk.register_user(Some(UserId(1)), "Alice");
//! assert!(desk.register_book("978-0132350884", "Clean Code", "Martin", 1));
//! assert!(desk.loan_book(UserId(1), &BookId::from("978-0132350884"), today));
//! assert!(!desk.loan_book(UserId(1), &BookId::from("978-0132350884"), today));
//! ```

use crate::base::{BookId, UserId};
use crate::ledger::{Ledger, SearchHit};
use crate::LedgerError;
use chrono::NaiveDate;
use tracing::debug;

/// Borrowed view of a [`Ledger`] that reports failures as `false`.
pub struct Permissive<'a> {
    ledger: &'a mut Ledger,
}

fn accepted<T>(operation: &str, result: Result<T, LedgerError>) -> Option<T> {
    result
        .map_err(|e| debug!(operation, error = %e, "rejected"))
        .ok()
}

impl Ledger {
    pub fn permissive(&mut self) -> Permissive<'_> {
        Permissive { ledger: self }
    }
}

impl Permissive<'_> {
    pub fn register_user(&mut self, id: Option<UserId>, name: &str) -> Option<UserId> {
        accepted("register_user", self.ledger.register_user(id, name))
    }

    pub fn deactivate_user(&mut self, id: UserId) -> bool {
        accepted("deactivate_user", self.ledger.deactivate_user(id)).is_some()
    }

    pub fn add_book(
        &mut self,
        id: impl Into<BookId>,
        title: &str,
        author: &str,
        copies: u32,
    ) -> bool {
        accepted("add_book", self.ledger.add_book(id, title, author, copies)).is_some()
    }

    /// Same as [`Permissive::add_book`], under the catalog-registration name.
    pub fn register_book(
        &mut self,
        isbn: impl Into<BookId>,
        title: &str,
        author: &str,
        copies: u32,
    ) -> bool {
        self.add_book(isbn, title, author, copies)
    }

    pub fn remove_book(&mut self, id: &BookId) -> bool {
        accepted("remove_book", self.ledger.remove_book(id)).is_some()
    }

    pub fn loan_book(&mut self, user_id: UserId, book_id: &BookId, on_date: NaiveDate) -> bool {
        accepted("loan_book", self.ledger.checkout(user_id, book_id, on_date)).is_some()
    }

    pub fn return_book(&mut self, user_id: UserId, book_id: &BookId, on_date: NaiveDate) -> bool {
        self.ledger.return_book(user_id, book_id, on_date)
    }

    pub fn search_books(&self, query: &str) -> Vec<SearchHit> {
        self.ledger.search(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_collapse_to_false() {
        let mut ledger = Ledger::new();
        let mut desk = ledger.permissive();
        assert_eq!(desk.register_user(None, ""), None);
        assert!(!desk.deactivate_user(UserId(3)));
        assert!(!desk.add_book(1u64, "T", "A", 0));
        assert!(!desk.remove_book(&BookId::Number(1)));
    }

    #[test]
    fn successes_are_applied_to_the_ledger() {
        let mut ledger = Ledger::new();
        {
            let mut desk = ledger.permissive();
            assert_eq!(desk.register_user(None, "Alice"), Some(UserId(1)));
            assert!(desk.register_book("isbn-1", "Title", "Author", 2));
        }
        assert!(ledger.user(UserId(1)).is_some());
        assert_eq!(ledger.book(&BookId::from("isbn-1")).unwrap().total(), 2);
    }
}

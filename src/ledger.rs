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

//! Circulation ledger.
//!
//! The [`Ledger`] is the central component that owns users, the book catalog
//! and the loan register. It moves copies between "on shelf" and "on loan"
//! and answers circulation queries.
//!
//! # Operations
//!
//! - **Users**: register (auto or explicit id) and deactivate.
//! - **Books**: add or restock, and remove from circulation.
//! - **Checkout**: lend one copy, due after the policy's loan period.
//! - **Return**: close the most recent open loan for a (user, book) pair.
//! - **Queries**: active loans, overdue loans, catalog search, late fees.
//!
//! # Thread Safety
//!
//! Mutators take `&mut self`. Callers sharing a ledger across threads wrap it
//! in a [`SharedLedger`], which serializes every operation behind one lock.

use crate::base::{BookId, UserId};
use crate::book::Book;
use crate::loan::{Loan, LoanRegister};
use crate::policy::Policy;
use crate::user::User;
use crate::LedgerError;
use chrono::{Days, NaiveDate};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// A ledger guarded by a single mutex.
pub type SharedLedger = Arc<Mutex<Ledger>>;

/// A book a user currently holds, with the number of copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveLoan {
    pub book_id: BookId,
    pub copies: usize,
}

/// A (user, book) pair with at least one overdue copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueLoan {
    pub user_id: UserId,
    pub book_id: BookId,
}

/// Catalog search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    #[serde(rename = "isbn")]
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub copies: u32,
    pub available: u32,
}

/// Snapshot of a user's standing. Unknown users report as inactive with no loans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatronStatus {
    pub active: bool,
    pub active_loans: Vec<ActiveLoan>,
    pub total_active_loan_count: usize,
}

/// In-memory circulation ledger.
///
/// # Invariants
///
/// - For every book, `0 <= available <= total`.
/// - For every book, `available + open loans for the book == total`.
/// - No user holds more than `policy.max_active_loans` open loans.
/// - Auto-assigned user ids only grow and are never reused.
#[derive(Debug)]
pub struct Ledger {
    policy: Policy,
    users: BTreeMap<UserId, User>,
    /// Catalog in insertion order.
    books: Vec<Book>,
    book_index: HashMap<BookId, usize>,
    loans: LoanRegister,
    /// `None` once every positive id has been handed out.
    next_user_id: Option<u32>,
}

impl Ledger {
    /// Creates an empty ledger with the default policy.
    pub fn new() -> Self {
        Self::with_policy(Policy::default())
    }

    pub fn with_policy(policy: Policy) -> Self {
        Ledger {
            policy,
            users: BTreeMap::new(),
            books: Vec::new(),
            book_index: HashMap::new(),
            loans: LoanRegister::new(),
            next_user_id: Some(1),
        }
    }

    /// Wraps the ledger for use from several threads.
    pub fn into_shared(self) -> SharedLedger {
        Arc::new(Mutex::new(self))
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    // === Users ===

    /// Registers a user and returns its id.
    ///
    /// With `None`, the next unused positive id is assigned. An explicit id
    /// that already exists is overwritten with a fresh, active record; any
    /// open loans stay attached to the id.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidUserId`] - Explicit id is zero.
    /// - [`LedgerError::EmptyName`] - Name is empty or blank.
    /// - [`LedgerError::UserIdsExhausted`] - No id given and none left to assign.
    pub fn register_user(&mut self, id: Option<UserId>, name: &str) -> Result<UserId, LedgerError> {
        let id = match id {
            Some(UserId(0)) => return Err(LedgerError::InvalidUserId),
            Some(id) => id,
            None => UserId(self.next_user_id.ok_or(LedgerError::UserIdsExhausted)?),
        };
        let user = User::new(id, name)?;

        self.next_user_id = match (self.next_user_id, id.0.checked_add(1)) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };
        if self.users.insert(id, user).is_some() {
            info!(user = %id, "user re-registered");
        } else {
            info!(user = %id, "user registered");
        }
        Ok(id)
    }

    /// # Errors
    ///
    /// [`LedgerError::UserNotFound`] if the id is unknown.
    pub fn deactivate_user(&mut self, id: UserId) -> Result<(), LedgerError> {
        let user = self
            .users
            .get_mut(&id)
            .ok_or(LedgerError::UserNotFound(id))?;
        user.deactivate();
        info!(user = %id, "user deactivated");
        Ok(())
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// All users ordered by id.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    // === Books ===

    /// Adds a book to the catalog, or restocks and reactivates an existing one.
    ///
    /// Restocking keeps the original title and author.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidCopies`] if `copies` is zero.
    pub fn add_book(
        &mut self,
        id: impl Into<BookId>,
        title: &str,
        author: &str,
        copies: u32,
    ) -> Result<(), LedgerError> {
        let id = id.into();
        match self.book_index.get(&id) {
            Some(&index) => {
                self.books[index].restock(copies)?;
                info!(book = %id, copies, "book restocked");
            }
            None => {
                let book = Book::new(id.clone(), title, author, copies)?;
                self.book_index.insert(id.clone(), self.books.len());
                self.books.push(book);
                info!(book = %id, copies, "book added");
            }
        }
        Ok(())
    }

    /// Takes a book out of circulation. The record stays queryable.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::BookNotFound`] - Unknown id.
    /// - [`LedgerError::OutstandingLoans`] - Some copies are still on loan.
    pub fn remove_book(&mut self, id: &BookId) -> Result<(), LedgerError> {
        let book = self.book_mut(id)?;
        book.withdraw()?;
        info!(book = %id, "book removed from circulation");
        Ok(())
    }

    pub fn book(&self, id: &BookId) -> Option<&Book> {
        self.book_index.get(id).map(|&index| &self.books[index])
    }

    /// All books, including inactive ones, in catalog order.
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.iter()
    }

    fn book_mut(&mut self, id: &BookId) -> Result<&mut Book, LedgerError> {
        let index = *self
            .book_index
            .get(id)
            .ok_or_else(|| LedgerError::BookNotFound(id.clone()))?;
        Ok(&mut self.books[index])
    }

    // === Circulation ===

    /// Lends one copy of a book to a user.
    ///
    /// Preconditions are checked in order, and the first one that fails is
    /// reported:
    ///
    /// | Check | Error |
    /// |-------|-------|
    /// | User exists | [`LedgerError::UserNotFound`] |
    /// | User is active | [`LedgerError::UserInactive`] |
    /// | Book exists | [`LedgerError::BookNotFound`] |
    /// | Book is active | [`LedgerError::BookInactive`] |
    /// | A copy is on the shelf | [`LedgerError::NoCopiesAvailable`] |
    /// | User is under the loan cap | [`LedgerError::LoanLimitReached`] |
    ///
    /// On success, returns the new loan with its due date.
    pub fn checkout(
        &mut self,
        user_id: UserId,
        book_id: &BookId,
        on_date: NaiveDate,
    ) -> Result<Loan, LedgerError> {
        let user = self
            .users
            .get(&user_id)
            .ok_or(LedgerError::UserNotFound(user_id))?;
        if !user.is_active() {
            return Err(LedgerError::UserInactive(user_id));
        }

        let max_active_loans = self.policy.max_active_loans;
        let active_loans = self.loans.active_count(user_id);
        let due_date = on_date
            .checked_add_days(Days::new(u64::from(self.policy.loan_days)))
            .ok_or(LedgerError::DateOutOfRange);
        let loan_id = self.loans.next_id();

        let book = self.book_mut(book_id)?;
        if !book.is_active() {
            return Err(LedgerError::BookInactive(book_id.clone()));
        }
        if book.available() == 0 {
            return Err(LedgerError::NoCopiesAvailable(book_id.clone()));
        }
        if active_loans >= max_active_loans {
            return Err(LedgerError::LoanLimitReached(user_id, max_active_loans));
        }
        let due_date = due_date?;
        let loan_id = loan_id?;
        book.lend()?;

        let loan = self.loans.open(loan_id, user_id, book_id.clone(), on_date, due_date);
        info!(
            loan = %loan.id,
            user = %user_id,
            book = %book_id,
            due = %loan.due_date,
            "book checked out"
        );
        Ok(loan)
    }

    /// Returns one copy of a book.
    ///
    /// Closes the most recently opened loan for the pair. Returns `false`
    /// when the user holds no copy of the book.
    pub fn return_book(&mut self, user_id: UserId, book_id: &BookId, on_date: NaiveDate) -> bool {
        let Some(loan_id) = self.loans.close(user_id, book_id, on_date) else {
            debug!(user = %user_id, book = %book_id, "nothing to return");
            return false;
        };
        if let Some(&index) = self.book_index.get(book_id) {
            self.books[index].shelve();
        }
        info!(loan = %loan_id, user = %user_id, book = %book_id, "book returned");
        true
    }

    /// Number of open loans held by a user, across all books.
    pub fn active_loan_count(&self, user_id: UserId) -> usize {
        self.loans.active_count(user_id)
    }

    /// Number of copies of a book currently on loan, per the loan register.
    pub fn active_loans_for_book(&self, book_id: &BookId) -> usize {
        self.loans.active_for_book(book_id)
    }

    /// Books the user currently holds, with copy counts.
    pub fn list_active_loans(&self, user_id: UserId) -> Vec<ActiveLoan> {
        self.loans
            .open_pairs()
            .filter(|(user, _, _)| *user == user_id)
            .map(|(_, book_id, copies)| ActiveLoan {
                book_id: book_id.clone(),
                copies,
            })
            .collect()
    }

    /// Every (user, book) pair with at least one copy past its due date.
    pub fn list_overdue_loans(&self, today: NaiveDate) -> Vec<OverdueLoan> {
        self.loans
            .open_groups()
            .filter_map(|loans| {
                loans
                    .into_iter()
                    .find(|loan| loan.is_overdue(today))
                    .map(|loan| OverdueLoan {
                        user_id: loan.user_id,
                        book_id: loan.book_id.clone(),
                    })
            })
            .collect()
    }

    /// Full loan history in checkout order, open and closed.
    pub fn loans(&self) -> &[Loan] {
        self.loans.history()
    }

    /// Late fee owed on the copies of a book a user holds, as of `today`.
    ///
    /// Each overdue copy accrues `late_fee_per_day` per day past due,
    /// rounded to cents.
    pub fn late_fee(&self, user_id: UserId, book_id: &BookId, today: NaiveDate) -> Decimal {
        self.loans
            .open_loans(user_id, book_id)
            .into_iter()
            .map(|loan| {
                (Decimal::from(loan.days_overdue(today)) * self.policy.late_fee_per_day).round_dp(2)
            })
            .sum()
    }

    pub fn patron_status(&self, user_id: UserId) -> PatronStatus {
        let active_loans = self.list_active_loans(user_id);
        PatronStatus {
            active: self.users.get(&user_id).is_some_and(User::is_active),
            total_active_loan_count: active_loans.iter().map(|loan| loan.copies).sum(),
            active_loans,
        }
    }

    // === Search ===

    /// Case-insensitive substring search over title and author of active books.
    ///
    /// The query is trimmed; an empty query matches every active book.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        self.books
            .iter()
            .filter(|book| book.is_active() && book.matches(&needle))
            .map(|book| SearchHit {
                id: book.id().clone(),
                title: book.title().to_string(),
                author: book.author().to_string(),
                copies: book.total(),
                available: book.available(),
            })
            .collect()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

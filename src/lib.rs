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

//! # Library Ledger
//!
//! This library provides an in-memory circulation ledger for a small library:
//! registering users, cataloging books with copy counts, checking copies out
//! and back in, detecting overdue loans and searching the catalog.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Central engine owning users, books and loans
//! - [`Book`]: Catalog entry with total and available copies
//! - [`Loan`]: One copy lent to one user, with its due date
//! - [`Policy`]: Loan period, loan cap and late-fee rate
//! - [`LedgerError`]: Error types for rejected operations
//! - [`Permissive`]: Boolean-result view of the same ledger
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use library_ledger::{BookId, Ledger, UserId};
//!
//! let mut ledger = Ledger::new();
//! ledger.register_user(Some(UserId(1)), "Alice").unwrap();
//! ledger.add_book(10u64, "Clean Code", "Martin", 1).unwrap();
//!
//! // Check out a copy
//! let today = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
//! let loan = ledger.checkout(UserId(1), &BookId::Number(10), today).unwrap();
//! assert_eq!(loan.due_date, NaiveDate::from_ymd_opt(2025, 10, 15).unwrap());
//!
//! // Search reflects the shelf
//! let hits = ledger.search("clean");
//! assert_eq!(hits[0].available, 0);
//! ```
//!
//! ## Thread Safety
//!
//! The ledger is plain single-owner data. Share it across threads through
//! [`SharedLedger`], a mutex around the whole ledger.

mod base;
pub mod book;
pub mod error;
mod event;
mod ledger;
pub mod loan;
pub mod permissive;
pub mod policy;
pub mod user;

pub use base::{BookId, LoanId, UserId};
pub use book::Book;
pub use error::{ErrorKind, LedgerError};
pub use event::{Applied, Event};
pub use ledger::{ActiveLoan, Ledger, OverdueLoan, PatronStatus, SearchHit, SharedLedger};
pub use loan::Loan;
pub use permissive::Permissive;
pub use policy::{DEFAULT_LATE_FEE_PER_DAY, DEFAULT_LOAN_DAYS, MAX_ACTIVE_LOANS_PER_USER, Policy};
pub use user::User;

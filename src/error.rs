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

//! Error types for circulation operations.

use crate::base::{BookId, UserId};
use thiserror::Error;

/// Broad category of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape: empty name, non-positive id or copy count.
    InvalidArgument,
    /// Referenced user or book does not exist or is out of circulation.
    NotFound,
    /// Book removal blocked by outstanding loans.
    Conflict,
    /// Loan cap, stock exhaustion or id space exhausted.
    PolicyLimit,
}

/// Circulation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// User name is empty or blank
    #[error("name must be a non-empty string")]
    EmptyName,

    /// Explicit user id is zero or negative
    #[error("user id must be a positive integer")]
    InvalidUserId,

    /// Copy count is below one
    #[error("copies must be at least 1")]
    InvalidCopies,

    /// Book id is empty
    #[error("book id must not be empty")]
    InvalidBookId,

    /// Due date falls outside the representable calendar
    #[error("date out of range")]
    DateOutOfRange,

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("user {0} is inactive")]
    UserInactive(UserId),

    #[error("book {0} not found")]
    BookNotFound(BookId),

    #[error("book {0} is not in circulation")]
    BookInactive(BookId),

    /// Every copy of the book is on loan
    #[error("no copies of book {0} available")]
    NoCopiesAvailable(BookId),

    /// User already holds the maximum number of active loans
    #[error("user {0} already holds {1} active loans")]
    LoanLimitReached(UserId, usize),

    /// Every auto-assignable user id has been handed out
    #[error("no user ids left to assign")]
    UserIdsExhausted,

    /// Every loan id has been handed out
    #[error("no loan ids left to assign")]
    LoanIdsExhausted,

    /// Book still has copies on loan
    #[error("book {0} has outstanding loans")]
    OutstandingLoans(BookId),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::EmptyName
            | LedgerError::InvalidUserId
            | LedgerError::InvalidCopies
            | LedgerError::InvalidBookId
            | LedgerError::DateOutOfRange => ErrorKind::InvalidArgument,
            LedgerError::UserNotFound(_)
            | LedgerError::UserInactive(_)
            | LedgerError::BookNotFound(_)
            | LedgerError::BookInactive(_) => ErrorKind::NotFound,
            LedgerError::OutstandingLoans(_) => ErrorKind::Conflict,
            LedgerError::NoCopiesAvailable(_)
            | LedgerError::LoanLimitReached(..)
            | LedgerError::UserIdsExhausted
            | LedgerError::LoanIdsExhausted => ErrorKind::PolicyLimit,
        }
    }
}

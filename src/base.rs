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

//! Core identifier types for users, books and loans.

use crate::LedgerError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a registered user.
///
/// Valid ids are positive; `UserId(0)` is rejected on registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for UserId {
    type Error = LedgerError;

    /// Converts a caller-supplied integer, rejecting zero, negatives and
    /// values that do not fit.
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u32::try_from(value) {
            Ok(id) if id > 0 => Ok(UserId(id)),
            _ => Err(LedgerError::InvalidUserId),
        }
    }
}

/// Catalog identifier for a book: either a plain number or an ISBN string.
///
/// `"10"` parses to `Number(10)`, anything else non-empty to `Isbn`.
/// Deserialized strings go through the same parsing, so `"10"` and `10`
/// name the same book.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum BookId {
    Number(u64),
    Isbn(String),
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookId::Number(n) => write!(f, "{n}"),
            BookId::Isbn(isbn) => f.write_str(isbn),
        }
    }
}

impl FromStr for BookId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LedgerError::InvalidBookId);
        }
        Ok(s.parse::<u64>()
            .map(BookId::Number)
            .unwrap_or_else(|_| BookId::Isbn(s.to_string())))
    }
}

impl<'de> Deserialize<'de> for BookId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(BookId::Number(n)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl From<u64> for BookId {
    fn from(n: u64) -> Self {
        BookId::Number(n)
    }
}

impl From<&str> for BookId {
    fn from(isbn: &str) -> Self {
        BookId::Isbn(isbn.to_string())
    }
}

impl From<String> for BookId {
    fn from(isbn: String) -> Self {
        BookId::Isbn(isbn)
    }
}

/// Unique identifier for a loan.
///
/// Assigned in checkout order starting at 1 and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LoanId(pub u32);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_non_positive() {
        assert_eq!(UserId::try_from(0), Err(LedgerError::InvalidUserId));
        assert_eq!(UserId::try_from(-4), Err(LedgerError::InvalidUserId));
        assert_eq!(UserId::try_from(i64::MAX), Err(LedgerError::InvalidUserId));
        assert_eq!(UserId::try_from(7), Ok(UserId(7)));
    }

    #[test]
    fn book_id_parses_numbers_and_isbns() {
        assert_eq!("10".parse::<BookId>(), Ok(BookId::Number(10)));
        assert_eq!(
            " 978-0132350884 ".parse::<BookId>(),
            Ok(BookId::Isbn("978-0132350884".to_string()))
        );
        assert_eq!("   ".parse::<BookId>(), Err(LedgerError::InvalidBookId));
    }

    #[test]
    fn book_id_display_round_trips_text() {
        assert_eq!(BookId::Number(42).to_string(), "42");
        assert_eq!(BookId::from("isbn-1").to_string(), "isbn-1");
    }

    #[test]
    fn book_id_deserializes_like_it_parses() {
        let from_text: BookId = serde_json::from_str("\"10\"").unwrap();
        let from_number: BookId = serde_json::from_str("10").unwrap();
        assert_eq!(from_text, BookId::Number(10));
        assert_eq!(from_text, from_number);
        assert_eq!(from_text, "10".parse().unwrap());

        let isbn: BookId = serde_json::from_str("\" 978-0132350884 \"").unwrap();
        assert_eq!(isbn, BookId::Isbn("978-0132350884".to_string()));
        assert!(serde_json::from_str::<BookId>("\"  \"").is_err());
    }

    #[test]
    fn book_id_serializes_as_scalar() {
        assert_eq!(serde_json::to_string(&BookId::Number(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&BookId::from("abc")).unwrap(),
            "\"abc\""
        );
    }
}

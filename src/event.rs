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

//! Circulation events, for replaying a log of operations into a ledger.

use crate::base::{BookId, UserId};
use crate::loan::Loan;
use crate::{Ledger, LedgerError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    RegisterUser {
        user_id: Option<UserId>,
        name: String,
    },
    DeactivateUser {
        user_id: UserId,
    },
    AddBook {
        book_id: BookId,
        title: String,
        author: String,
        copies: u32,
    },
    RemoveBook {
        book_id: BookId,
    },
    Checkout {
        user_id: UserId,
        book_id: BookId,
        date: NaiveDate,
    },
    Return {
        user_id: UserId,
        book_id: BookId,
        date: NaiveDate,
    },
}

impl Event {
    /// Short lowercase name, as used in event logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterUser { .. } => "register",
            Self::DeactivateUser { .. } => "deactivate",
            Self::AddBook { .. } => "add",
            Self::RemoveBook { .. } => "remove",
            Self::Checkout { .. } => "checkout",
            Self::Return { .. } => "return",
        }
    }
}

/// What an applied event produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Done,
    CheckedOut(Loan),
    /// `false` when there was nothing to return.
    Returned(bool),
}

impl Ledger {
    /// Applies an event through the matching ledger operation.
    ///
    /// # Errors
    ///
    /// Whatever the underlying operation reports. Returns never fail.
    pub fn apply(&mut self, event: Event) -> Result<Applied, LedgerError> {
        match event {
            Event::RegisterUser { user_id, name } => {
                self.register_user(user_id, &name)?;
                Ok(Applied::Done)
            }
            Event::DeactivateUser { user_id } => {
                self.deactivate_user(user_id)?;
                Ok(Applied::Done)
            }
            Event::AddBook {
                book_id,
                title,
                author,
                copies,
            } => {
                self.add_book(book_id, &title, &author, copies)?;
                Ok(Applied::Done)
            }
            Event::RemoveBook { book_id } => {
                self.remove_book(&book_id)?;
                Ok(Applied::Done)
            }
            Event::Checkout {
                user_id,
                book_id,
                date,
            } => self.checkout(user_id, &book_id, date).map(Applied::CheckedOut),
            Event::Return {
                user_id,
                book_id,
                date,
            } => Ok(Applied::Returned(self.return_book(user_id, &book_id, date))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn apply_full_cycle() {
        let mut ledger = Ledger::new();
        let events = [
            Event::RegisterUser {
                user_id: Some(UserId(1)),
                name: "Alice".to_string(),
            },
            Event::AddBook {
                book_id: BookId::Number(10),
                title: "Clean Code".to_string(),
                author: "Martin".to_string(),
                copies: 1,
            },
        ];
        for event in events {
            assert_eq!(ledger.apply(event), Ok(Applied::Done));
        }

        let applied = ledger
            .apply(Event::Checkout {
                user_id: UserId(1),
                book_id: BookId::Number(10),
                date: date(2025, 10, 1),
            })
            .unwrap();
        let Applied::CheckedOut(loan) = applied else {
            panic!("expected a checked-out loan");
        };
        assert_eq!(loan.due_date, date(2025, 10, 15));

        let returned = ledger.apply(Event::Return {
            user_id: UserId(1),
            book_id: BookId::Number(10),
            date: date(2025, 10, 2),
        });
        assert_eq!(returned, Ok(Applied::Returned(true)));

        assert_eq!(
            ledger.apply(Event::RemoveBook {
                book_id: BookId::Number(10)
            }),
            Ok(Applied::Done)
        );
    }

    #[test]
    fn apply_propagates_errors() {
        let mut ledger = Ledger::new();
        let result = ledger.apply(Event::DeactivateUser { user_id: UserId(5) });
        assert_eq!(result, Err(LedgerError::UserNotFound(UserId(5))));
    }

    #[test]
    fn deserialized_events_parse_book_ids_like_csv() {
        let json = r#"{"Checkout":{"user_id":1,"book_id":"10","date":"2025-10-01"}}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            Event::Checkout {
                user_id: UserId(1),
                book_id: BookId::Number(10),
                date: date(2025, 10, 1),
            }
        );

        let mut ledger = Ledger::new();
        ledger.register_user(Some(UserId(1)), "Alice").unwrap();
        ledger.add_book(10u64, "Clean Code", "Martin", 1).unwrap();
        assert!(matches!(ledger.apply(event), Ok(Applied::CheckedOut(_))));
    }

    #[test]
    fn event_names() {
        let event = Event::RemoveBook {
            book_id: BookId::Number(1),
        };
        assert_eq!(event.name(), "remove");
    }
}

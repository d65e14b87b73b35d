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

//! Loan records and the register of open loans.
//!
//! A loan is open from checkout until a matching return closes it:
//! - `Open` → `Closed` (via return, most recently opened copy first)
//!
//! Closed loans stay in the register as history.

use crate::LedgerError;
use crate::base::{BookId, LoanId, UserId};
use chrono::NaiveDate;
use serde::Serialize;

/// One copy of one book lent to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loan {
    #[serde(rename = "loan")]
    pub id: LoanId,
    #[serde(rename = "user")]
    pub user_id: UserId,
    #[serde(rename = "book")]
    pub book_id: BookId,
    pub checkout_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_on: Option<NaiveDate>,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.returned_on.is_none()
    }

    /// An open loan is overdue once `today` is strictly past its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_active() && today > self.due_date
    }

    /// Whole days past the due date, or zero when not overdue.
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        if self.is_overdue(today) {
            (today - self.due_date).num_days()
        } else {
            0
        }
    }
}

/// Open loans for a single (user, book) pair, most recent last.
#[derive(Debug)]
struct OpenLoans {
    user_id: UserId,
    book_id: BookId,
    /// Positions in the history.
    loans: Vec<usize>,
}

/// Loan history plus an index of open loans.
///
/// Open pairs are kept in the order they were first opened. A pair whose
/// last copy is returned is dropped and goes to the back if reopened.
#[derive(Debug, Default)]
pub(crate) struct LoanRegister {
    /// Every loan ever opened, in checkout order.
    history: Vec<Loan>,
    open: Vec<OpenLoans>,
    /// Highest loan id handed out so far.
    issued: u32,
}

impl LoanRegister {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Id the next opened loan will get.
    ///
    /// # Errors
    ///
    /// [`LedgerError::LoanIdsExhausted`] once every id has been handed out.
    pub(crate) fn next_id(&self) -> Result<LoanId, LedgerError> {
        self.issued
            .checked_add(1)
            .map(LoanId)
            .ok_or(LedgerError::LoanIdsExhausted)
    }

    /// Records a new open loan under `id` and returns a copy of it.
    ///
    /// `id` must come from [`LoanRegister::next_id`].
    pub(crate) fn open(
        &mut self,
        id: LoanId,
        user_id: UserId,
        book_id: BookId,
        checkout_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Loan {
        self.issued = id.0;
        let position = self.history.len();
        let loan = Loan {
            id,
            user_id,
            book_id: book_id.clone(),
            checkout_date,
            due_date,
            returned_on: None,
        };
        self.history.push(loan.clone());

        match self
            .open
            .iter_mut()
            .find(|entry| entry.user_id == user_id && entry.book_id == book_id)
        {
            Some(entry) => entry.loans.push(position),
            None => self.open.push(OpenLoans {
                user_id,
                book_id,
                loans: vec![position],
            }),
        }
        loan
    }

    /// Closes the most recently opened loan for the pair.
    ///
    /// Returns `None` when the pair has nothing open.
    pub(crate) fn close(
        &mut self,
        user_id: UserId,
        book_id: &BookId,
        returned_on: NaiveDate,
    ) -> Option<LoanId> {
        let position = self
            .open
            .iter()
            .position(|entry| entry.user_id == user_id && &entry.book_id == book_id)?;
        let entry = &mut self.open[position];
        let index = entry.loans.pop()?;
        if entry.loans.is_empty() {
            self.open.remove(position);
        }
        let loan = self.history.get_mut(index)?;
        loan.returned_on = Some(returned_on);
        Some(loan.id)
    }

    pub(crate) fn active_count(&self, user_id: UserId) -> usize {
        self.open
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.loans.len())
            .sum()
    }

    pub(crate) fn active_for_book(&self, book_id: &BookId) -> usize {
        self.open
            .iter()
            .filter(|entry| &entry.book_id == book_id)
            .map(|entry| entry.loans.len())
            .sum()
    }

    /// Open pairs with their copy counts, in first-opened order.
    pub(crate) fn open_pairs(&self) -> impl Iterator<Item = (UserId, &BookId, usize)> {
        self.open
            .iter()
            .map(|entry| (entry.user_id, &entry.book_id, entry.loans.len()))
    }

    /// Open loans for a pair, oldest first.
    pub(crate) fn open_loans(&self, user_id: UserId, book_id: &BookId) -> Vec<&Loan> {
        self.open
            .iter()
            .find(|entry| entry.user_id == user_id && &entry.book_id == book_id)
            .map(|entry| {
                entry
                    .loans
                    .iter()
                    .filter_map(|&index| self.history.get(index))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Open loans grouped by pair, in first-opened order.
    pub(crate) fn open_groups(&self) -> impl Iterator<Item = Vec<&Loan>> {
        self.open.iter().map(|entry| {
            entry
                .loans
                .iter()
                .filter_map(|&index| self.history.get(index))
                .collect()
        })
    }

    pub(crate) fn history(&self) -> &[Loan] {
        &self.history
    }
}

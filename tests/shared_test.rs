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

//! Tests for sharing one ledger across threads behind a single lock.

use chrono::NaiveDate;
use library_ledger::{BookId, Ledger, UserId};
use std::sync::Arc;
use std::thread;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
}

#[test]
fn concurrent_checkouts_never_oversell() {
    let mut ledger = Ledger::new();
    for user in 1..=20 {
        ledger.register_user(Some(UserId(user)), "Patron").unwrap();
    }
    ledger.add_book(1u64, "Popular", "Author", 5).unwrap();
    let shared = ledger.into_shared();

    let handles: Vec<_> = (1..=20)
        .map(|user| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                shared
                    .lock()
                    .checkout(UserId(user), &BookId::Number(1), today())
                    .is_ok()
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|&ok| ok)
        .count();

    assert_eq!(successes, 5);
    let ledger = shared.lock();
    let book = ledger.book(&BookId::Number(1)).unwrap();
    assert_eq!(book.available(), 0);
    assert_eq!(ledger.loans().len(), 5);
}

#[test]
fn concurrent_checkout_and_return_cycles_balance() {
    let mut ledger = Ledger::new();
    for user in 1..=8 {
        ledger.register_user(Some(UserId(user)), "Patron").unwrap();
    }
    ledger.add_book(1u64, "Shared", "Author", 2).unwrap();
    let shared = ledger.into_shared();

    let handles: Vec<_> = (1..=8)
        .map(|user| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for _ in 0..100 {
                    let mut ledger = shared.lock();
                    if ledger
                        .checkout(UserId(user), &BookId::Number(1), today())
                        .is_ok()
                    {
                        assert!(ledger.return_book(UserId(user), &BookId::Number(1), today()));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let ledger = shared.lock();
    assert_eq!(ledger.book(&BookId::Number(1)).unwrap().available(), 2);
    assert!(ledger.list_overdue_loans(today()).is_empty());
}

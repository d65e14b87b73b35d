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

//! Circulation policy: loan period, loan cap and late-fee rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Days between checkout and due date.
pub const DEFAULT_LOAN_DAYS: u32 = 14;

/// Concurrent active loans allowed per user, across all books.
pub const MAX_ACTIVE_LOANS_PER_USER: usize = 3;

/// Late fee charged per overdue day, per copy.
pub const DEFAULT_LATE_FEE_PER_DAY: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub loan_days: u32,
    pub max_active_loans: usize,
    pub late_fee_per_day: Decimal,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            loan_days: DEFAULT_LOAN_DAYS,
            max_active_loans: MAX_ACTIVE_LOANS_PER_USER,
            late_fee_per_day: DEFAULT_LATE_FEE_PER_DAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_policy_matches_constants() {
        let policy = Policy::default();
        assert_eq!(policy.loan_days, 14);
        assert_eq!(policy.max_active_loans, 3);
        assert_eq!(policy.late_fee_per_day, dec!(0.25));
    }
}

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

//! Registered library users.

use crate::LedgerError;
use crate::base::UserId;
use serde::Serialize;

/// A library patron.
///
/// Deactivation is one-way through the ledger; re-registering the same id
/// replaces the record with a fresh, active one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    name: String,
    active: bool,
}

impl User {
    /// Creates an active user, trimming the display name.
    pub(crate) fn new(id: UserId, name: &str) -> Result<Self, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyName);
        }
        Ok(Self {
            id,
            name: name.to_string(),
            active: true,
        })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_is_active_with_trimmed_name() {
        let user = User::new(UserId(1), "  Alice ").unwrap();
        assert_eq!(user.name(), "Alice");
        assert!(user.is_active());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(User::new(UserId(1), ""), Err(LedgerError::EmptyName));
        assert_eq!(User::new(UserId(1), " \t "), Err(LedgerError::EmptyName));
    }

    #[test]
    fn deactivate_clears_flag() {
        let mut user = User::new(UserId(2), "Bob").unwrap();
        user.deactivate();
        assert!(!user.is_active());
    }
}

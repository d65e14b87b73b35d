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

use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, Trim, Writer};
use library_ledger::{BookId, Event, Ledger, Policy, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Library Ledger - Replay circulation event CSV files
///
/// Reads circulation events from a CSV file and writes a report to stdout.
/// Supports registering and deactivating users, adding and removing books,
/// checkouts and returns.
#[derive(Parser, Debug)]
#[command(name = "library-ledger")]
#[command(about = "A library circulation ledger that replays event CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with circulation events
    ///
    /// Expected format: type,user,book,date,name,title,author,copies
    /// Example: cargo run -- events.csv --report overdue > overdue.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Report to write once all events are applied
    #[arg(long, value_enum, default_value_t = Report::Catalog)]
    report: Report,

    /// Reference date for overdue checks (defaults to the local date)
    #[arg(long, value_name = "YYYY-MM-DD")]
    today: Option<NaiveDate>,

    /// Days a copy may be kept before it is due
    #[arg(long, default_value_t = library_ledger::DEFAULT_LOAN_DAYS)]
    loan_days: u32,

    /// Active loans allowed per user
    #[arg(long, default_value_t = library_ledger::MAX_ACTIVE_LOANS_PER_USER)]
    max_loans: usize,

    /// Late fee charged per overdue day, per copy
    #[arg(long, default_value_t = library_ledger::DEFAULT_LATE_FEE_PER_DAY)]
    fee_per_day: Decimal,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Report {
    /// Every book with its copy counts
    Catalog,
    /// Full loan history
    Loans,
    /// Overdue (user, book) pairs with late fees
    Overdue,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args = Args::parse();
    let policy = Policy {
        loan_days: args.loan_days,
        max_active_loans: args.max_loans,
        late_fee_per_day: args.fee_per_day,
    };

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    // Replay events from CSV
    let ledger = match process_events(BufReader::new(file), policy) {
        Ok(ledger) => ledger,
        Err(e) => {
            eprintln!("Error processing events: {}", e);
            process::exit(1);
        }
    };

    // Write the requested report to stdout
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let written = match args.report {
        Report::Catalog => write_catalog(&ledger, std::io::stdout()),
        Report::Loans => write_loans(&ledger, std::io::stdout()),
        Report::Overdue => write_overdue(&ledger, today, std::io::stdout()),
    };
    if let Err(e) = written {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `type, user, book, date, name, title, author, copies`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    user: Option<i64>,
    #[serde(default)]
    book: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    date: Option<NaiveDate>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    copies: Option<i64>,
}

impl CsvRecord {
    /// Converts CSV record to an Event.
    ///
    /// Returns `None` for unknown event types, missing required fields or
    /// ids and copy counts that cannot be valid.
    fn into_event(self) -> Option<Event> {
        let user_id = self.user.map(UserId::try_from);
        let book_id = self.book.as_deref().map(str::parse::<BookId>);

        match self.event_type.to_lowercase().as_str() {
            "register" => Some(Event::RegisterUser {
                user_id: user_id.transpose().ok()?,
                name: self.name?,
            }),
            "deactivate" => Some(Event::DeactivateUser {
                user_id: user_id?.ok()?,
            }),
            "add" => Some(Event::AddBook {
                book_id: book_id?.ok()?,
                title: self.title.unwrap_or_default(),
                author: self.author.unwrap_or_default(),
                copies: u32::try_from(self.copies.unwrap_or(1)).ok()?,
            }),
            "remove" => Some(Event::RemoveBook {
                book_id: book_id?.ok()?,
            }),
            "checkout" => Some(Event::Checkout {
                user_id: user_id?.ok()?,
                book_id: book_id?.ok()?,
                date: self.date?,
            }),
            "return" => Some(Event::Return {
                user_id: user_id?.ok()?,
                book_id: book_id?.ok()?,
                date: self.date?,
            }),
            _ => None,
        }
    }
}

/// Replay circulation events from a CSV reader into a fresh ledger.
///
/// Rows are streamed one at a time. Malformed rows and rejected events are
/// logged and skipped; processing continues with the next row.
///
/// # CSV Format
///
/// Expected columns: `type, user, book, date, name, title, author, copies`
/// - `type`: register, deactivate, add, remove, checkout or return
/// - `user`: User id (positive integer; optional for register)
/// - `book`: Book id (integer or ISBN)
/// - `date`: `YYYY-MM-DD`, required for checkout and return
/// - `name`: Display name for register
/// - `title`, `author`, `copies`: Catalog fields for add (copies defaults to 1)
///
/// # Example
///
/// ```csv
/// type,user,book,date,name,title,author,copies
/// register,1,,,Alice,,,
/// add,,10,,,Clean Code,Martin,2
/// checkout,1,10,2025-10-01,,,,
/// return,1,10,2025-10-03,,,,
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn process_events<R: Read>(reader: R, policy: Policy) -> Result<Ledger, csv::Error> {
    let mut ledger = Ledger::with_policy(policy);

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " checkout "
        .flexible(true) // Allow short rows
        .has_headers(true)
        .from_reader(reader);

    for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let line = row + 2;
        match result {
            Ok(record) => {
                let event_type = record.event_type.clone();
                let Some(event) = record.into_event() else {
                    warn!(line, event = %event_type, "skipping invalid event record");
                    continue;
                };

                let name = event.name();
                if let Err(e) = ledger.apply(event) {
                    warn!(line, event = name, kind = ?e.kind(), error = %e, "event rejected");
                }
            }
            Err(e) => {
                warn!(line, error = %e, "skipping malformed row");
            }
        }
    }

    Ok(ledger)
}

/// Write every catalog entry, including books out of circulation.
///
/// # CSV Format
///
/// Columns: `book, title, author, total, available, active`
pub fn write_catalog<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for book in ledger.books() {
        wtr.serialize(book)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the full loan history in checkout order.
///
/// # CSV Format
///
/// Columns: `loan, user, book, checkout_date, due_date, returned_on`
pub fn write_loans<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for loan in ledger.loans() {
        wtr.serialize(loan)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct OverdueRow {
    user: UserId,
    book: BookId,
    days_overdue: i64,
    late_fee: Decimal,
}

/// Write overdue (user, book) pairs as of `today`.
///
/// `days_overdue` is the longest-overdue copy; `late_fee` covers every copy.
///
/// # CSV Format
///
/// Columns: `user, book, days_overdue, late_fee`
pub fn write_overdue<W: Write>(
    ledger: &Ledger,
    today: NaiveDate,
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for overdue in ledger.list_overdue_loans(today) {
        let days_overdue = ledger
            .loans()
            .iter()
            .filter(|loan| loan.user_id == overdue.user_id && loan.book_id == overdue.book_id)
            .map(|loan| loan.days_overdue(today))
            .max()
            .unwrap_or(0);
        wtr.serialize(OverdueRow {
            late_fee: ledger.late_fee(overdue.user_id, &overdue.book_id, today),
            user: overdue.user_id,
            book: overdue.book_id,
            days_overdue,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    const HEADER: &str = "type,user,book,date,name,title,author,copies\n";

    fn replay(body: &str) -> Ledger {
        let csv = format!("{HEADER}{body}");
        process_events(Cursor::new(csv), Policy::default()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_register_and_add() {
        let ledger = replay(
            "register,1,,,Alice,,,\n\
             add,,10,,,Clean Code,Martin,2\n",
        );

        assert_eq!(ledger.user(UserId(1)).unwrap().name(), "Alice");
        let book = ledger.book(&BookId::Number(10)).unwrap();
        assert_eq!(book.title(), "Clean Code");
        assert_eq!(book.total(), 2);
    }

    #[test]
    fn register_without_id_assigns_one() {
        let ledger = replay("register,,,,Alice,,,\n");
        assert!(ledger.user(UserId(1)).is_some());
    }

    #[test]
    fn add_defaults_to_one_copy() {
        let ledger = replay("add,,isbn-1,,,Title,Author,\n");
        assert_eq!(ledger.book(&BookId::from("isbn-1")).unwrap().total(), 1);
    }

    #[test]
    fn parse_checkout_and_return() {
        let ledger = replay(
            "register,1,,,Alice,,,\n\
             add,,10,,,Clean Code,Martin,1\n\
             checkout,1,10,2025-10-01,,,,\n",
        );
        assert_eq!(ledger.book(&BookId::Number(10)).unwrap().available(), 0);
        assert_eq!(ledger.loans()[0].due_date, date(2025, 10, 15));

        let ledger = replay(
            "register,1,,,Alice,,,\n\
             add,,10,,,Clean Code,Martin,1\n\
             checkout,1,10,2025-10-01,,,,\n\
             return,1,10,2025-10-03,,,,\n",
        );
        assert_eq!(ledger.book(&BookId::Number(10)).unwrap().available(), 1);
    }

    #[test]
    fn parse_with_whitespace() {
        let ledger = replay(" register , 1 , , , Alice , , , \n");
        assert_eq!(ledger.user(UserId(1)).unwrap().name(), "Alice");
    }

    #[test]
    fn skip_invalid_and_rejected_rows() {
        let ledger = replay(
            "register,1,,,Alice,,,\n\
             register,-1,,,Mallory,,,\n\
             invalid,row,data,here,,,,\n\
             add,,10,,,Clean Code,Martin,0\n\
             checkout,1,10,not-a-date,,,,\n\
             checkout,7,10,2025-10-01,,,,\n\
             add,,11,,,Refactoring,Fowler,1\n",
        );

        assert_eq!(ledger.users().count(), 1);
        assert!(ledger.book(&BookId::Number(10)).is_none());
        assert!(ledger.book(&BookId::Number(11)).is_some());
        assert!(ledger.loans().is_empty());
    }

    #[test]
    fn policy_is_applied() {
        let csv = format!(
            "{HEADER}register,1,,,Alice,,,\n\
             add,,10,,,Clean Code,Martin,1\n\
             checkout,1,10,2025-10-01,,,,\n"
        );
        let policy = Policy {
            loan_days: 7,
            ..Policy::default()
        };
        let ledger = process_events(Cursor::new(csv), policy).unwrap();
        assert_eq!(ledger.loans()[0].due_date, date(2025, 10, 8));
    }

    #[test]
    fn write_catalog_to_csv() {
        let ledger = replay(
            "add,,10,,,Clean Code,Martin,2\n\
             add,,isbn-1,,,Refactoring,Fowler,1\n",
        );

        let mut output = Vec::new();
        write_catalog(&ledger, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(
            output_str,
            "book,title,author,total,available,active\n\
             10,Clean Code,Martin,2,2,true\n\
             isbn-1,Refactoring,Fowler,1,1,true\n"
        );
    }

    #[test]
    fn write_loans_to_csv() {
        let ledger = replay(
            "register,1,,,Alice,,,\n\
             add,,10,,,Clean Code,Martin,1\n\
             checkout,1,10,2025-10-01,,,,\n\
             return,1,10,2025-10-03,,,,\n",
        );

        let mut output = Vec::new();
        write_loans(&ledger, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(
            output_str,
            "loan,user,book,checkout_date,due_date,returned_on\n\
             1,1,10,2025-10-01,2025-10-15,2025-10-03\n"
        );
    }

    #[test]
    fn write_overdue_with_fees() {
        let ledger = replay(
            "register,2,,,Bob,,,\n\
             add,,10,,,Clean Code,Martin,2\n\
             checkout,2,10,2025-09-01,,,,\n",
        );

        let mut output = Vec::new();
        write_overdue(&ledger, date(2025, 10, 1), &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(
            output_str,
            "user,book,days_overdue,late_fee\n\
             2,10,16,4.00\n"
        );
        assert_eq!(
            ledger.late_fee(UserId(2), &BookId::Number(10), date(2025, 10, 1)),
            dec!(4.00)
        );
    }
}

//! SQLite snapshot store.
//!
//! Each collection gets its own table; the snapshot version lives in `meta`.
//! Commits run inside an `IMMEDIATE` transaction, so the version check and the
//! rewrite are serialized across every connection to the same database file,
//! including connections from other processes.

mod row;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

use crate::error::{LedgerError, Result};
use crate::ids::Counters;
use crate::storage::traits::{CommitOutcome, SnapshotStore};
use crate::storage::types::{Book, Member, Snapshot, Transaction};

use row::{to_i64, to_u64, BookRow, MemberRow, TransactionRow};

const FORMAT_VERSION: &str = "1";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        isbn TEXT,
        total_copies INTEGER NOT NULL CHECK (total_copies >= 0),
        available_copies INTEGER NOT NULL
            CHECK (available_copies >= 0 AND available_copies <= total_copies),
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS members (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT,
        active_loan_count INTEGER NOT NULL CHECK (active_loan_count >= 0),
        created_at TEXT NOT NULL
    );

    -- No foreign keys: loan history outlives removed books and members
    CREATE TABLE IF NOT EXISTS transactions (
        id INTEGER PRIMARY KEY,
        book_id INTEGER NOT NULL,
        book_title TEXT NOT NULL,
        member_id INTEGER NOT NULL,
        member_name TEXT NOT NULL,
        issue_date TEXT NOT NULL,
        return_date TEXT,
        status TEXT NOT NULL CHECK (status IN ('issued', 'returned'))
    );

    CREATE TABLE IF NOT EXISTS counters (
        entity TEXT PRIMARY KEY,
        next_id INTEGER NOT NULL CHECK (next_id >= 1)
    );

    INSERT OR IGNORE INTO meta (key, value) VALUES ('format_version', '1');
    INSERT OR IGNORE INTO meta (key, value) VALUES ('version', '0');
    INSERT OR IGNORE INTO counters (entity, next_id) VALUES ('book', 1);
    INSERT OR IGNORE INTO counters (entity, next_id) VALUES ('member', 1);
    INSERT OR IGNORE INTO counters (entity, next_id) VALUES ('transaction', 1);
"#;

/// SQLite-backed snapshot store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // WAL lets readers load the last commit while a writer is active.
        let _mode: String =
            conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        Self::init(conn)
    }

    /// Private in-memory database; handy for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;

        let format_version: String = conn.query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )?;
        if format_version != FORMAT_VERSION {
            return Err(LedgerError::StoreUnavailable(format!(
                "Unsupported store format version {}",
                format_version
            )));
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| LedgerError::StoreUnavailable("SQLite connection poisoned".to_string()))
    }

    fn read_version(conn: &Connection) -> Result<u64> {
        let raw: Option<String> = conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                row.get(0)
            })
            .optional()?;
        let raw = raw.ok_or_else(|| {
            LedgerError::StoreUnavailable("Store metadata missing version".to_string())
        })?;
        raw.parse::<u64>()
            .map_err(|e| LedgerError::StoreUnavailable(format!("Invalid store version: {}", e)))
    }

    fn read_books(conn: &Connection) -> Result<Vec<Book>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, title, author, isbn, total_copies, available_copies, created_at
            FROM books
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(BookRow {
                id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                isbn: row.get(3)?,
                total_copies: row.get(4)?,
                available_copies: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;

        let mut books = Vec::new();
        for row in rows {
            books.push(Book::try_from(row?)?);
        }
        Ok(books)
    }

    fn read_members(conn: &Connection) -> Result<Vec<Member>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, email, phone, active_loan_count, created_at
            FROM members
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(MemberRow {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                active_loan_count: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        let mut members = Vec::new();
        for row in rows {
            members.push(Member::try_from(row?)?);
        }
        Ok(members)
    }

    fn read_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, book_id, book_title, member_id, member_name, issue_date, return_date, status
            FROM transactions
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TransactionRow {
                id: row.get(0)?,
                book_id: row.get(1)?,
                book_title: row.get(2)?,
                member_id: row.get(3)?,
                member_name: row.get(4)?,
                issue_date: row.get(5)?,
                return_date: row.get(6)?,
                status: row.get(7)?,
            })
        })?;

        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(Transaction::try_from(row?)?);
        }
        Ok(transactions)
    }

    fn read_counters(conn: &Connection) -> Result<Counters> {
        let mut counters = Counters::default();
        let mut stmt = conn.prepare("SELECT entity, next_id FROM counters")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (entity, next_id) = row?;
            let next_id = to_u64(next_id, "counters.next_id")?;
            match entity.as_str() {
                "book" => counters.next_book_id = next_id,
                "member" => counters.next_member_id = next_id,
                "transaction" => counters.next_transaction_id = next_id,
                other => {
                    return Err(LedgerError::StoreUnavailable(format!(
                        "Unknown counter: {}",
                        other
                    )))
                }
            }
        }
        Ok(counters)
    }

    fn write_snapshot(conn: &Connection, snapshot: &Snapshot, version: u64) -> Result<()> {
        conn.execute_batch(
            "DELETE FROM books; DELETE FROM members; DELETE FROM transactions;",
        )?;

        {
            let mut stmt = conn.prepare(
                r#"
                INSERT INTO books (id, title, author, isbn, total_copies, available_copies, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )?;
            for book in &snapshot.books {
                stmt.execute((
                    to_i64(book.id.get(), "books.id")?,
                    &book.title,
                    &book.author,
                    &book.isbn,
                    book.total_copies,
                    book.available_copies,
                    book.created_at.to_rfc3339(),
                ))?;
            }
        }

        {
            let mut stmt = conn.prepare(
                r#"
                INSERT INTO members (id, name, email, phone, active_loan_count, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )?;
            for member in &snapshot.members {
                stmt.execute((
                    to_i64(member.id.get(), "members.id")?,
                    &member.name,
                    &member.email,
                    &member.phone,
                    member.active_loan_count,
                    member.created_at.to_rfc3339(),
                ))?;
            }
        }

        {
            let mut stmt = conn.prepare(
                r#"
                INSERT INTO transactions (
                    id, book_id, book_title, member_id, member_name, issue_date, return_date, status
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )?;
            for txn in &snapshot.transactions {
                stmt.execute((
                    to_i64(txn.id.get(), "transactions.id")?,
                    to_i64(txn.book_id.get(), "transactions.book_id")?,
                    &txn.book_title,
                    to_i64(txn.member_id.get(), "transactions.member_id")?,
                    &txn.member_name,
                    txn.issue_date.to_rfc3339(),
                    txn.return_date.map(|date| date.to_rfc3339()),
                    txn.status.as_str(),
                ))?;
            }
        }

        let counters = &snapshot.counters;
        for (entity, next_id) in [
            ("book", counters.next_book_id),
            ("member", counters.next_member_id),
            ("transaction", counters.next_transaction_id),
        ] {
            conn.execute(
                "UPDATE counters SET next_id = ? WHERE entity = ?",
                (to_i64(next_id, "counters.next_id")?, entity),
            )?;
        }

        conn.execute(
            "UPDATE meta SET value = ? WHERE key = 'version'",
            [version.to_string()],
        )?;
        Ok(())
    }
}

impl SnapshotStore for SqliteStore {
    fn load(&self) -> Result<Snapshot> {
        let mut conn = self.lock_conn()?;
        // One read transaction so all collections come from the same commit.
        let tx = conn.transaction()?;

        let snapshot = Snapshot {
            version: Self::read_version(&tx)?,
            books: Self::read_books(&tx)?,
            members: Self::read_members(&tx)?,
            transactions: Self::read_transactions(&tx)?,
            counters: Self::read_counters(&tx)?,
        };

        tx.commit()?;
        Ok(snapshot)
    }

    fn commit(&self, expected: u64, next: &Snapshot) -> Result<CommitOutcome> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = Self::read_version(&tx)?;
        if current != expected {
            return Ok(CommitOutcome::Conflict { current });
        }

        let version = expected + 1;
        Self::write_snapshot(&tx, next, version)?;
        tx.commit()?;

        Ok(CommitOutcome::Committed { version })
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{BookId, MemberId, TransactionId};
    use crate::storage::types::LoanStatus;
    use chrono::{TimeZone, Utc};

    fn sample_snapshot() -> Snapshot {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        Snapshot {
            version: 0,
            books: vec![Book {
                id: BookId(1),
                title: "Dune".to_string(),
                author: "Herbert".to_string(),
                isbn: Some("9780441172719".to_string()),
                total_copies: 2,
                available_copies: 1,
                created_at: at,
            }],
            members: vec![Member {
                id: MemberId(1),
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
                phone: None,
                active_loan_count: 1,
                created_at: at,
            }],
            transactions: vec![Transaction {
                id: TransactionId(1),
                book_id: BookId(1),
                book_title: "Dune".to_string(),
                member_id: MemberId(1),
                member_name: "Ann".to_string(),
                issue_date: at,
                return_date: None,
                status: LoanStatus::Issued,
            }],
            counters: Counters {
                next_book_id: 2,
                next_member_id: 2,
                next_transaction_id: 2,
            },
        }
    }

    #[test]
    fn test_fresh_database_is_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn test_commit_round_trips_all_collections() {
        let store = SqliteStore::open_in_memory().unwrap();
        let snapshot = sample_snapshot();

        let outcome = store.commit(0, &snapshot).unwrap();
        assert_eq!(outcome, CommitOutcome::Committed { version: 1 });

        let loaded = store.load().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.books, snapshot.books);
        assert_eq!(loaded.members, snapshot.members);
        assert_eq!(loaded.transactions, snapshot.transactions);
        assert_eq!(loaded.counters, snapshot.counters);
    }

    #[test]
    fn test_conflicting_commit_leaves_rows_untouched() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.commit(0, &sample_snapshot()).unwrap();

        let outcome = store.commit(0, &Snapshot::default()).unwrap();
        assert_eq!(outcome, CommitOutcome::Conflict { current: 1 });
        assert_eq!(store.load().unwrap().books.len(), 1);
    }

    #[test]
    fn test_check_constraint_rejects_overdrawn_book() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut snapshot = sample_snapshot();
        snapshot.books[0].available_copies = 3;

        let err = store.commit(0, &snapshot).unwrap_err();
        assert!(matches!(err, LedgerError::Integrity(_)));
        assert!(!err.is_retryable());
        assert_eq!(store.load().unwrap().version, 0);
    }
}

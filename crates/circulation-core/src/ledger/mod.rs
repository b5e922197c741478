//! The ledger engine.
//!
//! `Ledger` is the only writer of book, member and transaction state. Every
//! mutation is one read-validate-mutate-write cycle:
//!
//! 1. take the engine's write lock
//! 2. load the last committed snapshot
//! 3. validate and apply the change to that private copy
//! 4. compare-and-swap the copy back into the store
//!
//! An error at any step returns before step 4, so the store never sees a
//! partial change. Reads skip the write lock and load the last commit.

mod integrity;
mod validation;

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::error::{Entity, LedgerError, Result};
use crate::ids::{BookId, MemberId, TransactionId};
use crate::storage::{
    Book, CommitOutcome, LoanStatus, Member, NewBook, NewMember, Snapshot, SnapshotStore,
    Transaction, TransactionFilter,
};

/// What a mutation decided to do with its working copy.
enum Change<T> {
    /// Persist the working copy, then hand back the value.
    Commit(T),
    /// Nothing changed; skip the store write.
    Unchanged(T),
}

/// Library circulation ledger over a snapshot store.
///
/// All methods take `&self`; share one ledger between threads with an `Arc`.
pub struct Ledger<S, C = SystemClock> {
    store: S,
    clock: C,
    write_lock: Mutex<()>,
}

impl<S: SnapshotStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: SnapshotStore, C: Clock> Ledger<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| LedgerError::StoreUnavailable("Ledger write lock poisoned".to_string()))
    }

    fn apply<T>(
        &self,
        operation: &'static str,
        mutate: impl FnOnce(&mut Snapshot, DateTime<Utc>) -> Result<Change<T>>,
    ) -> Result<T> {
        let _guard = self.lock_writes()?;

        let mut working = self.store.load()?;
        let expected = working.version;
        let value = match mutate(&mut working, self.clock.now())? {
            Change::Commit(value) => value,
            Change::Unchanged(value) => {
                tracing::debug!(operation, version = expected, "no change to commit");
                return Ok(value);
            }
        };

        match self.store.commit(expected, &working)? {
            CommitOutcome::Committed { version } => {
                tracing::debug!(
                    operation,
                    version,
                    backend = self.store.backend(),
                    "committed"
                );
                Ok(value)
            }
            CommitOutcome::Conflict { current } => {
                tracing::warn!(
                    operation,
                    expected,
                    current,
                    backend = self.store.backend(),
                    "commit lost compare-and-swap"
                );
                Err(LedgerError::StoreUnavailable(format!(
                    "dataset changed concurrently (expected version {}, found {})",
                    expected, current
                )))
            }
        }
    }

    // --- Books ---

    /// Register a new title with `copies` copies on the shelf.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `copies` is zero or title/author are blank.
    pub fn add_book(&self, book: NewBook) -> Result<BookId> {
        let book = validation::validate_book(book)?;
        self.apply("add_book", move |snapshot, now| {
            let id = snapshot.counters.allocate_book()?;
            snapshot.books.push(Book {
                id,
                title: book.title,
                author: book.author,
                isbn: book.isbn,
                total_copies: book.copies,
                available_copies: book.copies,
                created_at: now,
            });
            Ok(Change::Commit(id))
        })
    }

    /// Delete a book. Returns `false` if it was already gone.
    ///
    /// Loan history that references the book is kept as-is.
    pub fn remove_book(&self, id: BookId) -> Result<bool> {
        self.apply("remove_book", |snapshot, _| {
            match snapshot.books.iter().position(|book| book.id == id) {
                Some(index) => {
                    let removed = snapshot.books.remove(index);
                    if removed.checked_out() > 0 {
                        tracing::info!(
                            book_id = %id,
                            checked_out = removed.checked_out(),
                            "removed book with copies still on loan"
                        );
                    }
                    Ok(Change::Commit(true))
                }
                None => Ok(Change::Unchanged(false)),
            }
        })
    }

    // --- Members ---

    /// Register a borrower.
    ///
    /// # Errors
    ///
    /// `Conflict` if another member already uses exactly this email;
    /// `InvalidArgument` for a blank name or malformed email.
    pub fn register_member(&self, member: NewMember) -> Result<MemberId> {
        let member = validation::validate_member(member)?;
        self.apply("register_member", move |snapshot, now| {
            if let Some(existing) = snapshot.member_by_email(&member.email) {
                return Err(LedgerError::Conflict(format!(
                    "email {} already registered to member {}",
                    member.email, existing.id
                )));
            }
            let id = snapshot.counters.allocate_member()?;
            snapshot.members.push(Member {
                id,
                name: member.name,
                email: member.email,
                phone: member.phone,
                active_loan_count: 0,
                created_at: now,
            });
            Ok(Change::Commit(id))
        })
    }

    /// Delete a member. Returns `false` if they were already gone.
    pub fn remove_member(&self, id: MemberId) -> Result<bool> {
        self.apply("remove_member", |snapshot, _| {
            match snapshot.members.iter().position(|member| member.id == id) {
                Some(index) => {
                    let removed = snapshot.members.remove(index);
                    if removed.active_loan_count > 0 {
                        tracing::info!(
                            member_id = %id,
                            active_loans = removed.active_loan_count,
                            "removed member with open loans"
                        );
                    }
                    Ok(Change::Commit(true))
                }
                None => Ok(Change::Unchanged(false)),
            }
        })
    }

    // --- Loans ---

    /// Lend one copy of `book_id` to `member_id`.
    ///
    /// The availability decrement, the member's loan count and the new
    /// transaction are committed together.
    ///
    /// # Errors
    ///
    /// `BookUnavailable` if the book is missing or has no copy on the shelf;
    /// `NotFound` if the member is missing.
    pub fn issue_loan(&self, book_id: BookId, member_id: MemberId) -> Result<TransactionId> {
        self.apply("issue_loan", |snapshot, now| {
            let book_title = match snapshot.book(book_id) {
                Some(book) if book.available_copies > 0 => book.title.clone(),
                _ => return Err(LedgerError::BookUnavailable(book_id.get())),
            };
            let member_name = snapshot
                .member(member_id)
                .map(|member| member.name.clone())
                .ok_or_else(|| LedgerError::not_found(Entity::Member, member_id))?;

            let id = snapshot.counters.allocate_transaction()?;

            let book = snapshot
                .book_mut(book_id)
                .ok_or(LedgerError::BookUnavailable(book_id.get()))?;
            book.available_copies -= 1;

            let member = snapshot
                .member_mut(member_id)
                .ok_or_else(|| LedgerError::not_found(Entity::Member, member_id))?;
            member.active_loan_count = member.active_loan_count.checked_add(1).ok_or_else(|| {
                LedgerError::Integrity(format!("member {} loan count overflow", member_id))
            })?;

            snapshot.transactions.push(Transaction {
                id,
                book_id,
                book_title,
                member_id,
                member_name,
                issue_date: now,
                return_date: None,
                status: LoanStatus::Issued,
            });
            Ok(Change::Commit(id))
        })
    }

    /// Close an open loan.
    ///
    /// Availability goes back up (never past `total_copies`) if the book
    /// still exists, and the member's loan count goes down (never below
    /// zero) if the member still exists.
    ///
    /// # Errors
    ///
    /// `NotFound` if the transaction is unknown; `AlreadyReturned` if it was
    /// closed before, in which case nothing is modified.
    pub fn return_loan(&self, id: TransactionId) -> Result<()> {
        self.apply("return_loan", |snapshot, now| {
            let txn = snapshot
                .transaction_mut(id)
                .ok_or_else(|| LedgerError::not_found(Entity::Transaction, id))?;
            if !txn.is_open() {
                return Err(LedgerError::AlreadyReturned(id.get()));
            }
            txn.status = LoanStatus::Returned;
            txn.return_date = Some(now);
            let (book_id, member_id) = (txn.book_id, txn.member_id);

            if let Some(book) = snapshot.book_mut(book_id) {
                if book.available_copies < book.total_copies {
                    book.available_copies += 1;
                } else {
                    tracing::warn!(
                        transaction_id = %id,
                        book_id = %book_id,
                        "book already fully on shelf; availability left at total"
                    );
                }
            }

            if let Some(member) = snapshot.member_mut(member_id) {
                if member.active_loan_count > 0 {
                    member.active_loan_count -= 1;
                } else {
                    tracing::warn!(
                        transaction_id = %id,
                        member_id = %member_id,
                        "member loan count already zero"
                    );
                }
            }

            Ok(Change::Commit(()))
        })
    }

    // --- Reads ---

    /// The whole dataset as of the last commit.
    pub fn snapshot(&self) -> Result<Snapshot> {
        self.store.load()
    }

    pub fn list_books(&self) -> Result<Vec<Book>> {
        Ok(self.store.load()?.books)
    }

    pub fn list_members(&self) -> Result<Vec<Member>> {
        Ok(self.store.load()?.members)
    }

    /// Transactions matching `filter`, oldest first.
    pub fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        Ok(self.store.load()?.transactions_matching(filter))
    }

    pub fn book(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.store.load()?.book(id).cloned())
    }

    pub fn member(&self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.store.load()?.member(id).cloned())
    }

    pub fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        Ok(self.store.load()?.transaction(id).cloned())
    }

    /// Verify the committed dataset against every ledger invariant.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Integrity` naming the first violation.
    pub fn check_integrity(&self) -> Result<()> {
        integrity::check(&self.store.load()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::ErrorKind;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn ledger() -> Ledger<MemoryStore> {
        Ledger::new(MemoryStore::new())
    }

    #[test]
    fn test_add_book_sets_available_to_copies() {
        let ledger = ledger();
        let id = ledger
            .add_book(NewBook::new("Dune", "Herbert", 2).with_isbn("9780441172719"))
            .unwrap();
        assert_eq!(id, BookId(1));

        let book = ledger.book(id).unwrap().unwrap();
        assert_eq!(book.total_copies, 2);
        assert_eq!(book.available_copies, 2);
        assert_eq!(book.isbn.as_deref(), Some("9780441172719"));
    }

    #[test]
    fn test_invalid_book_leaves_store_at_version_zero() {
        let ledger = ledger();
        let err = ledger.add_book(NewBook::new("", "Herbert", 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(ledger.snapshot().unwrap().version, 0);
    }

    #[test]
    fn test_duplicate_email_conflicts_case_sensitively() {
        let ledger = ledger();
        ledger
            .register_member(NewMember::new("Ann", "ann@x.com"))
            .unwrap();

        let err = ledger
            .register_member(NewMember::new("Other Ann", "ann@x.com"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let id = ledger
            .register_member(NewMember::new("Loud Ann", "ANN@x.com"))
            .unwrap();
        assert_eq!(id, MemberId(2));
    }

    #[test]
    fn test_conflict_does_not_consume_an_id() {
        let ledger = ledger();
        ledger
            .register_member(NewMember::new("Ann", "ann@x.com"))
            .unwrap();
        let _ = ledger.register_member(NewMember::new("Ann", "ann@x.com"));
        let id = ledger
            .register_member(NewMember::new("Bob", "bob@x.com"))
            .unwrap();
        assert_eq!(id, MemberId(2));
    }

    #[test]
    fn test_issue_to_missing_member_changes_nothing() {
        let ledger = ledger();
        let book = ledger.add_book(NewBook::new("Dune", "Herbert", 1)).unwrap();
        let before = ledger.snapshot().unwrap();

        let err = ledger.issue_loan(book, MemberId(9)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::NotFound {
                entity: Entity::Member,
                id: 9
            }
        ));
        assert_eq!(ledger.snapshot().unwrap(), before);
    }

    #[test]
    fn test_missing_book_is_unavailable() {
        let ledger = ledger();
        let member = ledger
            .register_member(NewMember::new("Ann", "ann@x.com"))
            .unwrap();
        let err = ledger.issue_loan(BookId(4), member).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BookUnavailable);
    }

    #[test]
    fn test_book_checked_before_member() {
        let ledger = ledger();
        let err = ledger.issue_loan(BookId(1), MemberId(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BookUnavailable);
    }

    #[test]
    fn test_timestamps_come_from_clock() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = std::sync::Arc::new(FixedClock::new(start));
        let ledger = Ledger::with_clock(MemoryStore::new(), clock.clone());

        let book = ledger.add_book(NewBook::new("Dune", "Herbert", 1)).unwrap();
        let member = ledger
            .register_member(NewMember::new("Ann", "ann@x.com"))
            .unwrap();
        let txn = ledger.issue_loan(book, member).unwrap();
        clock.advance(Duration::days(21));
        ledger.return_loan(txn).unwrap();

        let record = ledger.transaction(txn).unwrap().unwrap();
        assert_eq!(record.issue_date, start);
        assert_eq!(record.return_date, Some(start + Duration::days(21)));
        assert_eq!(ledger.book(book).unwrap().unwrap().created_at, start);
    }

    #[test]
    fn test_remove_missing_member_does_not_commit() {
        let ledger = ledger();
        assert!(!ledger.remove_member(MemberId(3)).unwrap());
        assert_eq!(ledger.snapshot().unwrap().version, 0);
    }

    #[test]
    fn test_return_with_drifted_counts_is_clamped() {
        let now = Utc::now();
        let mut snapshot = Snapshot::default();
        snapshot.counters.next_book_id = 2;
        snapshot.counters.next_member_id = 2;
        snapshot.counters.next_transaction_id = 2;
        snapshot.books.push(Book {
            id: BookId(1),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            isbn: None,
            total_copies: 1,
            available_copies: 1,
            created_at: now,
        });
        snapshot.members.push(Member {
            id: MemberId(1),
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            phone: None,
            active_loan_count: 0,
            created_at: now,
        });
        snapshot.transactions.push(Transaction {
            id: TransactionId(1),
            book_id: BookId(1),
            book_title: "Dune".to_string(),
            member_id: MemberId(1),
            member_name: "Ann".to_string(),
            issue_date: now,
            return_date: None,
            status: LoanStatus::Issued,
        });
        let ledger = Ledger::new(MemoryStore::with_snapshot(snapshot));

        ledger.return_loan(TransactionId(1)).unwrap();

        let book = ledger.book(BookId(1)).unwrap().unwrap();
        assert_eq!(book.available_copies, 1);
        assert_eq!(ledger.member(MemberId(1)).unwrap().unwrap().active_loan_count, 0);
    }
}

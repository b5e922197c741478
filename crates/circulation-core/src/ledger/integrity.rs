//! Cross-collection invariant checks over a committed snapshot.

use std::collections::{HashMap, HashSet};

use crate::error::{LedgerError, Result};
use crate::ids::{BookId, MemberId};
use crate::storage::{LoanStatus, Snapshot};

/// Verify every ledger invariant, reporting the first violation found.
///
/// Checks:
/// - `available_copies <= total_copies` for every book
/// - checked-out copies equal open loans for every existing book
/// - `active_loan_count` equals open loans for every existing member
/// - member emails are unique
/// - ids are unique and below their counter
/// - return dates are present exactly on returned transactions
pub fn check(snapshot: &Snapshot) -> Result<()> {
    let mut open_by_book: HashMap<BookId, u64> = HashMap::new();
    let mut open_by_member: HashMap<MemberId, u64> = HashMap::new();
    let mut txn_ids = HashSet::new();

    for txn in &snapshot.transactions {
        if !txn_ids.insert(txn.id) {
            return Err(violation(format!("duplicate transaction id {}", txn.id)));
        }
        if txn.id.get() >= snapshot.counters.next_transaction_id {
            return Err(violation(format!(
                "transaction id {} not below counter {}",
                txn.id, snapshot.counters.next_transaction_id
            )));
        }
        match (txn.status, txn.return_date.is_some()) {
            (LoanStatus::Issued, false) => {
                *open_by_book.entry(txn.book_id).or_default() += 1;
                *open_by_member.entry(txn.member_id).or_default() += 1;
            }
            (LoanStatus::Returned, true) => {}
            (LoanStatus::Issued, true) => {
                return Err(violation(format!(
                    "issued transaction {} has a return date",
                    txn.id
                )))
            }
            (LoanStatus::Returned, false) => {
                return Err(violation(format!(
                    "returned transaction {} has no return date",
                    txn.id
                )))
            }
        }
    }

    let mut book_ids = HashSet::new();
    for book in &snapshot.books {
        if !book_ids.insert(book.id) {
            return Err(violation(format!("duplicate book id {}", book.id)));
        }
        if book.id.get() >= snapshot.counters.next_book_id {
            return Err(violation(format!(
                "book id {} not below counter {}",
                book.id, snapshot.counters.next_book_id
            )));
        }
        if book.available_copies > book.total_copies {
            return Err(violation(format!(
                "book {} has {} available of {} total",
                book.id, book.available_copies, book.total_copies
            )));
        }
        let open = open_by_book.get(&book.id).copied().unwrap_or(0);
        if u64::from(book.checked_out()) != open {
            return Err(violation(format!(
                "book {} has {} copies out but {} open loans",
                book.id,
                book.checked_out(),
                open
            )));
        }
    }

    let mut member_ids = HashSet::new();
    let mut emails = HashSet::new();
    for member in &snapshot.members {
        if !member_ids.insert(member.id) {
            return Err(violation(format!("duplicate member id {}", member.id)));
        }
        if member.id.get() >= snapshot.counters.next_member_id {
            return Err(violation(format!(
                "member id {} not below counter {}",
                member.id, snapshot.counters.next_member_id
            )));
        }
        if !emails.insert(member.email.as_str()) {
            return Err(violation(format!("duplicate email {}", member.email)));
        }
        let open = open_by_member.get(&member.id).copied().unwrap_or(0);
        if u64::from(member.active_loan_count) != open {
            return Err(violation(format!(
                "member {} has active_loan_count {} but {} open loans",
                member.id, member.active_loan_count, open
            )));
        }
    }

    Ok(())
}

fn violation(message: String) -> LedgerError {
    LedgerError::Integrity(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{Counters, TransactionId};
    use crate::storage::{Book, Member, Transaction};
    use chrono::Utc;

    fn consistent() -> Snapshot {
        let now = Utc::now();
        Snapshot {
            version: 3,
            books: vec![Book {
                id: BookId(1),
                title: "Dune".to_string(),
                author: "Herbert".to_string(),
                isbn: None,
                total_copies: 2,
                available_copies: 1,
                created_at: now,
            }],
            members: vec![Member {
                id: MemberId(1),
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
                phone: None,
                active_loan_count: 1,
                created_at: now,
            }],
            transactions: vec![Transaction {
                id: TransactionId(1),
                book_id: BookId(1),
                book_title: "Dune".to_string(),
                member_id: MemberId(1),
                member_name: "Ann".to_string(),
                issue_date: now,
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
    fn test_consistent_snapshot_passes() {
        check(&consistent()).unwrap();
        check(&Snapshot::default()).unwrap();
    }

    #[test]
    fn test_copies_out_without_loan_fails() {
        let mut snapshot = consistent();
        snapshot.books[0].available_copies = 0;
        assert!(matches!(check(&snapshot), Err(LedgerError::Integrity(_))));
    }

    #[test]
    fn test_member_count_drift_fails() {
        let mut snapshot = consistent();
        snapshot.members[0].active_loan_count = 2;
        assert!(check(&snapshot).is_err());
    }

    #[test]
    fn test_counter_behind_ids_fails() {
        let mut snapshot = consistent();
        snapshot.counters.next_book_id = 1;
        assert!(check(&snapshot).is_err());
    }

    #[test]
    fn test_loans_of_removed_entities_are_ignored() {
        let mut snapshot = consistent();
        snapshot.books.clear();
        snapshot.members.clear();
        check(&snapshot).unwrap();
    }
}

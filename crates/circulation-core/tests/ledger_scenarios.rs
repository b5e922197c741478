use circulation_core::storage::{LoanStatus, MemoryStore, NewBook, NewMember, TransactionFilter};
use circulation_core::{BookId, ErrorKind, Ledger, LedgerError, MemberId, TransactionId};

fn assert_invariants(ledger: &Ledger<MemoryStore>) {
    ledger
        .check_integrity()
        .expect("ledger invariants should hold");
}

#[test]
fn test_issue_and_return_walkthrough() {
    let ledger = Ledger::new(MemoryStore::new());

    let book = ledger
        .add_book(NewBook::new("Dune", "Herbert", 2))
        .expect("add book");
    assert_eq!(book, BookId(1));
    assert_eq!(ledger.book(book).unwrap().unwrap().available_copies, 2);

    let ann = ledger
        .register_member(NewMember::new("Ann", "ann@x.com"))
        .expect("register member");
    assert_eq!(ann, MemberId(1));

    let first = ledger.issue_loan(book, ann).expect("first issue");
    assert_eq!(first, TransactionId(1));
    assert_eq!(ledger.book(book).unwrap().unwrap().available_copies, 1);
    assert_eq!(ledger.member(ann).unwrap().unwrap().active_loan_count, 1);
    assert_invariants(&ledger);

    let second = ledger.issue_loan(book, ann).expect("second issue");
    assert_eq!(second, TransactionId(2));
    assert_eq!(ledger.book(book).unwrap().unwrap().available_copies, 0);

    let err = ledger.issue_loan(book, ann).unwrap_err();
    assert!(matches!(err, LedgerError::BookUnavailable(1)));
    assert_invariants(&ledger);

    ledger.return_loan(first).expect("return");
    assert_eq!(ledger.book(book).unwrap().unwrap().available_copies, 1);
    assert_eq!(ledger.member(ann).unwrap().unwrap().active_loan_count, 1);
    let returned = ledger.transaction(first).unwrap().unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert!(returned.return_date.is_some());
    assert_invariants(&ledger);
}

#[test]
fn test_second_return_fails_and_freezes_record() {
    let ledger = Ledger::new(MemoryStore::new());
    let book = ledger.add_book(NewBook::new("Dune", "Herbert", 1)).unwrap();
    let ann = ledger
        .register_member(NewMember::new("Ann", "ann@x.com"))
        .unwrap();
    let txn = ledger.issue_loan(book, ann).unwrap();
    ledger.return_loan(txn).unwrap();

    let frozen = ledger.transaction(txn).unwrap().unwrap();
    let before = ledger.snapshot().unwrap();

    let err = ledger.return_loan(txn).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyReturned);
    assert_eq!(ledger.transaction(txn).unwrap().unwrap(), frozen);
    assert_eq!(ledger.snapshot().unwrap(), before);
    assert_eq!(ledger.book(book).unwrap().unwrap().available_copies, 1);
}

#[test]
fn test_return_unknown_transaction_is_not_found() {
    let ledger = Ledger::new(MemoryStore::new());
    let err = ledger.return_loan(TransactionId(77)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_remove_book_twice_succeeds() {
    let ledger = Ledger::new(MemoryStore::new());
    let book = ledger.add_book(NewBook::new("Dune", "Herbert", 1)).unwrap();

    assert!(ledger.remove_book(book).unwrap());
    assert!(!ledger.remove_book(book).unwrap());
    assert!(ledger.list_books().unwrap().is_empty());
}

#[test]
fn test_remove_member_twice_succeeds() {
    let ledger = Ledger::new(MemoryStore::new());
    let ann = ledger
        .register_member(NewMember::new("Ann", "ann@x.com"))
        .unwrap();

    assert!(ledger.remove_member(ann).unwrap());
    assert!(!ledger.remove_member(ann).unwrap());
}

#[test]
fn test_history_survives_removal_of_book_and_member() {
    let ledger = Ledger::new(MemoryStore::new());
    let book = ledger.add_book(NewBook::new("Dune", "Herbert", 1)).unwrap();
    let ann = ledger
        .register_member(NewMember::new("Ann", "ann@x.com"))
        .unwrap();
    let txn = ledger.issue_loan(book, ann).unwrap();
    let issued = ledger.transaction(txn).unwrap().unwrap();

    ledger.remove_book(book).unwrap();
    ledger.remove_member(ann).unwrap();
    assert_eq!(ledger.transaction(txn).unwrap().unwrap(), issued);
    assert_eq!(issued.book_title, "Dune");
    assert_eq!(issued.member_name, "Ann");

    // The loan can still be closed; there is nothing left to credit.
    ledger.return_loan(txn).unwrap();
    let closed = ledger.transaction(txn).unwrap().unwrap();
    assert_eq!(closed.status, LoanStatus::Returned);
    assert_eq!(closed.book_id, book);
    assert_eq!(closed.member_id, ann);
    ledger.check_integrity().unwrap();
}

#[test]
fn test_ids_are_never_reused_after_removal() {
    let ledger = Ledger::new(MemoryStore::new());
    let first = ledger.add_book(NewBook::new("Dune", "Herbert", 1)).unwrap();
    ledger.remove_book(first).unwrap();
    let second = ledger
        .add_book(NewBook::new("Emma", "Austen", 1))
        .unwrap();
    assert_eq!(second, BookId(2));

    let ann = ledger
        .register_member(NewMember::new("Ann", "ann@x.com"))
        .unwrap();
    ledger.remove_member(ann).unwrap();
    let ann_again = ledger
        .register_member(NewMember::new("Ann", "ann@x.com"))
        .unwrap();
    assert_eq!(ann_again, MemberId(2));
}

#[test]
fn test_conservation_across_many_members() {
    let ledger = Ledger::new(MemoryStore::new());
    let book = ledger.add_book(NewBook::new("Dune", "Herbert", 3)).unwrap();
    let members: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|name| {
            ledger
                .register_member(NewMember::new(*name, format!("{}@x.com", name)))
                .unwrap()
        })
        .collect();

    let loans: Vec<_> = members
        .iter()
        .map(|member| ledger.issue_loan(book, *member).unwrap())
        .collect();
    ledger.return_loan(loans[1]).unwrap();

    let open = ledger
        .list_transactions(&TransactionFilter::new().book(book).status(LoanStatus::Issued))
        .unwrap();
    let stored = ledger.book(book).unwrap().unwrap();
    assert_eq!(stored.checked_out() as usize, open.len());
    assert_eq!(open.len(), 2);

    let for_b = ledger
        .list_transactions(&TransactionFilter::new().member(members[1]))
        .unwrap();
    assert_eq!(for_b.len(), 1);
    assert_eq!(for_b[0].status, LoanStatus::Returned);
    assert_eq!(ledger.member(members[1]).unwrap().unwrap().active_loan_count, 0);
    ledger.check_integrity().unwrap();
}

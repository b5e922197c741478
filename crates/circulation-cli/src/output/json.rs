//! JSON output formatting.

use circulation_core::storage::{Book, Member, Transaction};

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Convert a book to JSON for output.
pub fn book_json(book: &Book) -> serde_json::Value {
    serde_json::json!({
        "id": book.id,
        "title": book.title,
        "author": book.author,
        "isbn": book.isbn,
        "total_copies": book.total_copies,
        "available_copies": book.available_copies,
        "created_at": book.created_at,
    })
}

/// Convert multiple books to a JSON array for output.
pub fn books_json(books: &[Book]) -> serde_json::Value {
    serde_json::Value::Array(books.iter().map(book_json).collect())
}

/// Convert a member to JSON for output.
pub fn member_json(member: &Member) -> serde_json::Value {
    serde_json::json!({
        "id": member.id,
        "name": member.name,
        "email": member.email,
        "phone": member.phone,
        "active_loan_count": member.active_loan_count,
        "created_at": member.created_at,
    })
}

pub fn members_json(members: &[Member]) -> serde_json::Value {
    serde_json::Value::Array(members.iter().map(member_json).collect())
}

/// Convert a transaction to JSON for output.
pub fn transaction_json(txn: &Transaction) -> serde_json::Value {
    serde_json::json!({
        "id": txn.id,
        "book_id": txn.book_id,
        "book_title": txn.book_title,
        "member_id": txn.member_id,
        "member_name": txn.member_name,
        "issue_date": txn.issue_date,
        "return_date": txn.return_date,
        "status": txn.status,
    })
}

pub fn transactions_json(transactions: &[Transaction]) -> serde_json::Value {
    serde_json::Value::Array(transactions.iter().map(transaction_json).collect())
}

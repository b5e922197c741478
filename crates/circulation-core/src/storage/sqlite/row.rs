//! Row types for database queries.

use chrono::{DateTime, Utc};

use crate::error::{LedgerError, Result};
use crate::ids::{BookId, MemberId, TransactionId};
use crate::storage::types::{Book, LoanStatus, Member, Transaction};

/// Raw row data from the books table, before parsing into domain types.
#[derive(Debug)]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub total_copies: i64,
    pub available_copies: i64,
    pub created_at: String,
}

/// Raw row data from the members table.
#[derive(Debug)]
pub struct MemberRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub active_loan_count: i64,
    pub created_at: String,
}

/// Raw row data from the transactions table.
#[derive(Debug)]
pub struct TransactionRow {
    pub id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub member_id: i64,
    pub member_name: String,
    pub issue_date: String,
    pub return_date: Option<String>,
    pub status: String,
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| LedgerError::StoreUnavailable(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

pub fn to_u64(value: i64, column: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| LedgerError::StoreUnavailable(format!("Negative value in {}", column)))
}

pub fn to_u32(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| LedgerError::StoreUnavailable(format!("Out of range value in {}", column)))
}

pub fn to_i64(value: u64, column: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| LedgerError::StoreUnavailable(format!("Value too large for {}", column)))
}

impl TryFrom<BookRow> for Book {
    type Error = LedgerError;

    fn try_from(row: BookRow) -> Result<Self> {
        Ok(Book {
            id: BookId(to_u64(row.id, "books.id")?),
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            total_copies: to_u32(row.total_copies, "books.total_copies")?,
            available_copies: to_u32(row.available_copies, "books.available_copies")?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

impl TryFrom<MemberRow> for Member {
    type Error = LedgerError;

    fn try_from(row: MemberRow) -> Result<Self> {
        Ok(Member {
            id: MemberId(to_u64(row.id, "members.id")?),
            name: row.name,
            email: row.email,
            phone: row.phone,
            active_loan_count: to_u32(row.active_loan_count, "members.active_loan_count")?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = LedgerError;

    fn try_from(row: TransactionRow) -> Result<Self> {
        let status: LoanStatus = row.status.parse().map_err(|_| {
            LedgerError::StoreUnavailable(format!("Invalid loan status: {}", row.status))
        })?;
        let return_date = row
            .return_date
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        Ok(Transaction {
            id: TransactionId(to_u64(row.id, "transactions.id")?),
            book_id: BookId(to_u64(row.book_id, "transactions.book_id")?),
            book_title: row.book_title,
            member_id: MemberId(to_u64(row.member_id, "transactions.member_id")?),
            member_name: row.member_name,
            issue_date: parse_timestamp(&row.issue_date)?,
            return_date,
            status,
        })
    }
}

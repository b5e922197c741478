//! Core data types for the ledger dataset.
//!
//! Books, members and transactions are stored together in one [`Snapshot`]
//! because issue and return touch all three at once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BookId, Counters, MemberId, TransactionId};

/// A catalogued title and its copy counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub total_copies: u32,
    /// Copies currently on the shelf (never above `total_copies`)
    pub available_copies: u32,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Copies currently out on loan.
    pub fn checked_out(&self) -> u32 {
        self.total_copies.saturating_sub(self.available_copies)
    }
}

/// A registered borrower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Number of this member's transactions in state `issued`
    pub active_loan_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Loan state. A transaction moves from `Issued` to `Returned` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Issued,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Issued => "issued",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = crate::error::LedgerError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s {
            "issued" => Ok(LoanStatus::Issued),
            "returned" => Ok(LoanStatus::Returned),
            other => Err(crate::error::LedgerError::invalid(format!(
                "Unknown loan status: {} (expected issued or returned)",
                other
            ))),
        }
    }
}

/// One loan of one copy.
///
/// `book_title` and `member_name` are captured at issue time so the history
/// stays readable after the book or member is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub book_id: BookId,
    pub book_title: String,
    pub member_id: MemberId,
    pub member_name: String,
    pub issue_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
}

impl Transaction {
    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::Issued
    }
}

/// The whole ledger dataset as of one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Commit sequence number; 0 for a store that was never written
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub counters: Counters,
}

impl Snapshot {
    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn book_mut(&mut self, id: BookId) -> Option<&mut Book> {
        self.books.iter_mut().find(|book| book.id == id)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut Member> {
        self.members.iter_mut().find(|member| member.id == id)
    }

    pub fn member_by_email(&self, email: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.email == email)
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: TransactionId) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    /// Transactions matching `filter`, oldest first.
    pub fn transactions_matching(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        let matching = self
            .transactions
            .iter()
            .filter(|txn| filter.matches(txn))
            .cloned();
        match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }
}

/// Input for registering a new book.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub copies: u32,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>, copies: u32) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: None,
            copies,
        }
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }
}

/// Input for registering a new member.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl NewMember {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Filter for querying transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub book_id: Option<BookId>,
    pub member_id: Option<MemberId>,
    pub status: Option<LoanStatus>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(mut self, id: BookId) -> Self {
        self.book_id = Some(id);
        self
    }

    pub fn member(mut self, id: MemberId) -> Self {
        self.member_id = Some(id);
        self
    }

    pub fn status(mut self, status: LoanStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        self.book_id.map_or(true, |id| txn.book_id == id)
            && self.member_id.map_or(true, |id| txn.member_id == id)
            && self.status.map_or(true, |status| txn.status == status)
    }
}

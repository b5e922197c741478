//! Output formatting helpers for the CLI.
//!
//! This module provides formatting utilities for displaying books,
//! members and transactions in various formats (JSON, table, plain text).

mod json;
mod text;

// Re-export public API
pub use json::{
    book_json, books_json, member_json, members_json, print_json, transaction_json,
    transactions_json,
};
pub use text::{
    print_book, print_book_list, print_member, print_member_list, print_transaction,
    print_transaction_list,
};

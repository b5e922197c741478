//! Text and table output formatting.

use chrono::{DateTime, Utc};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use circulation_core::storage::{Book, Member, Transaction};

use crate::helpers::OutputFormat;

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Render rows as a bordered table, or space-separated lines without a
/// header in plain mode.
fn render(format: OutputFormat, headers: &[&str], rows: Vec<Vec<String>>) -> String {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(headers.to_vec());
            for row in rows {
                table.add_row(row);
            }
            table.to_string()
        }
        OutputFormat::Plain => rows
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn print_rows(format: OutputFormat, headers: &[&str], rows: Vec<Vec<String>>, empty: &str) {
    if rows.is_empty() {
        if format == OutputFormat::Table {
            println!("{}", empty);
        }
        return;
    }
    println!("{}", render(format, headers, rows));
}

pub fn print_book_list(books: &[Book], format: OutputFormat) {
    let rows = books
        .iter()
        .map(|book| {
            vec![
                book.id.to_string(),
                book.title.clone(),
                book.author.clone(),
                format!("{}/{}", book.available_copies, book.total_copies),
            ]
        })
        .collect();
    print_rows(
        format,
        &["ID", "TITLE", "AUTHOR", "AVAILABLE"],
        rows,
        "No books.",
    );
}

pub fn print_book(book: &Book) {
    println!("ID: {}", book.id);
    println!("Title: {}", book.title);
    println!("Author: {}", book.author);
    if let Some(isbn) = &book.isbn {
        println!("ISBN: {}", isbn);
    }
    println!(
        "Copies: {} available of {} ({} on loan)",
        book.available_copies,
        book.total_copies,
        book.checked_out()
    );
    println!("Added: {}", format_datetime(&book.created_at));
}

pub fn print_member_list(members: &[Member], format: OutputFormat) {
    let rows = members
        .iter()
        .map(|member| {
            vec![
                member.id.to_string(),
                member.name.clone(),
                member.email.clone(),
                member.active_loan_count.to_string(),
            ]
        })
        .collect();
    print_rows(
        format,
        &["ID", "NAME", "EMAIL", "LOANS"],
        rows,
        "No members.",
    );
}

pub fn print_member(member: &Member) {
    println!("ID: {}", member.id);
    println!("Name: {}", member.name);
    println!("Email: {}", member.email);
    if let Some(phone) = &member.phone {
        println!("Phone: {}", phone);
    }
    println!("Active loans: {}", member.active_loan_count);
    println!("Joined: {}", format_datetime(&member.created_at));
}

pub fn print_transaction_list(transactions: &[Transaction], format: OutputFormat) {
    let rows = transactions
        .iter()
        .map(|txn| {
            vec![
                txn.id.to_string(),
                txn.status.to_string(),
                txn.book_id.to_string(),
                txn.book_title.clone(),
                txn.member_id.to_string(),
                txn.member_name.clone(),
                format_datetime(&txn.issue_date),
                txn.return_date
                    .as_ref()
                    .map(format_datetime)
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_rows(
        format,
        &[
            "ID", "STATUS", "BOOK", "TITLE", "MEMBER", "NAME", "ISSUED", "RETURNED",
        ],
        rows,
        "No transactions.",
    );
}

pub fn print_transaction(txn: &Transaction) {
    println!("ID: {}", txn.id);
    println!("Status: {}", txn.status);
    println!("Book: {} ({})", txn.book_id, txn.book_title);
    println!("Member: {} ({})", txn.member_id, txn.member_name);
    println!("Issued: {}", format_datetime(&txn.issue_date));
    if let Some(returned) = &txn.return_date {
        println!("Returned: {}", format_datetime(returned));
    }
}

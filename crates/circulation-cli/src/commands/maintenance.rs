use circulation_core::storage::LoanStatus;
use circulation_core::ErrorKind;

use crate::app::AppContext;
use crate::errors::CliError;
use crate::output::print_json;

pub fn handle_status(ctx: &AppContext) -> anyhow::Result<()> {
    let target = ctx.store_target()?;
    let ledger = ctx.open_ledger()?;
    let snapshot = ledger.snapshot()?;

    let total_copies: u64 = snapshot.books.iter().map(|b| u64::from(b.total_copies)).sum();
    let available: u64 = snapshot
        .books
        .iter()
        .map(|b| u64::from(b.available_copies))
        .sum();
    let open_loans = snapshot
        .transactions
        .iter()
        .filter(|t| t.status == LoanStatus::Issued)
        .count();
    let returned = snapshot.transactions.len() - open_loans;

    if ctx.json() {
        return print_json(&serde_json::json!({
            "store": target.path,
            "backend": ledger.store().backend(),
            "version": snapshot.version,
            "books": snapshot.books.len(),
            "total_copies": total_copies,
            "available_copies": available,
            "members": snapshot.members.len(),
            "open_loans": open_loans,
            "returned_loans": returned,
            "counters": snapshot.counters,
        }));
    }

    if ctx.quiet() {
        return Ok(());
    }
    println!("Store: {} ({})", target.path.display(), ledger.store().backend());
    println!("Version: {}", snapshot.version);
    println!(
        "Books: {} ({} of {} copies on the shelf)",
        snapshot.books.len(),
        available,
        total_copies
    );
    println!("Members: {}", snapshot.members.len());
    println!("Loans: {} open, {} returned", open_loans, returned);
    Ok(())
}

pub fn handle_check(ctx: &AppContext) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    match ledger.check_integrity() {
        Ok(()) => {
            if ctx.json() {
                return print_json(&serde_json::json!({ "ok": true }));
            }
            if !ctx.quiet() {
                println!("Integrity check: OK");
                println!("- copy counts: OK");
                println!("- active loan counts: OK");
                println!("- member emails: OK");
                println!("- id counters: OK");
            }
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::Integrity => {
            eprintln!("Integrity check: FAILED");
            eprintln!("- error: {}", err);
            eprintln!("Hint: Restore the store from a backup before issuing more loans.");
            Err(CliError::IntegrityFailed(err.to_string()).into())
        }
        Err(err) => Err(err.into()),
    }
}

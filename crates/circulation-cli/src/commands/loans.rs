use circulation_core::storage::TransactionFilter;
use circulation_core::{BookId, Entity, LedgerError, MemberId, TransactionId};

use crate::app::AppContext;
use crate::cli::{IdArg, LoanCommand, LoanIssueArgs, LoanListArgs};
use crate::helpers::parse_loan_status;
use crate::output::{
    print_json, print_transaction, print_transaction_list, transaction_json, transactions_json,
};

pub fn handle_loan(ctx: &AppContext, command: &LoanCommand) -> anyhow::Result<()> {
    match command {
        LoanCommand::Issue(args) => handle_issue(ctx, args),
        LoanCommand::Return(args) => handle_return(ctx, args),
        LoanCommand::List(args) => handle_list(ctx, args),
        LoanCommand::Show(args) => handle_show(ctx, args),
    }
}

fn handle_issue(ctx: &AppContext, args: &LoanIssueArgs) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    let id = ledger.issue_loan(BookId(args.book), MemberId(args.member))?;

    if ctx.json() {
        let txn = ledger
            .transaction(id)?
            .ok_or_else(|| LedgerError::not_found(Entity::Transaction, id))?;
        return print_json(&transaction_json(&txn));
    }
    if ctx.quiet() {
        println!("{}", id);
    } else {
        println!(
            "Issued loan {}: book {} to member {}",
            id, args.book, args.member
        );
    }
    Ok(())
}

fn handle_return(ctx: &AppContext, args: &IdArg) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    let id = TransactionId(args.id);
    ledger.return_loan(id)?;

    if ctx.json() {
        let txn = ledger
            .transaction(id)?
            .ok_or_else(|| LedgerError::not_found(Entity::Transaction, id))?;
        return print_json(&transaction_json(&txn));
    }
    if !ctx.quiet() {
        println!("Returned loan {}", id);
    }
    Ok(())
}

fn handle_list(ctx: &AppContext, args: &LoanListArgs) -> anyhow::Result<()> {
    let format = ctx.output_format()?;
    let mut filter = TransactionFilter::new();
    if let Some(book) = args.book {
        filter = filter.book(BookId(book));
    }
    if let Some(member) = args.member {
        filter = filter.member(MemberId(member));
    }
    if let Some(status) = parse_loan_status(args.status.as_deref())? {
        filter = filter.status(status);
    }
    if let Some(limit) = args.limit {
        filter = filter.limit(limit);
    }

    let ledger = ctx.open_ledger()?;
    let transactions = ledger.list_transactions(&filter)?;

    if ctx.json() {
        return print_json(&transactions_json(&transactions));
    }
    print_transaction_list(&transactions, format);
    Ok(())
}

fn handle_show(ctx: &AppContext, args: &IdArg) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    let txn = ledger
        .transaction(TransactionId(args.id))?
        .ok_or_else(|| LedgerError::not_found(Entity::Transaction, args.id))?;

    if ctx.json() {
        return print_json(&transaction_json(&txn));
    }
    print_transaction(&txn);
    Ok(())
}

use circulation_core::storage::NewBook;
use circulation_core::{BookId, Entity, LedgerError};

use crate::app::AppContext;
use crate::cli::{BookAddArgs, BookCommand, BookListArgs, IdArg};
use crate::output::{book_json, books_json, print_book, print_book_list, print_json};

pub fn handle_book(ctx: &AppContext, command: &BookCommand) -> anyhow::Result<()> {
    match command {
        BookCommand::Add(args) => handle_add(ctx, args),
        BookCommand::Remove(args) => handle_remove(ctx, args),
        BookCommand::List(args) => handle_list(ctx, args),
        BookCommand::Show(args) => handle_show(ctx, args),
    }
}

fn handle_add(ctx: &AppContext, args: &BookAddArgs) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    let mut new_book = NewBook::new(&args.title, &args.author, args.copies);
    if let Some(isbn) = &args.isbn {
        new_book = new_book.with_isbn(isbn);
    }
    let id = ledger.add_book(new_book)?;

    if ctx.json() {
        let book = ledger
            .book(id)?
            .ok_or_else(|| LedgerError::not_found(Entity::Book, id))?;
        return print_json(&book_json(&book));
    }
    if ctx.quiet() {
        println!("{}", id);
    } else {
        println!("Added book {}: {}", id, args.title);
    }
    Ok(())
}

fn handle_remove(ctx: &AppContext, args: &IdArg) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    let removed = ledger.remove_book(BookId(args.id))?;

    if ctx.json() {
        return print_json(&serde_json::json!({ "id": args.id, "removed": removed }));
    }
    if !ctx.quiet() {
        if removed {
            println!("Removed book {}", args.id);
        } else {
            println!("Book {} was already absent", args.id);
        }
    }
    Ok(())
}

fn handle_list(ctx: &AppContext, args: &BookListArgs) -> anyhow::Result<()> {
    let format = ctx.output_format()?;
    let ledger = ctx.open_ledger()?;
    let mut books = ledger.list_books()?;
    if args.available {
        books.retain(|book| book.available_copies > 0);
    }

    if ctx.json() {
        return print_json(&books_json(&books));
    }
    print_book_list(&books, format);
    Ok(())
}

fn handle_show(ctx: &AppContext, args: &IdArg) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    let book = ledger
        .book(BookId(args.id))?
        .ok_or_else(|| LedgerError::not_found(Entity::Book, args.id))?;

    if ctx.json() {
        return print_json(&book_json(&book));
    }
    print_book(&book);
    Ok(())
}

use circulation_core::storage::NewMember;
use circulation_core::{Entity, LedgerError, MemberId};

use crate::app::AppContext;
use crate::cli::{IdArg, MemberAddArgs, MemberCommand};
use crate::output::{member_json, members_json, print_json, print_member, print_member_list};

pub fn handle_member(ctx: &AppContext, command: &MemberCommand) -> anyhow::Result<()> {
    match command {
        MemberCommand::Add(args) => handle_add(ctx, args),
        MemberCommand::Remove(args) => handle_remove(ctx, args),
        MemberCommand::List => handle_list(ctx),
        MemberCommand::Show(args) => handle_show(ctx, args),
    }
}

fn handle_add(ctx: &AppContext, args: &MemberAddArgs) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    let mut new_member = NewMember::new(&args.name, &args.email);
    if let Some(phone) = &args.phone {
        new_member = new_member.with_phone(phone);
    }
    let id = ledger.register_member(new_member)?;

    if ctx.json() {
        let member = ledger
            .member(id)?
            .ok_or_else(|| LedgerError::not_found(Entity::Member, id))?;
        return print_json(&member_json(&member));
    }
    if ctx.quiet() {
        println!("{}", id);
    } else {
        println!("Registered member {}: {}", id, args.name);
    }
    Ok(())
}

fn handle_remove(ctx: &AppContext, args: &IdArg) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    let removed = ledger.remove_member(MemberId(args.id))?;

    if ctx.json() {
        return print_json(&serde_json::json!({ "id": args.id, "removed": removed }));
    }
    if !ctx.quiet() {
        if removed {
            println!("Removed member {}", args.id);
        } else {
            println!("Member {} was already absent", args.id);
        }
    }
    Ok(())
}

fn handle_list(ctx: &AppContext) -> anyhow::Result<()> {
    let format = ctx.output_format()?;
    let ledger = ctx.open_ledger()?;
    let members = ledger.list_members()?;

    if ctx.json() {
        return print_json(&members_json(&members));
    }
    print_member_list(&members, format);
    Ok(())
}

fn handle_show(ctx: &AppContext, args: &IdArg) -> anyhow::Result<()> {
    let ledger = ctx.open_ledger()?;
    let member = ledger
        .member(MemberId(args.id))?
        .ok_or_else(|| LedgerError::not_found(Entity::Member, args.id))?;

    if ctx.json() {
        return print_json(&member_json(&member));
    }
    print_member(&member);
    Ok(())
}

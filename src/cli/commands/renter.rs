use crate::cli::args::CommandArgs;
use crate::cli::commands::CommandDefinition;
use crate::cli::core::{parse_date, parse_non_negative, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::core::services::RenterService;
use crate::ledger::{NewRenter, RenterPatch};

const PROFILE_OPTIONS: &[&str] = &["phone", "email", "advance", "lease"];
const EDIT_OPTIONS: &[&str] = &["name", "phone", "email", "unit", "rent", "advance", "lease"];

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "renters",
            "List renters, active first",
            "renters",
            cmd_list,
        ),
        CommandDefinition::new(
            "add-renter",
            "Register a renter",
            "add-renter <name> <unit> <monthly_rent> [--phone P] [--email E] [--advance AMOUNT] [--lease DATE]",
            cmd_add,
        ),
        CommandDefinition::new(
            "edit-renter",
            "Update a renter profile or advance credit",
            "edit-renter <renter> [--name N] [--phone P] [--email E] [--unit U] [--rent AMOUNT] [--advance AMOUNT] [--lease DATE]",
            cmd_edit,
        ),
        CommandDefinition::new(
            "toggle-renter",
            "Switch a renter between active and inactive",
            "toggle-renter <renter>",
            cmd_toggle,
        ),
        CommandDefinition::new(
            "delete-renter",
            "Delete a renter and all of their invoices",
            "delete-renter <renter>",
            cmd_delete,
        ),
    ]
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    CommandArgs::parse(args, &[], &[])?.at_most(0)?;
    let renters = RenterService::sorted_for_display(context.manager.book());
    if renters.is_empty() {
        io::print_info("No renters yet. Use `add-renter` to register one.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = renters
        .iter()
        .map(|renter| {
            vec![
                renter.short_id(),
                renter.name.clone(),
                renter.unit_number.clone(),
                context.money(renter.monthly_rent),
                context.money(renter.balance),
                context.money(renter.advance_balance),
                renter.status.to_string(),
            ]
        })
        .collect();
    output::section("Renters");
    output::table(
        &["ID", "Name", "Unit", "Rent", "Balance", "Advance", "Status"],
        &rows,
    );
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = CommandArgs::parse(args, PROFILE_OPTIONS, &[])?;
    args.at_most(3)?;
    let name = args.required(0, "name")?;
    let unit = args.required(1, "unit")?;
    let rent = parse_non_negative(args.required(2, "monthly_rent")?, "monthly rent")?;
    let lease_start = match args.value("lease") {
        Some(raw) => parse_date(raw)?,
        None => context.today(),
    };

    let mut details = NewRenter::new(name, unit, lease_start, rent);
    if let Some(phone) = args.value("phone") {
        details = details.with_phone(phone);
    }
    if let Some(email) = args.value("email") {
        details = details.with_email(email);
    }
    if let Some(raw) = args.value("advance") {
        details = details.with_advance(parse_non_negative(raw, "advance")?);
    }

    let id = context.manager.add_renter(details)?;
    io::print_success(format!(
        "Renter `{}` added ({}).",
        name,
        crate::ledger::renter::short_id(id)
    ));
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = CommandArgs::parse(args, EDIT_OPTIONS, &[])?;
    args.at_most(1)?;
    let id = context.resolve_renter(args.required(0, "renter")?)?;

    let patch = RenterPatch {
        name: args.value("name").map(str::to_string),
        phone: args.value("phone").map(str::to_string),
        email: args.value("email").map(|raw| {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }),
        unit_number: args.value("unit").map(str::to_string),
        lease_start_date: args.value("lease").map(parse_date).transpose()?,
        monthly_rent: args
            .value("rent")
            .map(|raw| parse_non_negative(raw, "monthly rent"))
            .transpose()?,
        advance_balance: args
            .value("advance")
            .map(|raw| parse_non_negative(raw, "advance"))
            .transpose()?,
    };
    if patch.is_empty() {
        return Err(CommandError::InvalidArguments(
            "nothing to change; pass at least one option".into(),
        ));
    }

    match context.manager.edit_renter(id, patch)? {
        Some(renter) => io::print_success(format!("Renter `{}` updated.", renter.name)),
        None => io::print_warning("Renter no longer exists."),
    }
    Ok(())
}

fn cmd_toggle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = CommandArgs::parse(args, &[], &[])?;
    args.at_most(1)?;
    let id = context.resolve_renter(args.required(0, "renter")?)?;
    if let Some(status) = context.manager.toggle_renter_status(id)? {
        io::print_success(format!("Renter is now {}.", status));
    }
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = CommandArgs::parse(args, &[], &[])?;
    args.at_most(1)?;
    let renter = context.manager.book().find_renter(args.required(0, "renter")?)?;
    let (id, name) = (renter.id, renter.name.clone());
    let invoices = context.manager.book().transactions_for(id).count();

    let prompt = format!("Delete `{}` and {} invoice(s)?", name, invoices);
    if !context.confirm(&prompt)? {
        io::print_info("Deletion cancelled.");
        return Ok(());
    }
    if let Some(purged) = context.manager.remove_renter(id)? {
        io::print_success(format!(
            "Renter `{}` deleted with {} invoice(s).",
            name, purged
        ));
    }
    Ok(())
}

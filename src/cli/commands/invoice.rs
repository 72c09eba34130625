use tracing::warn;

use crate::cli::args::CommandArgs;
use crate::cli::commands::CommandDefinition;
use crate::cli::core::{
    parse_date, parse_non_negative, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output;
use crate::ledger::{BillingMonth, InvoiceDraft, Transaction, TransactionPatch};

const INVOICE_OPTIONS: &[&str] = &["month", "due", "date", "note"];
const EDIT_OPTIONS: &[&str] = &["total", "paid", "note", "month", "due"];

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "invoices",
            "List invoices, newest first",
            "invoices [renter]",
            cmd_list,
        ),
        CommandDefinition::new(
            "invoice",
            "Bill a renter, optionally settling from advance credit",
            "invoice <renter> <amount> [--month YYYY-MM] [--due DATE] [--date DATE] [--note TEXT] [--use-advance]",
            cmd_create,
        ),
        CommandDefinition::new(
            "pay",
            "Record a payment against an invoice",
            "pay <invoice> <amount>",
            cmd_pay,
        ),
        CommandDefinition::new(
            "edit-invoice",
            "Change invoice amounts or details",
            "edit-invoice <invoice> [--total AMOUNT] [--paid AMOUNT] [--note TEXT] [--month YYYY-MM] [--due DATE]",
            cmd_edit,
        ),
        CommandDefinition::new(
            "delete-invoice",
            "Delete an invoice and reverse its effect on the renter",
            "delete-invoice <invoice>",
            cmd_delete,
        ),
    ]
}

pub(crate) fn invoice_rows(context: &ShellContext, invoices: &[&Transaction]) -> Vec<Vec<String>> {
    invoices
        .iter()
        .map(|txn| {
            let renter = context
                .manager
                .book()
                .renter(txn.renter_id)
                .map(|renter| renter.name.clone())
                .unwrap_or_else(|| "?".into());
            vec![
                txn.short_id(),
                renter,
                txn.for_month.to_string(),
                context.money(txn.total_amount),
                context.money(txn.paid_amount),
                context.money(txn.advance_used),
                context.date(txn.due_date),
                txn.derived_status().to_string(),
            ]
        })
        .collect()
}

pub(crate) const INVOICE_HEADERS: &[&str] = &[
    "ID", "Renter", "Month", "Total", "Paid", "Advance", "Due", "Status",
];

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = CommandArgs::parse(args, &[], &[])?;
    args.at_most(1)?;
    let owner = args
        .optional(0)
        .map(|key| context.resolve_renter(key))
        .transpose()?;
    let invoices: Vec<&Transaction> = context
        .manager
        .book()
        .transactions()
        .iter()
        .filter(|txn| owner.map_or(true, |id| txn.renter_id == id))
        .collect();
    if invoices.is_empty() {
        io::print_info("No invoices found.");
        return Ok(());
    }
    output::section("Invoices");
    output::table(INVOICE_HEADERS, &invoice_rows(context, &invoices));
    Ok(())
}

fn cmd_create(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = CommandArgs::parse(args, INVOICE_OPTIONS, &["use-advance"])?;
    args.at_most(2)?;
    let renter_id = context.resolve_renter(args.required(0, "renter")?)?;
    let amount = parse_non_negative(args.required(1, "amount")?, "amount")?;
    let date = match args.value("date") {
        Some(raw) => parse_date(raw)?,
        None => context.today(),
    };

    let mut draft = InvoiceDraft::new(renter_id, amount, date);
    if let Some(raw) = args.value("month") {
        draft = draft.for_month(parse_month(raw)?);
    }
    if let Some(raw) = args.value("due") {
        draft = draft.due_on(parse_date(raw)?);
    }
    if let Some(note) = args.value("note") {
        draft = draft.with_description(note);
    }
    draft.validate()?;

    let txn = context
        .manager
        .create_invoice(draft, args.switch("use-advance"))?;
    io::print_success(format!(
        "Invoice {} created for {} ({}).",
        txn.short_id(),
        context.money(txn.total_amount),
        txn.status
    ));
    if txn.advance_used.is_positive() {
        io::print_info(format!(
            "{} settled from advance credit.",
            context.money(txn.advance_used)
        ));
    }
    Ok(())
}

fn cmd_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = CommandArgs::parse(args, &[], &[])?;
    args.at_most(2)?;
    let id = context.resolve_invoice(args.required(0, "invoice")?)?;
    let amount = parse_non_negative(args.required(1, "amount")?, "amount")?;
    if amount.is_zero() {
        return Err(CommandError::InvalidArguments(
            "payment must be greater than zero".into(),
        ));
    }
    let current = context
        .manager
        .book()
        .transaction(id)
        .map(|txn| txn.paid_amount)
        .ok_or_else(|| CommandError::Message("invoice no longer exists".into()))?;
    let paid = current.checked_add(amount).ok_or_else(|| {
        CommandError::InvalidArguments("payment exceeds the largest supported amount".into())
    })?;
    apply_patch(context, id, TransactionPatch::payment(paid))
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = CommandArgs::parse(args, EDIT_OPTIONS, &[])?;
    args.at_most(1)?;
    let id = context.resolve_invoice(args.required(0, "invoice")?)?;
    let patch = TransactionPatch {
        total_amount: args
            .value("total")
            .map(|raw| parse_non_negative(raw, "total"))
            .transpose()?,
        paid_amount: args
            .value("paid")
            .map(|raw| parse_non_negative(raw, "paid amount"))
            .transpose()?,
        description: args.value("note").map(str::to_string),
        for_month: args.value("month").map(parse_month).transpose()?,
        due_date: args.value("due").map(parse_date).transpose()?,
    };
    if patch.is_empty() {
        return Err(CommandError::InvalidArguments(
            "nothing to change; pass at least one option".into(),
        ));
    }
    apply_patch(context, id, patch)
}

fn apply_patch(context: &mut ShellContext, id: uuid::Uuid, patch: TransactionPatch) -> CommandResult {
    let Some(existing) = context.manager.book().transaction(id) else {
        return Err(CommandError::Message("invoice no longer exists".into()));
    };
    let preview = patch.merged_with(existing);
    preview.validate_amounts()?;
    if preview.advance_used > preview.paid_amount {
        warn!(transaction = %id, "paid amount dropped below the advance applied at creation");
    }

    match context.manager.update_transaction(id, patch)? {
        Some(txn) => io::print_success(format!(
            "Invoice {} now {} paid of {} ({}).",
            txn.short_id(),
            context.money(txn.paid_amount),
            context.money(txn.total_amount),
            txn.status
        )),
        None => io::print_warning("Invoice no longer exists."),
    }
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = CommandArgs::parse(args, &[], &[])?;
    args.at_most(1)?;
    let id = context.resolve_invoice(args.required(0, "invoice")?)?;
    if !context.confirm("Delete this invoice and reverse its balance effect?")? {
        io::print_info("Deletion cancelled.");
        return Ok(());
    }
    if let Some(txn) = context.manager.delete_transaction(id)? {
        io::print_success(format!("Invoice {} deleted.", txn.short_id()));
        if txn.advance_used.is_positive() {
            io::print_info(format!(
                "{} returned to advance credit.",
                context.money(txn.advance_used)
            ));
        }
    }
    Ok(())
}

pub(crate) fn parse_month(raw: &str) -> Result<BillingMonth, CommandError> {
    raw.parse::<BillingMonth>().map_err(|_| {
        CommandError::InvalidArguments(format!("invalid month `{}` (use YYYY-MM)", raw))
    })
}

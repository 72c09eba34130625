use crate::cli::args::CommandArgs;
use crate::cli::commands::invoice::{invoice_rows, parse_month, INVOICE_HEADERS};
use crate::cli::commands::CommandDefinition;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::ledger::BillingMonth;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "statement",
            "Show a renter's balances and invoices",
            "statement <renter>",
            cmd_statement,
        ),
        CommandDefinition::new("stats", "Show dashboard totals", "stats", cmd_stats),
        CommandDefinition::new(
            "month",
            "Show billed and collected totals for a month",
            "month [YYYY-MM]",
            cmd_month,
        ),
        CommandDefinition::new(
            "audit",
            "Recompute balances and statuses from the invoices",
            "audit",
            cmd_audit,
        ),
    ]
}

fn cmd_statement(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = CommandArgs::parse(args, &[], &[])?;
    args.at_most(1)?;
    let id = context.resolve_renter(args.required(0, "renter")?)?;
    let statement = context
        .manager
        .statement(id)
        .ok_or_else(|| CommandError::Message("renter no longer exists".into()))?;
    let renter = statement.renter;

    output::section(format!("Statement: {}", renter.name));
    io::print_info(format!("  Unit        : {}", renter.unit_number));
    io::print_info(format!("  Status      : {}", renter.status));
    io::print_info(format!("  Lease start : {}", context.date(renter.lease_start_date)));
    io::print_info(format!("  Monthly rent: {}", context.money(renter.monthly_rent)));
    io::print_info(format!("  Balance due : {}", context.money(renter.balance)));
    io::print_info(format!("  Advance     : {}", context.money(renter.advance_balance)));
    io::print_info(format!(
        "  Open bills  : {}",
        statement.open_invoices().count()
    ));
    if statement.transactions.is_empty() {
        io::print_info("No invoices issued yet.");
    } else {
        output::table(INVOICE_HEADERS, &invoice_rows(context, &statement.transactions));
    }
    Ok(())
}

fn cmd_stats(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    CommandArgs::parse(args, &[], &[])?.at_most(0)?;
    let stats = context.manager.dashboard();
    output::section("Dashboard");
    io::print_info(format!("  Active renters   : {}", stats.total_renters));
    io::print_info(format!("  Inactive renters : {}", stats.inactive_renters));
    io::print_info(format!("  Occupancy        : {:.0}%", stats.occupancy_rate * 100.0));
    io::print_info(format!("  Pending amount   : {}", context.money(stats.pending_amount)));
    io::print_info(format!("  Advance held     : {}", context.money(stats.advance_held)));
    io::print_info(format!(
        "  Expected rent    : {}",
        context.money(stats.expected_monthly_rent)
    ));
    io::print_info(format!("  Open invoices    : {}", stats.open_invoices));
    Ok(())
}

fn cmd_month(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = CommandArgs::parse(args, &[], &[])?;
    args.at_most(1)?;
    let month = match args.optional(0) {
        Some(raw) => parse_month(raw)?,
        None => BillingMonth::containing(context.today()),
    };
    let summary = context.manager.month_collection(month);
    output::section(format!("Collections for {}", summary.month));
    io::print_info(format!("  Invoices     : {}", summary.invoice_count));
    io::print_info(format!("  Billed       : {}", context.money(summary.billed)));
    io::print_info(format!("  Collected    : {}", context.money(summary.collected)));
    io::print_info(format!("  From advance : {}", context.money(summary.from_advance)));
    io::print_info(format!("  Outstanding  : {}", context.money(summary.outstanding)));
    Ok(())
}

fn cmd_audit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    CommandArgs::parse(args, &[], &[])?.at_most(0)?;
    let report = context.manager.audit();
    if report.is_clean() {
        io::print_success("Ledger is consistent.");
        return Ok(());
    }
    io::print_warning(format!("{} issue(s) found:", report.issues.len()));
    for issue in &report.issues {
        io::print_info(format!("  - {}", issue));
    }
    Ok(())
}

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use workbench::{ComponentStatus, UninstallOutcome, UninstallSelection, Workbench};

use crate::Context;
use crate::cli::UninstallArgs;
use crate::progress;
use crate::ui;

fn open(ctx: &Context) -> Workbench {
    let pb = progress::spinner("Probing components...", ctx.quiet);
    let wb = Workbench::new(ctx.session.runner());
    pb.finish_and_clear();
    wb
}

fn print_status(statuses: &[ComponentStatus]) {
    for status in statuses {
        ui::component(status);
    }
}

fn print_advice(err: &workbench::Error) {
    let category = err.category();
    if category != workbench::ErrorCategory::Other {
        ui::kv("Cause", category.description());
    }
    ui::kv("Fix", category.advice());
}

pub fn check(ctx: &Context) -> Result<()> {
    let wb = open(ctx);
    let statuses = wb.status();

    ui::header("Workbench Components");
    print_status(&statuses);

    let missing = statuses.iter().filter(|s| !s.installed).count();
    println!();
    if missing == 0 {
        ui::success("All components installed");
    } else {
        ui::warn(&format!(
            "{} missing. Run {} to install.",
            ui::count(missing, "component"),
            "productionize setup".bold()
        ));
    }
    Ok(())
}

pub fn setup(ctx: &Context) -> Result<()> {
    let mut wb = open(ctx);
    let missing: Vec<_> = wb
        .status()
        .into_iter()
        .filter(|s| !s.installed)
        .map(|s| s.component)
        .collect();

    ui::header("Workbench Setup");
    if missing.is_empty() {
        print_status(&wb.status());
        println!();
        ui::success("Nothing to install");
        return Ok(());
    }

    for (i, component) in missing.iter().enumerate() {
        ui::step(
            i + 1,
            missing.len(),
            &format!("{} ({})", component, component.package()),
        );
    }

    let names: Vec<_> = missing.iter().map(|c| c.name()).collect();
    let result = progress::with_spinner(
        &format!("Installing {}", names.join(", ")),
        "Setup complete",
        ctx.quiet,
        || wb.setup(),
    );

    match result {
        Ok(statuses) => {
            println!();
            print_status(&statuses);
            Ok(())
        }
        Err(e) => {
            print_advice(&e);
            println!();
            print_status(&wb.status());
            Err(e).context("Setup stopped. Components installed so far were kept; run setup again after fixing the problem")
        }
    }
}

pub fn uninstall(ctx: &Context, args: UninstallArgs) -> Result<()> {
    let selection = args
        .remove
        .iter()
        .fold(UninstallSelection::new(), |s, &c| s.remove(c));
    let selection = args.keep.iter().fold(selection, |s, &c| s.keep(c));

    let mut wb = open(ctx);
    let plan = wb.removal_plan(&selection);

    ui::header("Workbench Uninstall");
    if plan.is_empty() {
        ui::info("Nothing to remove. Components installed before this run are kept.");
        ui::dim("Use --remove COMPONENT to remove one anyway.");
        return Ok(());
    }

    for component in &plan {
        println!("  {} {}", "-".red(), component);
    }
    println!();

    if !args.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Remove {}?", ui::count(plan.len(), "component")))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            ui::info("Aborted");
            return Ok(());
        }
    }

    let report = wb.uninstall(&selection);
    for (component, outcome) in &report.outcomes {
        match outcome {
            UninstallOutcome::Removed => ui::success(&format!("Removed {component}")),
            UninstallOutcome::Kept => ui::dim(&format!("Kept {component}")),
            UninstallOutcome::Failed(e) => {
                ui::error(&e.to_string());
                print_advice(e);
            }
        }
    }

    if !report.is_success() {
        bail!(
            "{} could not be removed",
            ui::count(report.failures().count(), "component")
        );
    }
    Ok(())
}

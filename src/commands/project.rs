use anyhow::{Context as _, Result};
use colored::Colorize;
use reconcile::kubectl::split_names;
use workbench::Workbench;

use crate::Context;
use crate::cli::ProjectCommand;
use crate::ui;

pub fn run(ctx: &Context, cmd: ProjectCommand) -> Result<()> {
    let mut wb = Workbench::new(ctx.session.runner());

    match cmd {
        ProjectCommand::Open { name } => {
            let project = wb
                .open_project(&name)
                .context("Is the cluster running? Check with `productionize cluster status`")?;
            ui::success(&format!("Opened project {}", project.as_str().bold()));
            if project.as_str() != name {
                ui::dim(&format!("'{name}' was normalized to '{project}'"));
            }
        }
        ProjectCommand::Delete { name, yes } => {
            if !yes {
                let confirmed = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete project '{name}' and every product deployed in it?"
                    ))
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
                if !confirmed {
                    ui::info("Aborted");
                    return Ok(());
                }
            }
            wb.delete_project(&name)?;
            ui::success(&format!("Deleted project {name}"));
        }
        ProjectCommand::List => {
            let namespaces = wb.list_namespaces()?;
            ui::header("Projects");
            if namespaces.is_empty() {
                ui::dim("No namespaces found");
            }
            for namespace in &namespaces {
                println!("  {namespace}");
            }
        }
        ProjectCommand::Products { name } => {
            let raw = wb.list_products(&name)?;
            let products = split_names(&raw);
            ui::header(&format!("Products in {name}"));
            if products.is_empty() {
                ui::dim("Nothing deployed");
            }
            for product in &products {
                println!("  {product}");
            }
            println!();
            ui::dim(&ui::count(products.len(), "product"));
        }
    }
    Ok(())
}

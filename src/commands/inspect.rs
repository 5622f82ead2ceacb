use anyhow::{Context as _, Result};
use colored::Colorize;
use workbench::{InspectReport, Workbench};

use crate::Context;
use crate::ui;

/// Namespaces the cluster creates for itself.
const SYSTEM_NAMESPACES: &[&str] = &["default", "kube-node-lease", "kube-public", "kube-system"];

fn is_project(namespace: &str) -> bool {
    !SYSTEM_NAMESPACES.contains(&namespace)
}

pub fn run(ctx: &Context, json: bool) -> Result<()> {
    let mut wb = Workbench::new(ctx.session.runner());

    // Projects opened by earlier runs only exist as namespaces.
    match wb.list_namespaces() {
        Ok(namespaces) => {
            for namespace in namespaces.iter().filter(|n| is_project(n)) {
                wb.track_project(namespace);
            }
        }
        Err(e) => log::warn!("Could not list projects: {e}"),
    }

    let report = wb.inspect();
    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{out}");
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &InspectReport) {
    ui::header("Workbench");
    for status in &report.components {
        ui::component(status);
    }

    ui::section("Cluster");
    ui::kv("Status", &ui::cluster_status(report.cluster).to_string());

    ui::section("Projects");
    if report.projects.is_empty() {
        ui::dim("No projects");
    }
    for project in &report.projects {
        println!(
            "  {} {}",
            project.project.bold(),
            format!("({})", ui::count(project.products.len(), "product")).dimmed()
        );
        for product in &project.products {
            println!("    {product}");
        }
    }

    println!();
    ui::info(&format!(
        "{} deployed across {}",
        ui::count(report.total_products(), "product"),
        ui::count(report.projects.len(), "project")
    ));
}

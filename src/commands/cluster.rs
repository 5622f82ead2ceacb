use anyhow::{Context as _, Result};
use workbench::{ClusterStatus, Workbench};

use crate::Context;
use crate::cli::ClusterCommand;
use crate::progress;
use crate::ui;

pub fn run(ctx: &Context, cmd: ClusterCommand) -> Result<()> {
    let mut wb = Workbench::new(ctx.session.runner());

    match cmd {
        ClusterCommand::Start {
            cpus,
            memory,
            driver,
        } => {
            let mut config = ctx.session.settings().cluster.to_config();
            if let Some(cpus) = cpus {
                config.cpus = cpus;
            }
            if let Some(memory) = memory {
                config.memory_mb = memory;
            }
            if let Some(driver) = driver {
                config.driver = driver;
            }

            progress::with_spinner(
                &format!(
                    "Starting cluster ({} CPUs, {} MB, {})",
                    config.cpus, config.memory_mb, config.driver
                ),
                "Cluster running",
                ctx.quiet,
                || wb.start_cluster(&config),
            )
            .context("Is the hypervisor installed? Run `productionize check`")?;
        }
        ClusterCommand::Stop => {
            progress::with_spinner("Stopping cluster", "Cluster stopped", ctx.quiet, || {
                wb.stop_cluster()
            })?;
        }
        ClusterCommand::Status => {
            let status = wb.cluster_status();
            ui::kv("Cluster", &ui::cluster_status(status).to_string());
            if status != ClusterStatus::Running {
                ui::dim("Start it with `productionize cluster start`");
            }
        }
    }
    Ok(())
}

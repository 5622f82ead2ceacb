use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use reconcile::BackendKind;

use crate::Context;
use crate::artifact::ServiceSpec;
use crate::cli::{DeleteArgs, DeployArgs, PrepareArgs};
use crate::config::Defaults;
use crate::lifecycle::Deployment;
use crate::paths;
use crate::progress;
use crate::ui;

/// Flags merged over the configured defaults.
struct Resolved {
    spec: ServiceSpec,
    product: String,
    project: String,
}

fn resolve(args: &PrepareArgs, defaults: &Defaults) -> Result<Resolved> {
    let spec = ServiceSpec::new(
        paths::expand(&args.source.to_string_lossy()),
        paths::expand(&args.requirements.to_string_lossy()),
        args.port.unwrap_or(defaults.port),
        args.runtime.as_deref().unwrap_or(&defaults.runtime),
    )?;
    Ok(Resolved {
        spec,
        product: args.product.clone().unwrap_or_else(|| defaults.product.clone()),
        project: args.project.clone().unwrap_or_else(|| defaults.project.clone()),
    })
}

fn prepare_into(deployment: &mut Deployment, args: &PrepareArgs, defaults: &Defaults) -> Result<()> {
    let resolved = resolve(args, defaults)?;
    let manifest = deployment
        .prepare(
            resolved.spec,
            Some(resolved.product.as_str()),
            Some(resolved.project.as_str()),
        )
        .context("Could not prepare the build manifest")?;
    ui::success(&format!("Wrote {}", manifest.path.display()));
    Ok(())
}

pub fn prepare(ctx: &Context, args: PrepareArgs) -> Result<()> {
    let mut deployment = Deployment::new(&ctx.session);
    prepare_into(&mut deployment, &args, &ctx.session.settings().defaults)?;

    if ctx.verbose > 0
        && let Some(manifest) = deployment.manifest()
    {
        println!();
        for line in manifest.contents.lines() {
            ui::dim(line);
        }
    }
    Ok(())
}

pub fn deploy(ctx: &Context, args: DeployArgs) -> Result<()> {
    let defaults = &ctx.session.settings().defaults;
    let mut deployment = Deployment::new(&ctx.session);

    ui::header("Deploy");
    prepare_into(&mut deployment, &args.prepare, defaults)?;
    ui::kv("Product", deployment.product().as_str());
    if args.backend == BackendKind::Cluster {
        ui::kv("Project", deployment.project().as_str());
    }

    progress::with_spinner(
        &format!("Deploying {}", deployment.product()),
        "Deployed",
        ctx.quiet,
        || deployment.deploy(args.backend).map(|_| ()),
    )
    .with_context(|| {
        format!(
            "Deployment left in state '{}'; fix the problem and deploy again",
            deployment.state()
        )
    })?;

    println!();
    if let Some(kind) = deployment.backend() {
        ui::kv("Backend", kind.as_str());
    }
    if let Some(image) = deployment.image() {
        ui::kv("Image", &image.to_string());
    }
    if let Some(address) = deployment.address() {
        ui::kv("Address", &address.bold().to_string());
    }

    let Some(registry) = args.push else {
        return Ok(());
    };
    let registry = match registry.trim() {
        "" => match defaults.registry.as_deref() {
            Some(configured) => configured.to_string(),
            None => bail!("--push needs a registry; pass one or set defaults.registry in config.toml"),
        },
        given => given.to_string(),
    };

    let pushed = progress::with_spinner(
        &format!("Pushing to {registry}"),
        "Pushed",
        ctx.quiet,
        || deployment.push(&registry),
    )
    .context("The service stays deployed; only the push failed")?;
    ui::kv("Pushed", &pushed.to_string());
    Ok(())
}

pub fn delete(ctx: &Context, args: DeleteArgs) -> Result<()> {
    let deployment = Deployment::new(&ctx.session);
    let report = deployment.delete(&args.product, &args.project, args.backend);

    for kind in report.removed() {
        ui::success(&format!("Deleted {kind} {}", report.target));
    }
    for kind in report.not_found() {
        ui::dim(&format!("{kind} {} not found", report.target));
    }
    if report.removed().is_empty() {
        ui::info(&format!(
            "Nothing to delete for {} on the {} backend",
            report.target, report.backend
        ));
    }
    Ok(())
}

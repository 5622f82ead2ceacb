use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use reconcile::BackendKind;
use std::path::PathBuf;
use workbench::Component;

#[derive(Parser)]
#[command(name = "productionize")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Set up a local cluster workbench and deploy services to it",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Working directory and build context (defaults to the current directory)
    #[arg(long, global = true, env = "PRODUCTIONIZE_WORKDIR")]
    pub workdir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show which workbench components are installed
    Check,

    /// Install missing components (docker, virtualbox, kubectl, minikube)
    Setup,

    /// Remove components installed by setup
    Uninstall(UninstallArgs),

    /// Start, stop or query the local cluster
    #[command(subcommand)]
    Cluster(ClusterCommand),

    /// Manage projects (cluster namespaces)
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Write the build manifest for a service
    Prepare(PrepareArgs),

    /// Prepare and deploy a service
    Deploy(DeployArgs),

    /// Delete a deployed product
    Delete(DeleteArgs),

    /// Show components, cluster state and deployed products
    Inspect {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Workbench
// ============================================================================

#[derive(Args)]
pub struct UninstallArgs {
    /// Remove this component even if it was installed before (repeatable)
    #[arg(long, value_name = "COMPONENT")]
    pub remove: Vec<Component>,

    /// Keep this component even if setup installed it (repeatable)
    #[arg(long, value_name = "COMPONENT")]
    pub keep: Vec<Component>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum ClusterCommand {
    /// Start the local cluster
    Start {
        /// CPUs for the cluster VM (default from settings)
        #[arg(long)]
        cpus: Option<u32>,

        /// Memory for the cluster VM in MB (default from settings)
        #[arg(long)]
        memory: Option<u32>,

        /// Hypervisor driver (default from settings)
        #[arg(long)]
        driver: Option<String>,
    },

    /// Stop the local cluster
    Stop,

    /// Show the local cluster state
    Status,
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Create a project namespace
    Open { name: String },

    /// Delete a project namespace and everything in it
    Delete {
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List project namespaces in the cluster
    List,

    /// List products deployed in a project
    Products { name: String },
}

// ============================================================================
// Deployment
// ============================================================================

#[derive(Args)]
pub struct PrepareArgs {
    /// Service entry point (copied to /app/main.py)
    #[arg(long, short = 's')]
    pub source: PathBuf,

    /// Dependency list installed with pip
    #[arg(long, short = 'r')]
    pub requirements: PathBuf,

    /// Port the service listens on (default from settings)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Python runtime version of the base image (default from settings)
    #[arg(long)]
    pub runtime: Option<String>,

    /// Product name (default from settings)
    #[arg(long)]
    pub product: Option<String>,

    /// Project the product belongs to (default from settings)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub prepare: PrepareArgs,

    /// Where to deploy: cluster or local
    #[arg(long, short = 'b', default_value_t = BackendKind::Cluster)]
    pub backend: BackendKind,

    /// Push the image to this registry after deploying
    #[arg(long, value_name = "REGISTRY", num_args = 0..=1, default_missing_value = "")]
    pub push: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Product to delete
    #[arg(long)]
    pub product: String,

    /// Project the product lives in
    #[arg(long)]
    pub project: String,

    /// Backend the product was deployed to (cluster or local)
    #[arg(long, short = 'b')]
    pub backend: Option<BackendKind>,
}

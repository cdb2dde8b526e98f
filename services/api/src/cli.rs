use crate::demo::{run_demo, DemoArgs};
use crate::server;
use campus_placement::error::AppError;
use campus_placement::workflows::placement::TenantScope;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Campus Placement Service",
    about = "Run the campus placement pipeline over HTTP or walk through a demo",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run an end-to-end demo: company registration, applications, rounds and an offer
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Student roster CSV to load into the student directory at startup
    #[arg(long, requires = "tenant")]
    pub(crate) students: Option<PathBuf>,
    /// Tenant that owns the imported roster
    #[arg(long, value_parser = parse_tenant, requires = "students")]
    pub(crate) tenant: Option<TenantScope>,
}

pub(crate) fn parse_tenant(raw: &str) -> Result<TenantScope, String> {
    TenantScope::new(raw).map_err(|err| err.to_string())
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Flags override the matching configuration file settings.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "compose-adapter")]
#[command(about = "Deploys docker-compose packages as resource groups over gRPC")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: compose-adapter.yml in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to serve on
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,

    /// Adapter root holding the packages/ directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Register with a process manager, optionally naming its host and this adapter's host
    #[arg(long, num_args = 0..=2, value_names = ["CONTROLLER", "COMPOSE"])]
    pub register_adapter: Option<Vec<String>>,
}

//! Command-line argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rootlink::DEFAULT_DEV_TOKEN;

use crate::output::OutputFormat;

/// Hub identity bootstrap and owner login for a Root authority
///
/// Provision subnet hubs and nodes with certificates, log the subnet owner
/// in with a device code, and make owner-scoped calls with a managed token.
#[derive(Parser, Debug)]
#[command(name = "rootlink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding node.toml and keys/
    #[arg(long, env = "ROOTLINK_BASE_DIR", global = true)]
    pub base_dir: Option<PathBuf>,

    /// Root authority base URL (overrides the one stored in node.toml)
    #[arg(long, env = "ROOTLINK_ROOT_URL", global = true)]
    pub root_url: Option<String>,

    /// Shared token written into a newly created node document
    #[arg(long, env = "ROOTLINK_TOKEN", global = true, default_value = DEFAULT_DEV_TOKEN)]
    pub default_token: String,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and change this node's identity
    Node(NodeArgs),

    /// Subnet hub provisioning
    Hub(HubArgs),

    /// Owner login against Root
    Root(RootArgs),

    /// Hubs attached to the owner account
    Hubs(HubsArgs),

    /// Certificate enrollment
    Pki(PkiArgs),

    /// Local configuration helpers
    Config(ConfigArgs),
}

// ============================================================================
// Node command
// ============================================================================

#[derive(Args, Debug)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommands,
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Show the node document (secrets masked)
    Show,

    /// Switch between hub and member
    Role {
        /// New role: hub or member
        role: String,

        /// Hub this member reports to (required when becoming a member)
        #[arg(long)]
        hub_url: Option<String>,

        /// Subnet to join
        #[arg(long)]
        subnet_id: Option<String>,
    },

    /// Obtain a node certificate from Root
    Register {
        /// One-time bootstrap token; without it the local hub credential is used
        #[arg(long)]
        token: Option<String>,

        /// Replace existing node credentials
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Hub command
// ============================================================================

#[derive(Args, Debug)]
pub struct HubArgs {
    #[command(subcommand)]
    pub command: HubCommands,
}

#[derive(Subcommand, Debug)]
pub enum HubCommands {
    /// Register a new subnet with this node as its hub
    Init {
        /// One-time bootstrap token issued by Root
        #[arg(long)]
        token: String,

        /// Display name of the subnet
        #[arg(long)]
        name: Option<String>,

        /// Replace existing hub credentials
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Root command
// ============================================================================

#[derive(Args, Debug)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: RootCommands,
}

#[derive(Subcommand, Debug)]
pub enum RootCommands {
    /// Log the subnet owner in with a device code
    Login,

    /// Show the identity behind the current owner token
    Whoami,

    /// Print a valid owner access token, refreshing it if needed
    Token,

    /// Forget the owner login
    Logout,
}

// ============================================================================
// Hubs command
// ============================================================================

#[derive(Args, Debug)]
pub struct HubsArgs {
    #[command(subcommand)]
    pub command: HubsCommands,
}

#[derive(Subcommand, Debug)]
pub enum HubsCommands {
    /// Replace the cached hub list with the one Root reports
    Sync,

    /// Attach a hub to the owner account
    Add {
        /// Hub to attach (defaults to this node)
        #[arg(long)]
        hub_id: Option<String>,
    },
}

// ============================================================================
// PKI command
// ============================================================================

#[derive(Args, Debug)]
pub struct PkiArgs {
    #[command(subcommand)]
    pub command: PkiCommands,
}

#[derive(Subcommand, Debug)]
pub enum PkiCommands {
    /// Submit a CSR for signing
    Enroll {
        /// PEM CSR file
        #[arg(long)]
        csr: PathBuf,

        /// Hub the certificate is issued for (defaults to this node)
        #[arg(long)]
        hub_id: Option<String>,

        /// Requested validity, e.g. 24h
        #[arg(long)]
        ttl: Option<String>,

        /// Write the issued certificate here instead of printing the response
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the node document path
    Path,
}

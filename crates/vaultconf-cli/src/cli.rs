use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vaultconf_kernel::ApplyOrder;
use vaultconf_schema::RecordKind;

#[derive(Parser)]
#[command(
    name = "vaultconf",
    about = "vaultconf: expand, flatten, and validate declarative access policy",
    version
)]
pub struct Cli {
    /// Path to vaultconf.toml (defaults to ./vaultconf.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Expand a configuration tree into wire JSON
    Expand {
        /// Record kind held by the input document
        #[arg(long)]
        kind: RecordKind,

        /// Input tree (JSON object)
        #[arg(long)]
        input: PathBuf,

        /// Resource kind whose rights catalog resolves permissions
        #[arg(long)]
        resource: Option<String>,

        /// Drop unknown rights instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Flatten wire JSON back into a configuration tree
    Flatten {
        /// Record kind held by the input document
        #[arg(long)]
        kind: RecordKind,

        /// Input wire JSON
        #[arg(long)]
        input: PathBuf,

        /// Resource kind whose rights catalog names permission rights
        #[arg(long)]
        resource: Option<String>,
    },

    /// Validate challenge rules given as a tree or as the wire envelope
    ValidateRules {
        /// Input tree or wire rules (JSON)
        #[arg(long)]
        input: PathBuf,

        /// Tree field holding the rules
        #[arg(long, default_value = "challenge_rule")]
        field: String,
    },

    /// Resolve a permission set against a resource kind's rights catalog
    ResolvePermissions {
        /// Resource kind (account, system, set, ...)
        #[arg(long)]
        resource: String,

        /// Input tree holding a `permission` set (JSON object)
        #[arg(long)]
        input: PathBuf,

        /// Drop unknown rights instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Compute the removals and additions between two versions of a set
    Reconcile {
        /// Previous set (JSON array)
        #[arg(long)]
        old: PathBuf,

        /// New set (JSON array)
        #[arg(long)]
        new: PathBuf,

        /// Identity fields for record elements (whole-value identity if omitted)
        #[arg(long, value_delimiter = ',')]
        identity: Vec<String>,

        /// Which half of the plan is applied first
        #[arg(long, value_enum, default_value_t = OrderArg::RemoveFirst)]
        order: OrderArg,
    },

    /// Print set identity hashes of records
    Hash {
        /// Records (JSON object or array of objects)
        #[arg(long)]
        input: PathBuf,

        /// Identity fields, comma-separated
        #[arg(long, value_delimiter = ',', required = true)]
        identity: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrderArg {
    RemoveFirst,
    AddFirst,
}

impl From<OrderArg> for ApplyOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::RemoveFirst => ApplyOrder::RemoveFirst,
            OrderArg::AddFirst => ApplyOrder::AddFirst,
        }
    }
}

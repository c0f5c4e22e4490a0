//! vaultconf CLI: the `vaultconf` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let config = support::load_config_or_exit(cli.config.as_deref());
    support::init_tracing(&config.logging.filter);

    match cli.command {
        Commands::Expand {
            kind,
            input,
            resource,
            lenient,
        } => commands::expand::run(&config, kind, input, resource, lenient),

        Commands::Flatten {
            kind,
            input,
            resource,
        } => commands::flatten::run(&config, kind, input, resource),

        Commands::ValidateRules { input, field } => commands::validate_rules::run(input, field),

        Commands::ResolvePermissions {
            resource,
            input,
            lenient,
        } => commands::resolve_permissions::run(&config, resource, input, lenient),

        Commands::Reconcile {
            old,
            new,
            identity,
            order,
        } => commands::reconcile::run(old, new, identity, order.into()),

        Commands::Hash { input, identity } => commands::hash::run(input, identity),
    }
}

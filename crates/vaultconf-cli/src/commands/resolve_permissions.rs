use crate::support::{
    Config, exit_input_error, exit_transform_error, print_json, read_tree_or_exit,
};
use std::path::PathBuf;
use vaultconf_kernel::TreeReader;
use vaultconf_schema::expand_permissions_with;

pub fn run(config: &Config, resource: String, input: PathBuf, lenient: bool) {
    let tree = read_tree_or_exit(&input);
    let registry = config.catalogs_or_exit();
    let catalog = registry
        .require(&resource)
        .unwrap_or_else(|e| exit_input_error(e));
    let mode = config.resolve_mode(lenient);

    tracing::info!(%resource, ?mode, "resolving permissions");
    let permissions = expand_permissions_with(&TreeReader::new(&tree), "permission", catalog, mode)
        .unwrap_or_else(|e| exit_transform_error(e));
    print_json(&permissions);
}

use crate::support::{
    Config, exit_transform_error, print_json, read_tree_or_exit, rights_catalog_or_exit,
};
use std::path::PathBuf;
use vaultconf_schema::{DocumentContext, RecordKind, expand_document};

pub fn run(
    config: &Config,
    kind: RecordKind,
    input: PathBuf,
    resource: Option<String>,
    lenient: bool,
) {
    let tree = read_tree_or_exit(&input);
    let registry = config.catalogs_or_exit();
    let catalog = rights_catalog_or_exit(&registry, kind, resource.as_deref());
    let context = DocumentContext::new(&catalog).with_mode(config.resolve_mode(lenient));

    tracing::info!(%kind, input = %input.display(), "expanding document");
    let wire = expand_document(kind, &tree, &context).unwrap_or_else(|e| exit_transform_error(e));
    print_json(&wire);
}

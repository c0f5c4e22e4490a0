use crate::support::{
    Config, exit_transform_error, print_json, read_json_or_exit, rights_catalog_or_exit,
};
use std::path::PathBuf;
use vaultconf_schema::{DocumentContext, RecordKind, flatten_document};

pub fn run(config: &Config, kind: RecordKind, input: PathBuf, resource: Option<String>) {
    let wire = read_json_or_exit(&input);
    let registry = config.catalogs_or_exit();
    let catalog = rights_catalog_or_exit(&registry, kind, resource.as_deref());
    let context = DocumentContext::new(&catalog);

    tracing::info!(%kind, input = %input.display(), "flattening document");
    let tree = flatten_document(kind, wire, &context).unwrap_or_else(|e| exit_transform_error(e));
    print_json(&tree);
}

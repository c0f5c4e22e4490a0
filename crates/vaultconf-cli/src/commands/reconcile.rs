use crate::support::{exit_input_error, print_json, read_json_or_exit};
use serde_json::json;
use std::path::{Path, PathBuf};
use vaultconf_kernel::{ApplyOrder, SetIdentity, Value, ValueSet, reconcile_values};

pub fn run(old: PathBuf, new: PathBuf, identity: Vec<String>, order: ApplyOrder) {
    let identity = if identity.is_empty() {
        SetIdentity::whole()
    } else {
        SetIdentity::fields(identity)
    };
    let old = read_set_or_exit(&old, &identity);
    let new = read_set_or_exit(&new, &identity);

    let plan = reconcile_values(&old, &new);
    tracing::info!(
        remove = plan.to_remove.len(),
        add = plan.to_add.len(),
        "reconciled sets"
    );

    print_json(&json!({
        "toRemove": plan.to_remove,
        "toAdd": plan.to_add,
        "steps": plan.steps(order),
        "noop": plan.is_noop(),
    }));
}

fn read_set_or_exit(path: &Path, identity: &SetIdentity) -> ValueSet {
    match Value::from_json(read_json_or_exit(path)) {
        None => ValueSet::new(identity.clone()),
        Some(Value::List(items)) => ValueSet::from_values(identity.clone(), items),
        Some(other) => exit_input_error(format!(
            "{} must hold a JSON array, found {}",
            path.display(),
            other.kind()
        )),
    }
}

use crate::support::{exit_input_error, print_json, read_json_or_exit};
use serde_json::json;
use std::path::PathBuf;
use vaultconf_kernel::{SetIdentity, Value};

pub fn run(input: PathBuf, identity: Vec<String>) {
    let identity = SetIdentity::fields(identity);
    let records = match Value::from_json(read_json_or_exit(&input)) {
        Some(Value::List(items)) => items,
        Some(record @ Value::Map(_)) => vec![record],
        _ => exit_input_error(format!(
            "{} must hold a JSON object or array of objects",
            input.display()
        )),
    };

    let hashes: Vec<serde_json::Value> = records
        .iter()
        .map(|record| {
            json!({
                "hash": format!("{:016x}", identity.hash(record)),
                "record": record,
            })
        })
        .collect();
    print_json(&hashes);
}

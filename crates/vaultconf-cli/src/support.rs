use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vaultconf_kernel::{Record, TransformError, record_from_json};
use vaultconf_schema::{CatalogRegistry, RecordKind, ResolveMode, RightsCatalog};

pub const DEFAULT_CONFIG_PATH: &str = "vaultconf.toml";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Exit code for input the user can fix.
pub const EXIT_INPUT: i32 = 2;
/// Exit code for files that cannot be read.
pub const EXIT_IO: i32 = 1;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub permissions: PermissionsConfig,
    /// Extra or overriding rights per resource kind.
    pub catalogs: CatalogRegistry,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    pub strict: bool,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl Config {
    /// Built-in catalogs overlaid with the configured ones.
    pub fn catalogs_or_exit(&self) -> CatalogRegistry {
        let mut registry = CatalogRegistry::builtin();
        registry
            .extend(self.catalogs.clone())
            .unwrap_or_else(|e| exit_input_error(format!("invalid config: {e}")));
        registry
    }

    /// `--lenient` wins over the configured strictness.
    pub fn resolve_mode(&self, lenient: bool) -> ResolveMode {
        if lenient || !self.permissions.strict {
            ResolveMode::Lenient
        } else {
            ResolveMode::Strict
        }
    }
}

pub fn load_config_or_exit(path: Option<&Path>) -> Config {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !fallback.exists() {
                return Config::default();
            }
            fallback
        }
    };

    let raw = fs::read_to_string(&path).unwrap_or_else(|e| {
        eprintln!("error: failed to read {}: {e}", path.display());
        std::process::exit(EXIT_IO);
    });
    toml::from_str(&raw).unwrap_or_else(|e| {
        eprintln!("error: invalid config {}: {e}", path.display());
        std::process::exit(EXIT_INPUT);
    })
}

/// Log to stderr so stdout stays pure JSON. `RUST_LOG` overrides the
/// configured filter.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

pub fn read_json_or_exit(path: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: failed to read {}: {e}", path.display());
        std::process::exit(EXIT_IO);
    });
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        eprintln!("error: failed to parse {}: {e}", path.display());
        std::process::exit(EXIT_INPUT);
    })
}

pub fn read_tree_or_exit(path: &Path) -> Record {
    record_from_json(read_json_or_exit(path)).unwrap_or_else(|| {
        eprintln!("error: {} must hold a JSON object", path.display());
        std::process::exit(EXIT_INPUT);
    })
}

pub fn exit_transform_error(err: TransformError) -> ! {
    tracing::debug!(path = %err.path(), "transform rejected input");
    eprintln!("error: {err}");
    std::process::exit(EXIT_INPUT);
}

pub fn exit_input_error(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(EXIT_INPUT);
}

/// Catalog for `resource`; permission documents require one, other kinds
/// get an empty catalog.
pub fn rights_catalog_or_exit(
    registry: &CatalogRegistry,
    kind: RecordKind,
    resource: Option<&str>,
) -> RightsCatalog {
    match resource {
        Some(resource) => registry
            .require(resource)
            .cloned()
            .unwrap_or_else(|e| exit_input_error(e)),
        None if kind == RecordKind::Permissions => {
            exit_input_error("--resource is required for permissions documents")
        }
        None => RightsCatalog::default(),
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json serialization")
    );
}

// ABOUTME: Injects a default syslog logging driver into compose services.
// ABOUTME: Services that already declare `logging` are left exactly as written.

use super::document::ComposeDocument;
use super::error::ComposeError;
use serde_yaml::{Mapping, Value};
use std::path::Path;

pub const DEFAULT_LOG_DRIVER: &str = "syslog";
const ADDRESS_OPTION: &str = "syslog-address";

/// Syslog address requested through Create options, if logging is enabled.
///
/// Options are positional: `["True", "<address>"]` enables injection;
/// anything shorter or not starting with `"True"` disables it.
pub fn requested_address(options: &[String]) -> Option<&str> {
    match options {
        [enabled, address, ..] if enabled == "True" && !address.trim().is_empty() => {
            Some(address.trim())
        }
        _ => None,
    }
}

/// Add `logging` to every service that lacks it. Returns how many changed.
pub fn inject_logging(document: &mut ComposeDocument, address: &str) -> Result<usize, ComposeError> {
    let mut changed = 0;
    for (name, body) in document.services_mut()? {
        if body.contains_key("logging") {
            continue;
        }
        tracing::debug!(service = name, address, "injecting default logging driver");
        body.insert(Value::from("logging"), syslog_block(address));
        changed += 1;
    }
    Ok(changed)
}

/// Rewrite the spec at `spec_path` with default logging.
///
/// The file is only rewritten when at least one service changed, so a
/// second application is a no-op.
pub fn apply_default_logging(spec_path: &Path, address: &str) -> Result<bool, ComposeError> {
    let mut document = ComposeDocument::read(spec_path)?;
    let changed = inject_logging(&mut document, address)?;
    if changed == 0 {
        return Ok(false);
    }
    document.write(spec_path)?;
    tracing::info!(path = %spec_path.display(), services = changed, "default logging applied");
    Ok(true)
}

fn syslog_block(address: &str) -> Value {
    let mut options = Mapping::new();
    options.insert(Value::from(ADDRESS_OPTION), Value::from(address));

    let mut logging = Mapping::new();
    logging.insert(Value::from("driver"), Value::from(DEFAULT_LOG_DRIVER));
    logging.insert(Value::from("options"), Value::Mapping(options));
    Value::Mapping(logging)
}

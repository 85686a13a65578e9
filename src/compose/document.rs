// ABOUTME: Order-preserving view of a compose document for in-place edits.
// ABOUTME: Keeps every key it does not touch so rewrites stay faithful to the upload.

use super::error::ComposeError;
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// A compose file held as an ordered YAML tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeDocument {
    root: Mapping,
}

impl ComposeDocument {
    pub fn parse(content: &[u8]) -> Result<Self, ComposeError> {
        let value: Value = serde_yaml::from_slice(content)
            .map_err(|e| ComposeError::invalid(format!("not valid YAML: {}", e)))?;
        match value {
            Value::Mapping(root) => Ok(Self { root }),
            _ => Err(ComposeError::invalid("top level must be a mapping")),
        }
    }

    pub fn read(path: &Path) -> Result<Self, ComposeError> {
        let content = std::fs::read(path).map_err(|e| ComposeError::io(path, e))?;
        Self::parse(&content)
    }

    pub fn write(&self, path: &Path) -> Result<(), ComposeError> {
        let content = self.to_yaml()?;
        std::fs::write(path, content).map_err(|e| ComposeError::io(path, e))
    }

    pub fn to_yaml(&self) -> Result<String, ComposeError> {
        serde_yaml::to_string(&self.root)
            .map_err(|e| ComposeError::invalid(format!("cannot serialize: {}", e)))
    }

    /// Service bodies in declaration order.
    pub fn services_mut(
        &mut self,
    ) -> Result<impl Iterator<Item = (&str, &mut Mapping)>, ComposeError> {
        let services = match self.root.get_mut("services") {
            Some(Value::Mapping(services)) => services,
            Some(_) => return Err(ComposeError::invalid("`services` must be a mapping")),
            None => return Err(ComposeError::invalid("missing `services`")),
        };

        let mut bodies = Vec::with_capacity(services.len());
        for (name, body) in services.iter_mut() {
            let Some(name) = name.as_str() else {
                return Err(ComposeError::invalid("service names must be strings"));
            };
            let Value::Mapping(body) = body else {
                return Err(ComposeError::invalid(format!(
                    "service `{}` must be a mapping",
                    name
                )));
            };
            bodies.push((name, body));
        }
        Ok(bodies.into_iter())
    }
}

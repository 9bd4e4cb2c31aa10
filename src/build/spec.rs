//! Spec file schema
//!
//! A spec is a YAML document; a leading `#!` line is a YAML comment, so
//! spec files can be made executable and used as scripts:
//!
//! ```yaml
//! #!/usr/bin/env demand
//! go:
//!   import: example.com/cmd/hello
//! ```

use crate::error::{DemandError, DemandResult};
use serde::Deserialize;
use std::path::Path;

/// Parsed spec. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Spec {
    #[serde(default)]
    pub go: Option<GoSpec>,
}

/// `go:` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoSpec {
    /// Import path of the main package to build
    #[serde(default)]
    pub import: Option<String>,
}

impl Spec {
    /// Parse spec content read from `path`
    pub fn parse(path: &Path, content: &str) -> DemandResult<Self> {
        // A document holding only comments is an empty spec, not a syntax error
        let spec = if is_blank(content) {
            Spec::default()
        } else {
            serde_yaml::from_str::<Option<Spec>>(content)
                .map_err(|e| DemandError::SpecParse {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?
                .unwrap_or_default()
        };

        if spec.import().is_empty() {
            return Err(DemandError::SpecParse {
                path: path.to_path_buf(),
                reason: "spec file does not specify import path".to_string(),
            });
        }

        Ok(spec)
    }

    /// Read and parse a spec file
    pub async fn from_file(path: &Path) -> DemandResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DemandError::io(format!("reading spec {}", path.display()), e))?;
        Self::parse(path, &content)
    }

    /// Import path of the module to build
    pub fn import(&self) -> &str {
        self.go
            .as_ref()
            .and_then(|go| go.import.as_deref())
            .unwrap_or_default()
            .trim()
    }
}

fn is_blank(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

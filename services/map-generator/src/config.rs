//! Batch files for the `generate` command.
//!
//! A batch file lists places and palettes in YAML:
//!
//! ```yaml
//! places:
//!   - city: Grenoble, France
//!     radius: 5000
//!   - city: ${HOME_TOWN:-Lyon}
//! palettes:
//!   - onedark
//!   - yesterday-night
//! ```
//!
//! `${VAR}` and `${VAR:-default}` are substituted from the environment
//! before parsing.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::PlaceRequest;

/// One place entry; `radius` falls back to the command-line radius.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceConfig {
    pub city: String,
    #[serde(default)]
    pub radius: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub places: Vec<PlaceConfig>,
    #[serde(default)]
    pub palettes: Vec<String>,
}

impl BatchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid batch file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        let config: BatchConfig =
            serde_yaml::from_str(&expanded).context("Failed to parse batch YAML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.places.is_empty() {
            bail!("batch file lists no places");
        }
        for place in &self.places {
            if place.city.trim().is_empty() {
                bail!("batch file has a place with an empty city name");
            }
            if place.radius == Some(0) {
                bail!("radius for '{}' must be positive", place.city);
            }
        }
        if let Some(name) = self.palettes.iter().find(|p| p.trim().is_empty()) {
            bail!("batch file has an empty palette name: {:?}", name);
        }
        Ok(())
    }

    /// Place requests, using `default_radius` where an entry has none.
    pub fn place_requests(&self, default_radius: u32) -> Vec<PlaceRequest> {
        self.places
            .iter()
            .map(|p| PlaceRequest::new(p.city.clone(), p.radius.unwrap_or(default_radius)))
            .collect()
    }
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();

        let mut expr = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) => expr.push(c),
                None => bail!("Unclosed variable substitution: ${{{}", expr),
            }
        }
        result.push_str(&resolve_var_expr(&expr)?);
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    match expr.split_once(":-") {
        Some((name, default)) => match std::env::var(name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        },
        None => std::env::var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch() {
        let config = BatchConfig::from_yaml(
            r#"
places:
  - city: Grenoble, France
    radius: 5000
  - city: Dubai
palettes:
  - onedark
  - yesterday-night
"#,
        )
        .unwrap();

        assert_eq!(config.places.len(), 2);
        assert_eq!(config.palettes, vec!["onedark", "yesterday-night"]);

        let requests = config.place_requests(3000);
        assert_eq!(requests[0], PlaceRequest::new("Grenoble, France", 5000));
        assert_eq!(requests[1], PlaceRequest::new("Dubai", 3000));
    }

    #[test]
    fn test_palettes_optional() {
        let config = BatchConfig::from_yaml("places:\n  - city: Paris\n").unwrap();
        assert!(config.palettes.is_empty());
    }

    #[test]
    fn test_rejects_empty_places() {
        assert!(BatchConfig::from_yaml("places: []\n").is_err());
        assert!(BatchConfig::from_yaml("places:\n  - city: \"  \"\n").is_err());
        assert!(BatchConfig::from_yaml("places:\n  - city: Paris\n    radius: 0\n").is_err());
    }

    #[test]
    fn test_env_default_substitution() {
        let config = BatchConfig::from_yaml(
            "places:\n  - city: ${MAPGEN_TEST_UNSET_CITY:-Lyon}\n",
        )
        .unwrap();
        assert_eq!(config.places[0].city, "Lyon");
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("MAPGEN_TEST_CITY", "Macau");
        let expanded = expand_env_vars("city: ${MAPGEN_TEST_CITY}").unwrap();
        assert_eq!(expanded, "city: Macau");
    }

    #[test]
    fn test_missing_env_var() {
        assert!(expand_env_vars("${MAPGEN_TEST_DEFINITELY_UNSET}").is_err());
        assert!(expand_env_vars("${UNCLOSED").is_err());
        assert_eq!(expand_env_vars("cost: $5").unwrap(), "cost: $5");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("places.yaml");
        std::fs::write(&path, "places:\n  - city: Bangkok\n    radius: 4000\n").unwrap();

        let config = BatchConfig::load(&path).unwrap();
        assert_eq!(config.places[0].radius, Some(4000));

        assert!(BatchConfig::load(&dir.path().join("missing.yaml")).is_err());
    }
}

//! Routing-document transforms.
//!
//! The routing document (`main.ecosystem` in the global env bucket) names the
//! environment currently serving production. Each color keeps a ready-made
//! document (`blue.ecosystem`, `green.ecosystem`); swapping republishes the
//! other color's document verbatim. Retired per-environment documents
//! (`data`, `staging`) are recomputed from the environment documents with the
//! old field names.

use serde_json::{Map, Value};

use crate::color::Color;
use crate::error::RoutingUpdateError;
use crate::resolve::normalize_identifier;

pub const DEFAULT_ROUTING_KEY: &str = "main.ecosystem";
pub const PRODUCTION_ENV_FIELD: &str = "prd_env_name";

/// Modern field name → retired field name.
pub const LEGACY_FIELD_RENAMES: [(&str, &str); 3] = [
    ("portal_url", "fourfront"),
    ("es_url", "es"),
    ("env_name", "ff_env"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentRole {
    Production,
    Standby,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyDocument {
    pub key: &'static str,
    pub role: EnvironmentRole,
}

pub const LEGACY_DOCUMENTS: [LegacyDocument; 2] = [
    LegacyDocument {
        key: "data",
        role: EnvironmentRole::Production,
    },
    LegacyDocument {
        key: "staging",
        role: EnvironmentRole::Standby,
    },
];

pub fn color_document_key(color: Color) -> String {
    format!("{color}.ecosystem")
}

/// Fixed environment-name ↔ color table for one blue/green pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentColors {
    pub blue: String,
    pub green: String,
}

impl EnvironmentColors {
    pub fn new(blue: impl Into<String>, green: impl Into<String>) -> Self {
        Self {
            blue: blue.into(),
            green: green.into(),
        }
    }

    pub fn name_of(&self, color: Color) -> &str {
        match color {
            Color::Blue => &self.blue,
            Color::Green => &self.green,
        }
    }

    /// Exact match first, then the single entry whose normalized name is
    /// contained in the normalized value.
    pub fn color_of(&self, name: &str) -> Result<Color, RoutingUpdateError> {
        if let Some(color) = Color::ALL
            .into_iter()
            .find(|color| self.name_of(*color) == name)
        {
            return Ok(color);
        }

        let normalized = normalize_identifier(name);
        let mut matches = Color::ALL.into_iter().filter(|color| {
            let entry = normalize_identifier(self.name_of(*color));
            !entry.is_empty() && normalized.contains(&entry)
        });

        match (matches.next(), matches.next()) {
            (Some(color), None) => Ok(color),
            _ => Err(RoutingUpdateError::UnknownEnvironment {
                name: name.to_string(),
            }),
        }
    }
}

/// What republishing the routing document will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingSwap {
    pub current_env: String,
    pub current_color: Color,
    pub new_color: Color,
    pub new_env: String,
    pub source_key: String,
}

impl RoutingSwap {
    pub fn env_for(&self, role: EnvironmentRole) -> &str {
        match role {
            EnvironmentRole::Production => &self.new_env,
            EnvironmentRole::Standby => &self.current_env,
        }
    }
}

pub fn parse_document(key: &str, bytes: &[u8]) -> Result<Map<String, Value>, RoutingUpdateError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(RoutingUpdateError::Malformed {
            key: key.to_string(),
            message: "expected a JSON object".to_string(),
        }),
        Err(error) => Err(RoutingUpdateError::Malformed {
            key: key.to_string(),
            message: error.to_string(),
        }),
    }
}

pub fn production_environment<'a>(
    key: &str,
    document: &'a Map<String, Value>,
) -> Result<&'a str, RoutingUpdateError> {
    document
        .get(PRODUCTION_ENV_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| RoutingUpdateError::Malformed {
            key: key.to_string(),
            message: format!("missing string field '{PRODUCTION_ENV_FIELD}'"),
        })
}

/// Inverts the color recorded in the current routing document.
pub fn plan_routing_swap(
    routing_key: &str,
    current: &[u8],
    environments: &EnvironmentColors,
) -> Result<RoutingSwap, RoutingUpdateError> {
    let document = parse_document(routing_key, current)?;
    let recorded = production_environment(routing_key, &document)?;
    let current_color = environments.color_of(recorded)?;
    let new_color = current_color.opposite();

    Ok(RoutingSwap {
        current_env: environments.name_of(current_color).to_string(),
        current_color,
        new_color,
        new_env: environments.name_of(new_color).to_string(),
        source_key: color_document_key(new_color),
    })
}

/// Rewrites an environment document into its retired layout.
pub fn legacy_document_from(source_key: &str, source: &[u8]) -> Result<Vec<u8>, RoutingUpdateError> {
    let mut document = parse_document(source_key, source)?;
    for (modern, legacy) in LEGACY_FIELD_RENAMES {
        if let Some(value) = document.remove(modern) {
            document.insert(legacy.to_string(), value);
        }
    }

    serde_json::to_vec_pretty(&Value::Object(document)).map_err(|error| {
        RoutingUpdateError::Malformed {
            key: source_key.to_string(),
            message: error.to_string(),
        }
    })
}

pub fn render_document_change(key: &str, old: &[u8], new: &[u8]) -> String {
    format!(
        "Document '{key}'\n--- current ---\n{}\n--- replacement ---\n{}",
        String::from_utf8_lossy(old).trim_end(),
        String::from_utf8_lossy(new).trim_end()
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn environments() -> EnvironmentColors {
        EnvironmentColors::new("acme-blue", "acme-green")
    }

    #[test]
    fn color_document_keys_follow_color_names() {
        assert_eq!(color_document_key(Color::Blue), "blue.ecosystem");
        assert_eq!(color_document_key(Color::Green), "green.ecosystem");
    }

    #[test]
    fn environment_lookup_prefers_exact_then_contained() {
        let envs = environments();
        assert_eq!(envs.color_of("acme-green"), Ok(Color::Green));
        assert_eq!(envs.color_of("fourfront-acme_blue"), Ok(Color::Blue));
        assert!(matches!(
            envs.color_of("acme-purple"),
            Err(RoutingUpdateError::UnknownEnvironment { .. })
        ));
    }

    #[test]
    fn routing_swap_inverts_recorded_color() {
        let current = serde_json::to_vec(&json!({"prd_env_name": "acme-blue"})).expect("json");
        let swap = plan_routing_swap(DEFAULT_ROUTING_KEY, &current, &environments())
            .expect("swap should plan");

        assert_eq!(swap.current_color, Color::Blue);
        assert_eq!(swap.new_color, Color::Green);
        assert_eq!(swap.new_env, "acme-green");
        assert_eq!(swap.source_key, "green.ecosystem");
        assert_eq!(swap.env_for(EnvironmentRole::Standby), "acme-blue");
    }

    #[test]
    fn routing_swap_rejects_missing_field_and_non_objects() {
        let missing = serde_json::to_vec(&json!({"stg_env_name": "acme-blue"})).expect("json");
        assert!(matches!(
            plan_routing_swap(DEFAULT_ROUTING_KEY, &missing, &environments()),
            Err(RoutingUpdateError::Malformed { .. })
        ));

        assert!(matches!(
            plan_routing_swap(DEFAULT_ROUTING_KEY, b"[1, 2]", &environments()),
            Err(RoutingUpdateError::Malformed { .. })
        ));
    }

    #[test]
    fn legacy_document_renames_modern_fields_and_keeps_others() {
        let source = serde_json::to_vec(&json!({
            "portal_url": "http://green.example.org:80",
            "es_url": "https://es.example.org:443",
            "env_name": "acme-green",
            "region": "us-east-1",
        }))
        .expect("json");

        let legacy = legacy_document_from("acme-green", &source).expect("legacy should build");
        let parsed: Value = serde_json::from_slice(&legacy).expect("valid json");

        assert_eq!(
            parsed,
            json!({
                "fourfront": "http://green.example.org:80",
                "es": "https://es.example.org:443",
                "ff_env": "acme-green",
                "region": "us-east-1",
            })
        );
    }

    #[test]
    fn legacy_document_passes_through_already_legacy_fields() {
        let source = serde_json::to_vec(&json!({"fourfront": "u", "ff_env": "acme-blue"})).expect("json");
        let legacy = legacy_document_from("acme-blue", &source).expect("legacy should build");
        let parsed: Value = serde_json::from_slice(&legacy).expect("valid json");
        assert_eq!(parsed, json!({"fourfront": "u", "ff_env": "acme-blue"}));
    }
}

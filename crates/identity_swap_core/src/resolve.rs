use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Result, SwapError};

const SEPARATORS: [char; 5] = ['-', '_', '.', '/', ':'];

/// Lowercases and strips separators so `Acme-Blue`, `acme_blue` and
/// `acmeblue` compare equal.
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace() && !SEPARATORS.contains(ch))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cluster {
    /// Identifier as listed by the platform, used verbatim for API calls.
    pub id: String,
    pub color: Color,
}

impl Cluster {
    /// Trailing path segment of an ARN, or the id itself.
    pub fn short_name(&self) -> &str {
        self.id.rsplit_once('/').map_or(self.id.as_str(), |(_, tail)| tail)
    }
}

impl std::fmt::Display for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterPair {
    pub blue: Cluster,
    pub green: Cluster,
}

impl ClusterPair {
    pub fn get(&self, color: Color) -> &Cluster {
        match color {
            Color::Blue => &self.blue,
            Color::Green => &self.green,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        [&self.blue, &self.green].into_iter()
    }
}

/// Picks the single cluster whose normalized name contains the normalized
/// identifier.
pub fn resolve_cluster(identifier: &str, cluster_names: &[String], color: Color) -> Result<Cluster> {
    let needle = normalize_identifier(identifier);
    if needle.is_empty() {
        return Err(SwapError::resolution(format!(
            "{color} cluster identifier '{identifier}' is empty after normalization"
        )));
    }

    let matches: Vec<&String> = cluster_names
        .iter()
        .filter(|name| normalize_identifier(name).contains(&needle))
        .collect();

    match matches.as_slice() {
        [single] => Ok(Cluster {
            id: (*single).clone(),
            color,
        }),
        [] => Err(SwapError::resolution(format!(
            "no cluster matches {color} identifier '{identifier}'"
        ))),
        many => Err(SwapError::resolution(format!(
            "{color} identifier '{identifier}' is ambiguous; it matches {} clusters: {}",
            many.len(),
            many.iter()
                .map(|name| name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

pub fn resolve_cluster_pair(blue: &str, green: &str, cluster_names: &[String]) -> Result<ClusterPair> {
    let blue = resolve_cluster(blue, cluster_names, Color::Blue)?;
    let green = resolve_cluster(green, cluster_names, Color::Green)?;

    if blue.id == green.id {
        return Err(SwapError::resolution(format!(
            "blue and green identifiers both resolve to cluster '{}'",
            blue.id
        )));
    }

    Ok(ClusterPair { blue, green })
}

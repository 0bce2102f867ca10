//! Workload-definition classification.
//!
//! Every decision about what a definition name means (color, service type,
//! mirror kind, revision) is made here and nowhere else.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Result, SwapError};
use crate::resolve::normalize_identifier;

pub const MIRROR_TOKEN: &str = "mirror";

/// Normalized form of the `ecs-blue-green` stack marker carried by
/// stack-generated family names. Removed before color detection.
pub const STACK_COLOR_MARKER: &str = "bluegreen";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Portal,
    Indexer,
    Ingester,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [
        ServiceType::Portal,
        ServiceType::Indexer,
        ServiceType::Ingester,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::Portal => "portal",
            Self::Indexer => "indexer",
            Self::Ingester => "ingester",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadDefinition {
    /// Name exactly as reported by the platform (family:revision or full ARN).
    pub name: String,
    pub family: String,
    pub color: Color,
    pub service_type: ServiceType,
    pub is_mirror: bool,
    pub revision: u64,
}

impl WorkloadDefinition {
    /// `family:revision`, without any ARN prefix.
    pub fn short_name(&self) -> String {
        format!("{}:{}", self.family, self.revision)
    }
}

impl std::fmt::Display for WorkloadDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.family, self.revision)
    }
}

pub fn classify_definition(name: &str) -> Result<WorkloadDefinition> {
    let (family, revision) = split_definition_name(name)?;
    let normalized = normalize_identifier(family);

    let service_type = classify_service_type(&normalized).map_err(|matches| {
        SwapError::resolution(format!(
            "workload definition '{name}' matches {} service types (expected exactly one of portal, indexer, ingester)",
            matches
        ))
    })?;

    let color = classify_color(&normalized).ok_or_else(|| {
        SwapError::resolution(format!(
            "cannot determine the color of workload definition '{name}' (expected exactly one of blue, green)"
        ))
    })?;

    Ok(WorkloadDefinition {
        name: name.to_string(),
        family: family.to_string(),
        color,
        service_type,
        is_mirror: normalized.contains(MIRROR_TOKEN),
        revision,
    })
}

/// Splits `arn:...:task-definition/Family:7` or `Family:7` into family and revision.
fn split_definition_name(name: &str) -> Result<(&str, u64)> {
    let short = name.rsplit_once('/').map_or(name, |(_, tail)| tail);
    let Some((family, revision)) = short.rsplit_once(':') else {
        return Err(SwapError::resolution(format!(
            "workload definition '{name}' has no revision suffix"
        )));
    };

    if family.trim().is_empty() {
        return Err(SwapError::resolution(format!(
            "workload definition '{name}' has an empty family name"
        )));
    }

    let revision = revision.trim().parse::<u64>().map_err(|_| {
        SwapError::resolution(format!(
            "workload definition '{name}' has a non-numeric revision '{revision}'"
        ))
    })?;

    Ok((family, revision))
}

/// Exactly one type token must be present; the error carries the match count.
fn classify_service_type(normalized: &str) -> std::result::Result<ServiceType, usize> {
    let matches: Vec<ServiceType> = ServiceType::ALL
        .into_iter()
        .filter(|service_type| normalized.contains(service_type.token()))
        .collect();

    match matches.as_slice() {
        [single] => Ok(*single),
        _ => Err(matches.len()),
    }
}

fn classify_color(normalized: &str) -> Option<Color> {
    let without_stack_marker = normalized.replace(STACK_COLOR_MARKER, "");
    let mut matches = Color::ALL
        .into_iter()
        .filter(|color| without_stack_marker.contains(color.as_str()));

    match (matches.next(), matches.next()) {
        (Some(color), None) => Some(color),
        _ => None,
    }
}

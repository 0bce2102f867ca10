use serde::{Deserialize, Serialize};

use crate::color::Color;

/// A service inside one of the two clusters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceRef {
    pub cluster: String,
    pub color: Color,
    pub service: String,
}

impl std::fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", short(&self.service), short(&self.cluster))
    }
}

fn short(id: &str) -> &str {
    id.rsplit_once('/').map_or(id, |(_, tail)| tail)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAssignment {
    pub service: ServiceRef,
    pub definition: String,
}

/// Merged service → workload-definition mapping for both clusters,
/// blue services first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceState {
    pub assignments: Vec<ServiceAssignment>,
}

impl ServiceState {
    pub fn new(assignments: Vec<ServiceAssignment>) -> Self {
        Self { assignments }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.assignments.len() + 1);
        lines.push(format!("Current state ({} services):", self.assignments.len()));
        for assignment in &self.assignments {
            lines.push(format!(
                "  [{}] {}: {}",
                assignment.service.color,
                assignment.service,
                short(&assignment.definition)
            ));
        }
        lines.join("\n")
    }
}

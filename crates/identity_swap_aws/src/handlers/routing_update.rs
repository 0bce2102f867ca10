use identity_swap_core::routing::{
    legacy_document_from, parse_document, plan_routing_swap, render_document_change,
    EnvironmentColors, RoutingSwap, LEGACY_DOCUMENTS, PRODUCTION_ENV_FIELD,
};
use identity_swap_core::{Result, RoutingUpdateError};

use crate::adapters::object_store::{ObjectStore, ObjectStoreError, StoredObject};
use crate::adapters::operator::Operator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOutcome {
    Published,
    Declined,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub key: String,
    pub outcome: DocumentOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingReport {
    pub swap: RoutingSwap,
    pub documents: Vec<DocumentReport>,
}

impl RoutingReport {
    pub fn outcome_of(&self, key: &str) -> Option<DocumentOutcome> {
        self.documents
            .iter()
            .find(|document| document.key == key)
            .map(|document| document.outcome)
    }

    pub fn render(&self) -> String {
        let mut lines = vec![format!(
            "Routing: production {} ({}) -> {} ({})",
            self.swap.current_env, self.swap.current_color, self.swap.new_env, self.swap.new_color
        )];
        for document in &self.documents {
            let outcome = match document.outcome {
                DocumentOutcome::Published => "published",
                DocumentOutcome::Declined => "left untouched (declined)",
                DocumentOutcome::Unchanged => "already up to date",
            };
            lines.push(format!("  {}: {outcome}", document.key));
        }
        lines.join("\n")
    }
}

/// Re-points the routing document at the other color, then optionally
/// rebuilds the retired per-environment documents.
///
/// Each document is downloaded, shown old/new, confirmed and replaced on its
/// own. Uploads carry the version seen at download so a concurrent writer
/// turns into [`RoutingUpdateError::Conflict`] instead of a lost update.
pub fn update_routing_documents(
    store: &impl ObjectStore,
    operator: &mut impl Operator,
    routing_key: &str,
    environments: &EnvironmentColors,
    do_legacy: bool,
) -> Result<RoutingReport> {
    let current = download(store, routing_key)?;
    let swap = plan_routing_swap(routing_key, &current.body, environments)?;
    tracing::info!(
        from = %swap.current_env,
        to = %swap.new_env,
        source = %swap.source_key,
        "re-pointing routing document"
    );

    let source = download(store, &swap.source_key)?;
    let source_document = parse_document(&swap.source_key, &source.body)?;
    let declared = source_document
        .get(PRODUCTION_ENV_FIELD)
        .and_then(serde_json::Value::as_str);
    if declared != Some(swap.new_env.as_str()) {
        tracing::warn!(
            key = %swap.source_key,
            declared = declared.unwrap_or("<missing>"),
            expected = %swap.new_env,
            "per-color document names a different production environment; publishing it verbatim"
        );
    }

    let mut documents = vec![DocumentReport {
        key: routing_key.to_string(),
        outcome: replace_document(store, operator, routing_key, &current, &source.body)?,
    }];

    if do_legacy {
        for legacy in LEGACY_DOCUMENTS {
            let env = swap.env_for(legacy.role);
            let env_document = download(store, env)?;
            let replacement = legacy_document_from(env, &env_document.body)?;
            let existing = download(store, legacy.key)?;

            documents.push(DocumentReport {
                key: legacy.key.to_string(),
                outcome: replace_document(store, operator, legacy.key, &existing, &replacement)?,
            });
        }
    }

    Ok(RoutingReport { swap, documents })
}

fn download(store: &impl ObjectStore, key: &str) -> std::result::Result<StoredObject, RoutingUpdateError> {
    store.get_object(key).map_err(|error| RoutingUpdateError::Download {
        key: key.to_string(),
        message: error.to_string(),
    })
}

fn replace_document(
    store: &impl ObjectStore,
    operator: &mut impl Operator,
    key: &str,
    current: &StoredObject,
    replacement: &[u8],
) -> Result<DocumentOutcome> {
    if current.body == replacement {
        tracing::info!(key, "document already has the replacement content");
        return Ok(DocumentOutcome::Unchanged);
    }

    operator.show(&render_document_change(key, &current.body, replacement))?;
    if !operator.confirm(&format!("Replace '{key}' with the content above?"))? {
        tracing::info!(key, "replacement declined; document left untouched");
        return Ok(DocumentOutcome::Declined);
    }

    store
        .put_object(key, replacement, current.version.as_deref())
        .map_err(|error| match error {
            ObjectStoreError::Conflict { key } => RoutingUpdateError::Conflict { key },
            ObjectStoreError::Failed(message) => RoutingUpdateError::Upload {
                key: key.to_string(),
                message,
            },
        })?;
    tracing::info!(key, "document replaced");
    Ok(DocumentOutcome::Published)
}

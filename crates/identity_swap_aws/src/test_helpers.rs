//! In-memory collaborators for exercising handlers without AWS.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use identity_swap_core::{Result, SwapError, SwapJournal};
use sha2::{Digest, Sha256};

use crate::adapters::journal_store::JournalStore;
use crate::adapters::object_store::{ObjectStore, ObjectStoreError, StoredObject};
use crate::adapters::operator::Operator;
use crate::adapters::platform::{OrchestrationPlatform, ServiceDescription};

#[derive(Debug, Clone)]
struct FakeService {
    name: String,
    definition: Option<String>,
}

/// Simulated platform whose reported state follows its own update calls.
#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    clusters: Mutex<Vec<(String, Vec<FakeService>)>>,
    definitions: Vec<String>,
    failing_describe: Vec<String>,
    failing_update_call: Option<usize>,
    update_calls: Mutex<Vec<(String, String, String)>>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(self, cluster: &str) -> Self {
        {
            let mut clusters = self.clusters.lock().expect("poisoned mutex");
            if !clusters.iter().any(|(name, _)| name == cluster) {
                clusters.push((cluster.to_string(), Vec::new()));
            }
        }
        self
    }

    pub fn with_service(mut self, cluster: &str, service: &str, definition: &str) -> Self {
        if !self.definitions.iter().any(|name| name == definition) {
            self.definitions.push(definition.to_string());
        }
        self.push_service(cluster, service, Some(definition.to_string()))
    }

    pub fn with_unassigned_service(self, cluster: &str, service: &str) -> Self {
        self.push_service(cluster, service, None)
    }

    pub fn with_definitions(mut self, definitions: &[&str]) -> Self {
        for definition in definitions {
            if !self.definitions.iter().any(|name| name == definition) {
                self.definitions.push(definition.to_string());
            }
        }
        self
    }

    /// Registers `cluster` if needed and makes every describe call on it fail.
    pub fn failing_describe(self, cluster: &str) -> Self {
        let mut platform = self.with_cluster(cluster);
        platform.failing_describe.push(cluster.to_string());
        platform
    }

    /// Rejects the `call`-th update call (1-based) across the platform.
    pub fn failing_update_call(mut self, call: usize) -> Self {
        self.failing_update_call = Some(call);
        self
    }

    pub fn assigned(&self, cluster: &str, service: &str) -> Option<String> {
        let clusters = self.clusters.lock().expect("poisoned mutex");
        clusters
            .iter()
            .find(|(name, _)| name == cluster)
            .and_then(|(_, services)| services.iter().find(|entry| entry.name == service))
            .and_then(|entry| entry.definition.clone())
    }

    pub fn assignments(&self) -> Vec<(String, String, Option<String>)> {
        let clusters = self.clusters.lock().expect("poisoned mutex");
        clusters
            .iter()
            .flat_map(|(cluster, services)| {
                services.iter().map(move |entry| {
                    (cluster.clone(), entry.name.clone(), entry.definition.clone())
                })
            })
            .collect()
    }

    pub fn update_calls(&self) -> Vec<(String, String, String)> {
        self.update_calls.lock().expect("poisoned mutex").clone()
    }

    fn push_service(self, cluster: &str, service: &str, definition: Option<String>) -> Self {
        let platform = self.with_cluster(cluster);
        {
            let mut clusters = platform.clusters.lock().expect("poisoned mutex");
            if let Some((_, services)) = clusters.iter_mut().find(|(name, _)| name == cluster) {
                services.push(FakeService {
                    name: service.to_string(),
                    definition,
                });
            }
        }
        platform
    }
}

impl OrchestrationPlatform for InMemoryPlatform {
    fn list_clusters(&self) -> std::result::Result<Vec<String>, String> {
        let clusters = self.clusters.lock().expect("poisoned mutex");
        Ok(clusters.iter().map(|(name, _)| name.clone()).collect())
    }

    fn list_services(&self, cluster: &str) -> std::result::Result<Vec<String>, String> {
        let clusters = self.clusters.lock().expect("poisoned mutex");
        clusters
            .iter()
            .find(|(name, _)| name == cluster)
            .map(|(_, services)| services.iter().map(|entry| entry.name.clone()).collect())
            .ok_or_else(|| format!("cluster {cluster} not found"))
    }

    fn describe_services(
        &self,
        cluster: &str,
        services: &[String],
    ) -> std::result::Result<Vec<ServiceDescription>, String> {
        if self.failing_describe.iter().any(|name| name == cluster) {
            return Err(format!("injected describe failure for {cluster}"));
        }

        let clusters = self.clusters.lock().expect("poisoned mutex");
        let (_, known) = clusters
            .iter()
            .find(|(name, _)| name == cluster)
            .ok_or_else(|| format!("cluster {cluster} not found"))?;

        Ok(known
            .iter()
            .filter(|entry| services.contains(&entry.name))
            .map(|entry| ServiceDescription {
                service: entry.name.clone(),
                workload_definition: entry.definition.clone(),
            })
            .collect())
    }

    fn list_workload_definitions(&self) -> std::result::Result<Vec<String>, String> {
        Ok(self.definitions.clone())
    }

    fn update_service(
        &self,
        cluster: &str,
        service: &str,
        workload_definition: &str,
    ) -> std::result::Result<(), String> {
        let call = {
            let mut calls = self.update_calls.lock().expect("poisoned mutex");
            calls.push((
                cluster.to_string(),
                service.to_string(),
                workload_definition.to_string(),
            ));
            calls.len()
        };
        if self.failing_update_call == Some(call) {
            return Err(format!("injected update failure on call {call}"));
        }

        let mut clusters = self.clusters.lock().expect("poisoned mutex");
        let entry = clusters
            .iter_mut()
            .find(|(name, _)| name == cluster)
            .and_then(|(_, services)| services.iter_mut().find(|entry| entry.name == service))
            .ok_or_else(|| format!("service {service} not found on {cluster}"))?;
        entry.definition = Some(workload_definition.to_string());
        Ok(())
    }
}

/// Bucket stand-in with content-hash versions.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    interference: Mutex<Option<(String, Vec<u8>)>>,
    failing_puts: Vec<String>,
    put_calls: Mutex<Vec<String>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, key: &str, body: &[u8]) -> Self {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), body.to_vec());
        self
    }

    pub fn with_json(self, key: &str, value: &serde_json::Value) -> Self {
        let body = serde_json::to_vec_pretty(value).expect("json value should encode");
        self.with_object(key, &body)
    }

    /// Simulates another writer replacing `key` right after this run reads it.
    pub fn with_concurrent_write_after_read(self, key: &str, body: &[u8]) -> Self {
        *self.interference.lock().expect("poisoned mutex") = Some((key.to_string(), body.to_vec()));
        self
    }

    /// Every write to `key` fails with a non-conflict error.
    pub fn with_failing_put(mut self, key: &str) -> Self {
        self.failing_puts.push(key.to_string());
        self
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().expect("poisoned mutex").get(key).cloned()
    }

    pub fn put_calls(&self) -> Vec<String> {
        self.put_calls.lock().expect("poisoned mutex").clone()
    }

    fn version_of(body: &[u8]) -> String {
        format!("{:x}", Sha256::digest(body))
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn get_object(&self, key: &str) -> std::result::Result<StoredObject, ObjectStoreError> {
        let mut objects = self.objects.lock().expect("poisoned mutex");
        let body = objects
            .get(key)
            .cloned()
            .ok_or_else(|| ObjectStoreError::Failed(format!("NoSuchKey: {key}")))?;

        let mut interference = self.interference.lock().expect("poisoned mutex");
        if interference.as_ref().is_some_and(|(target, _)| target == key) {
            if let Some((target, replacement)) = interference.take() {
                objects.insert(target, replacement);
            }
        }

        Ok(StoredObject {
            version: Some(Self::version_of(&body)),
            body,
        })
    }

    fn put_object(
        &self,
        key: &str,
        body: &[u8],
        expected_version: Option<&str>,
    ) -> std::result::Result<(), ObjectStoreError> {
        self.put_calls
            .lock()
            .expect("poisoned mutex")
            .push(key.to_string());
        if self.failing_puts.iter().any(|failing| failing == key) {
            return Err(ObjectStoreError::Failed(format!("AccessDenied: {key}")));
        }

        let mut objects = self.objects.lock().expect("poisoned mutex");
        if let Some(expected) = expected_version {
            let stored = objects.get(key).map(|current| Self::version_of(current));
            if stored.as_deref() != Some(expected) {
                return Err(ObjectStoreError::Conflict {
                    key: key.to_string(),
                });
            }
        }
        objects.insert(key.to_string(), body.to_vec());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryJournalStore {
    journals: Mutex<BTreeMap<String, SwapJournal>>,
    fail_saves: bool,
}

impl InMemoryJournalStore {
    pub fn failing_saves() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn with_journal(self, key: &str, journal: SwapJournal) -> Self {
        self.journals
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), journal);
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.journals
            .lock()
            .expect("poisoned mutex")
            .keys()
            .cloned()
            .collect()
    }
}

impl JournalStore for InMemoryJournalStore {
    fn load(&self, key: &str) -> Result<Option<SwapJournal>> {
        Ok(self.journals.lock().expect("poisoned mutex").get(key).cloned())
    }

    fn save(&self, key: &str, journal: &SwapJournal) -> Result<()> {
        if self.fail_saves {
            return Err(SwapError::journal("injected journal write failure"));
        }
        self.journals
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), journal.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.journals.lock().expect("poisoned mutex").remove(key);
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}

/// Answers prompts from a script and records everything shown.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<bool>,
    questions: Vec<String>,
    transcript: String,
}

impl ScriptedOperator {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn unanswered(&self) -> usize {
        self.answers.len()
    }
}

impl Operator for ScriptedOperator {
    fn show(&mut self, text: &str) -> Result<()> {
        self.transcript.push_str(text);
        self.transcript.push('\n');
        Ok(())
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.questions.push(question.to_string());
        self.transcript.push_str(question);
        self.transcript.push('\n');
        self.answers
            .pop_front()
            .ok_or_else(|| SwapError::prompt(format!("no scripted answer for '{question}'")))
    }
}

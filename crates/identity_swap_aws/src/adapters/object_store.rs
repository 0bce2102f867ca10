#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    /// Opaque version token (S3 ETag) usable as a write precondition.
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("object '{key}' changed since it was read")]
    Conflict { key: String },

    #[error("{0}")]
    Failed(String),
}

/// Object store bound to a single bucket.
pub trait ObjectStore {
    fn get_object(&self, key: &str) -> Result<StoredObject, ObjectStoreError>;

    /// Replaces the whole object. With `expected_version`, the write only
    /// succeeds if the stored version still matches.
    fn put_object(
        &self,
        key: &str,
        body: &[u8],
        expected_version: Option<&str>,
    ) -> Result<(), ObjectStoreError>;
}

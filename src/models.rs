use chrono::{DateTime, Utc};
use serde::Deserialize;

/// GET /v2/_catalog response
#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub repositories: Option<Vec<String>>,
}

/// GET /v2/<repo>/tags/list response
#[derive(Debug, Deserialize)]
pub struct TagList {
    pub tags: Option<Vec<String>>,
}

/// GET /v2/<repo>/manifests/<tag> (schema v2), only the config reference is read
#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub config: Option<ManifestConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ManifestConfig {
    pub digest: String,
}

/// GET /v2/<repo>/blobs/<config-digest>, the image config holding the created timestamp
#[derive(Debug, Deserialize)]
pub struct ImageConfig {
    pub created: DateTime<Utc>,
}

/// A tag resolved to the manifest digest it points at and its creation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDescriptor {
    pub repository: String,
    pub tag: String,
    /// Docker-Content-Digest of the manifest, used for deletion
    pub digest: String,
    pub created: DateTime<Utc>,
}

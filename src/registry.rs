use reqwest::header::ACCEPT;
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::RegistryError;
use crate::models::{Catalog, ImageConfig, Manifest, ManifestDescriptor, TagList};

const MANIFEST_V2_MEDIA_TYPE: &str = "application/vnd.docker.distribution.manifest.v2+json";
const DIGEST_HEADER: &str = "Docker-Content-Digest";

/// Catalog page size large enough to fetch every repository in one request
const CATALOG_PAGE_SIZE: u32 = 99_999;

pub struct RegistryClient {
    client: Client,
    api_root: String,
}

impl RegistryClient {
    pub fn new(base_url: &Url) -> Self {
        let api_root = format!("{}/v2", base_url.as_str().trim_end_matches('/'));
        Self {
            client: Client::new(),
            api_root,
        }
    }

    /// GET /v2/, the registry is reachable only if this answers 200
    pub async fn check(&self) -> Result<(), RegistryError> {
        let url = format!("{}/", self.api_root);
        debug!("GET {}", url);
        let resp = self.client.get(&url).send().await?;

        expect_status(resp, Method::GET, &url, |status| status == StatusCode::OK)?;
        Ok(())
    }

    /// GET /v2/_catalog?n=99999
    pub async fn list_repositories(&self) -> Result<Vec<String>, RegistryError> {
        let url = format!("{}/_catalog?n={}", self.api_root, CATALOG_PAGE_SIZE);
        debug!("GET {}", url);
        let resp = self.client.get(&url).send().await?;

        let resp = expect_status(resp, Method::GET, &url, |status| status.is_success())?;
        let catalog: Catalog = read_json(resp).await?;
        Ok(catalog.repositories.unwrap_or_default())
    }

    /// GET /v2/<repo>/tags/list
    pub async fn list_tags(&self, repo: &str) -> Result<Vec<String>, RegistryError> {
        let url = format!("{}/{}/tags/list", self.api_root, repo);
        debug!("GET {}", url);
        let resp = self.client.get(&url).send().await?;

        let resp = expect_status(resp, Method::GET, &url, |status| status.is_success())?;
        let tag_list: TagList = read_json(resp).await?;
        Ok(tag_list.tags.unwrap_or_default())
    }

    /// Resolve a tag to its manifest digest and the creation time recorded in
    /// its config blob. The manifest must be read first since it names the blob.
    pub async fn resolve_tag(&self, repo: &str, tag: &str) -> Result<ManifestDescriptor, RegistryError> {
        let url = format!("{}/{}/manifests/{}", self.api_root, repo, tag);
        debug!("GET {}", url);
        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, MANIFEST_V2_MEDIA_TYPE)
            .send()
            .await?;

        let resp = expect_status(resp, Method::GET, &url, |status| status.is_success())?;

        let digest = resp
            .headers()
            .get(DIGEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| RegistryError::MissingDigestHeader {
                repository: repo.to_string(),
                tag: tag.to_string(),
            })?;

        let manifest: Manifest = read_json(resp).await?;
        let config_digest = manifest
            .config
            .map(|config| config.digest)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| RegistryError::MissingConfig {
                repository: repo.to_string(),
                tag: tag.to_string(),
            })?;

        let image_config = self.get_image_config(repo, &config_digest).await?;

        Ok(ManifestDescriptor {
            repository: repo.to_string(),
            tag: tag.to_string(),
            digest,
            created: image_config.created,
        })
    }

    /// GET /v2/<repo>/blobs/<config_digest>
    async fn get_image_config(&self, repo: &str, config_digest: &str) -> Result<ImageConfig, RegistryError> {
        let url = format!("{}/{}/blobs/{}", self.api_root, repo, config_digest);
        debug!("GET {}", url);
        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, MANIFEST_V2_MEDIA_TYPE)
            .send()
            .await?;

        let resp = expect_status(resp, Method::GET, &url, |status| status.is_success())?;
        read_json(resp).await
    }

    /// DELETE /v2/<repo>/manifests/<digest>, which the registry must accept with 202
    pub async fn delete_manifest(&self, repo: &str, digest: &str) -> Result<(), RegistryError> {
        let url = format!("{}/{}/manifests/{}", self.api_root, repo, digest);
        debug!("DELETE {}", url);
        let resp = self
            .client
            .delete(&url)
            .header(ACCEPT, MANIFEST_V2_MEDIA_TYPE)
            .send()
            .await?;

        expect_status(resp, Method::DELETE, &url, |status| status == StatusCode::ACCEPTED)?;
        Ok(())
    }
}

fn expect_status(
    resp: Response,
    method: Method,
    url: &str,
    accept: impl Fn(StatusCode) -> bool,
) -> Result<Response, RegistryError> {
    let status = resp.status();
    if accept(status) {
        Ok(resp)
    } else {
        Err(RegistryError::UnexpectedStatus {
            method,
            url: url.to_string(),
            status,
        })
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, RegistryError> {
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

//! API client collaborator
//!
//! The completion layer only needs two things from the API: whether the
//! session is authenticated, and list responses for namespaces and resource
//! instances. [`ApiClient`] captures exactly that. The HTTP transport lives
//! outside this crate; the binary ships [`FixtureClient`], which serves list
//! responses from a JSON file.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::registry::ResourceType;

/// Path listing every namespace visible to the session
pub const NAMESPACES_PATH: &str = "/api/web/namespaces";

/// Metadata block of a list item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry of a list response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: Option<ItemMetadata>,
}

impl ListItem {
    /// The item's name: `metadata.name` when present, otherwise `name`
    pub fn item_name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .or(self.name.as_deref())
            .filter(|n| !n.is_empty())
    }
}

/// Body of a list response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListData {
    #[serde(default)]
    pub items: Vec<ListItem>,
}

impl ListData {
    /// Names of all items, skipping unnamed entries
    pub fn names(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(ListItem::item_name)
            .map(str::to_string)
            .collect()
    }
}

/// A list response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiResponse {
    pub ok: bool,
    pub data: ListData,
}

/// The part of the API the completion layer consumes
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Whether credentials are configured for the session
    fn is_authenticated(&self) -> bool;

    /// Issue a GET for a list path
    ///
    /// # Arguments
    /// * `path` - API path, e.g. `/api/web/namespaces`
    ///
    /// # Returns
    /// * `Result<ApiResponse>` - Response, or a transport error
    async fn get(&self, path: &str) -> Result<ApiResponse>;
}

/// List all namespace names
pub async fn list_namespaces(client: &dyn ApiClient) -> Result<Vec<String>> {
    list_names(client, NAMESPACES_PATH).await
}

/// List instance names of a resource type in a namespace
pub async fn list_resource_names(
    client: &dyn ApiClient,
    resource_type: &ResourceType,
    namespace: &str,
) -> Result<Vec<String>> {
    list_names(client, &resource_type.list_path(namespace)).await
}

async fn list_names(client: &dyn ApiClient, path: &str) -> Result<Vec<String>> {
    if !client.is_authenticated() {
        return Err(ApiError::NotAuthenticated.into());
    }

    let response = client.get(path).await?;
    if !response.ok {
        return Err(ApiError::RequestFailed {
            path: path.to_string(),
            reason: "non-success response".to_string(),
        }
        .into());
    }

    let names = response.data.names();
    debug!("Listed {} names from {}", names.len(), path);
    Ok(names)
}

/// Client serving canned list responses keyed by path
#[derive(Debug, Clone, Default)]
pub struct FixtureClient {
    responses: HashMap<String, ListData>,
    authenticated: bool,
    latency: Duration,
}

impl FixtureClient {
    /// A client without credentials; every lookup fails
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// An authenticated client over the given responses
    pub fn new(responses: HashMap<String, ListData>) -> Self {
        Self {
            responses,
            authenticated: true,
            latency: Duration::ZERO,
        }
    }

    /// Parse fixture JSON of the form `{"<path>": {"items": [...]}, ...}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let responses: HashMap<String, ListData> = serde_json::from_str(json)?;
        Ok(Self::new(responses))
    }

    /// Load fixture JSON from a file
    ///
    /// # Arguments
    /// * `path` - Fixture file path
    ///
    /// # Returns
    /// * `Result<Self>` - Authenticated client serving the file's responses
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let client = Self::from_json_str(&content)?;
        debug!(
            "Loaded {} fixture paths from {}",
            client.responses.len(),
            path.display()
        );
        Ok(client)
    }

    /// Delay every response, to exercise slow lookups
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl ApiClient for FixtureClient {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    async fn get(&self, path: &str) -> Result<ApiResponse> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if !self.authenticated {
            return Err(ApiError::NotAuthenticated.into());
        }

        Ok(match self.responses.get(path) {
            Some(data) => ApiResponse {
                ok: true,
                data: data.clone(),
            },
            None => ApiResponse::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShellError;
    use crate::registry::ResourceRegistry;

    const FIXTURE: &str = r#"{
        "/api/web/namespaces": {"items": [{"name": "default"}, {"name": "shop"}]},
        "/api/config/namespaces/shop/origin_pools": {
            "items": [{"metadata": {"name": "pool-a"}}, {"name": "pool-b"}, {}]
        }
    }"#;

    #[test]
    fn test_item_name_prefers_metadata() {
        let item = ListItem {
            name: Some("outer".to_string()),
            metadata: Some(ItemMetadata {
                name: Some("inner".to_string()),
            }),
        };
        assert_eq!(item.item_name(), Some("inner"));
        assert_eq!(ListItem::default().item_name(), None);
    }

    #[tokio::test]
    async fn test_list_namespaces_from_fixture() {
        let client = FixtureClient::from_json_str(FIXTURE).unwrap();
        let names = list_namespaces(&client).await.unwrap();
        assert_eq!(names, vec!["default", "shop"]);
    }

    #[tokio::test]
    async fn test_list_resource_names_skips_unnamed() {
        let client = FixtureClient::from_json_str(FIXTURE).unwrap();
        let rt = ResourceRegistry::builtin().get("origin_pool").unwrap();
        let names = list_resource_names(&client, rt, "shop").await.unwrap();
        assert_eq!(names, vec!["pool-a", "pool-b"]);
    }

    #[tokio::test]
    async fn test_unknown_path_is_request_failure() {
        let client = FixtureClient::from_json_str(FIXTURE).unwrap();
        let rt = ResourceRegistry::builtin().get("fleet").unwrap();
        let err = list_resource_names(&client, rt, "shop").await.unwrap_err();
        assert!(matches!(err, ShellError::Api(ApiError::RequestFailed { .. })));
    }

    #[tokio::test]
    async fn test_unauthenticated_client_fails() {
        let err = list_namespaces(&FixtureClient::unauthenticated())
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::Api(ApiError::NotAuthenticated)));
    }

    #[test]
    fn test_malformed_fixture_is_error() {
        assert!(FixtureClient::from_json_str("[1, 2]").is_err());
    }
}

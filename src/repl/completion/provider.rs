//! Candidate provider for dynamic completion values
//!
//! Namespace names and resource instance names come from the API. The
//! provider fronts each with a [`LookupCache`] so that repeated and concurrent
//! completion requests share one fetch per key.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::cache::LookupCache;
use crate::client::{self, ApiClient};
use crate::registry::{ResourceRegistry, ResourceType};

/// Cache key under which the namespace list is stored
const NAMESPACES_KEY: &str = "namespaces";

/// Served when namespaces cannot be listed
pub fn fallback_namespaces() -> Vec<String> {
    vec!["default".to_string(), "system".to_string()]
}

/// Source of dynamic completion values
#[async_trait]
pub trait CandidateProvider: Send + Sync {
    /// Namespace names
    async fn namespaces(&self) -> Vec<String>;

    /// Instance names of a resource type
    ///
    /// # Arguments
    /// * `namespace` - Namespace to list in
    /// * `domain` - Domain the lookup is made from
    /// * `resource_type` - Resource type to list
    async fn resource_names(
        &self,
        namespace: &str,
        domain: &str,
        resource_type: &ResourceType,
    ) -> Vec<String>;

    /// Start resource-name fetches for every resource type of a domain
    fn prefetch_domain(&self, namespace: &str, domain: &str);

    /// Drop every cached value
    fn clear_all(&self);

    /// Drop cached resource names under a namespace
    fn clear_namespace_cache(&self, namespace: &str);

    /// Drop one resource-name key, or all of them
    fn clear_resource_cache(&self, key: Option<&str>);
}

/// Cache key for a resource-name lookup
pub fn resource_key(namespace: &str, domain: &str, resource_type: &str) -> String {
    format!("{namespace}:{domain}:{resource_type}")
}

/// Provider backed by an [`ApiClient`]
pub struct ApiCandidateProvider {
    client: Arc<dyn ApiClient>,
    resources: &'static ResourceRegistry,
    namespace_cache: LookupCache<Vec<String>>,
    resource_cache: LookupCache<Vec<String>>,
}

impl ApiCandidateProvider {
    /// Create a provider
    ///
    /// # Arguments
    /// * `client` - API client used by the fetchers
    /// * `resources` - Resource-type table for domain prefetching
    /// * `ttl` - Time-to-live of both caches
    pub fn new(client: Arc<dyn ApiClient>, resources: &'static ResourceRegistry, ttl: Duration) -> Self {
        Self {
            client,
            resources,
            namespace_cache: LookupCache::new("namespace", ttl, fallback_namespaces()),
            resource_cache: LookupCache::new("resource", ttl, Vec::new()),
        }
    }

    /// The resource-name cache, for inspection
    pub fn resource_cache(&self) -> &LookupCache<Vec<String>> {
        &self.resource_cache
    }

    /// The namespace cache, for inspection
    pub fn namespace_cache(&self) -> &LookupCache<Vec<String>> {
        &self.namespace_cache
    }
}

#[async_trait]
impl CandidateProvider for ApiCandidateProvider {
    async fn namespaces(&self) -> Vec<String> {
        let client = Arc::clone(&self.client);
        self.namespace_cache
            .get_or_fetch(NAMESPACES_KEY, move || async move {
                client::list_namespaces(client.as_ref()).await
            })
            .await
    }

    async fn resource_names(
        &self,
        namespace: &str,
        domain: &str,
        resource_type: &ResourceType,
    ) -> Vec<String> {
        let key = resource_key(namespace, domain, &resource_type.name);
        let client = Arc::clone(&self.client);
        let resource_type = resource_type.clone();
        let namespace = namespace.to_string();
        self.resource_cache
            .get_or_fetch(&key, move || async move {
                client::list_resource_names(client.as_ref(), &resource_type, &namespace).await
            })
            .await
    }

    fn prefetch_domain(&self, namespace: &str, domain: &str) {
        if !self.client.is_authenticated() {
            debug!("Skipping prefetch for {}: not authenticated", domain);
            return;
        }

        let types = self.resources.by_domain(domain);
        debug!("Prefetching {} resource types for {}", types.len(), domain);
        for resource_type in types {
            let key = resource_key(namespace, domain, &resource_type.name);
            let client = Arc::clone(&self.client);
            let resource_type = resource_type.clone();
            let namespace = namespace.to_string();
            self.resource_cache.prefetch(&key, move || async move {
                client::list_resource_names(client.as_ref(), &resource_type, &namespace).await
            });
        }
    }

    fn clear_all(&self) {
        self.namespace_cache.clear_all();
        self.resource_cache.clear_all();
    }

    fn clear_namespace_cache(&self, namespace: &str) {
        self.resource_cache.clear_prefix(&format!("{namespace}:"));
    }

    fn clear_resource_cache(&self, key: Option<&str>) {
        match key {
            Some(key) => self.resource_cache.clear_key(key),
            None => self.resource_cache.clear_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FixtureClient;

    fn provider(client: FixtureClient) -> ApiCandidateProvider {
        ApiCandidateProvider::new(
            Arc::new(client),
            ResourceRegistry::builtin(),
            Duration::from_secs(30),
        )
    }

    fn fixture() -> FixtureClient {
        FixtureClient::from_json_str(
            r#"{
                "/api/web/namespaces": {"items": [{"name": "shop"}]},
                "/api/config/dns/namespaces/shop/dns_zones": {"items": [{"metadata": {"name": "example.com"}}]}
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_unauthenticated_namespaces_fall_back() {
        let provider = provider(FixtureClient::unauthenticated());
        assert_eq!(provider.namespaces().await, fallback_namespaces());
        assert!(provider.namespace_cache().is_empty());
    }

    #[tokio::test]
    async fn test_resource_names_cached_per_key() {
        let provider = provider(fixture());
        let zone = ResourceRegistry::builtin().get("dns_zone").unwrap();

        assert_eq!(provider.resource_names("shop", "dns", zone).await, vec!["example.com"]);
        assert_eq!(
            provider.resource_cache().peek("shop:dns:dns_zone"),
            Some(vec!["example.com".to_string()])
        );
    }

    #[tokio::test]
    async fn test_clear_namespace_cache() {
        let provider = provider(fixture());
        let zone = ResourceRegistry::builtin().get("dns_zone").unwrap();
        provider.resource_names("shop", "dns", zone).await;
        provider.namespaces().await;

        provider.clear_namespace_cache("shop");
        assert!(provider.resource_cache().is_empty());
        assert!(!provider.namespace_cache().is_empty());

        provider.clear_all();
        assert!(provider.namespace_cache().is_empty());
    }

    #[tokio::test]
    async fn test_prefetch_domain_warms_cache() {
        let provider = provider(fixture());
        provider.prefetch_domain("shop", "dns");
        assert!(provider.resource_cache().is_loading("shop:dns:dns_zone"));
        assert!(provider.resource_cache().is_loading("shop:dns:dns_load_balancer"));

        let zone = ResourceRegistry::builtin().get("dns_zone").unwrap();
        assert_eq!(provider.resource_names("shop", "dns", zone).await, vec!["example.com"]);
    }
}

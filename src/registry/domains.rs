//! Domain table and alias resolver
//!
//! A [`DomainRegistry`] owns a read-only table of [`DomainInfo`] entries and
//! lazily derives a name/alias index from it. The index is built exactly once,
//! on first lookup, even when several threads race on that first lookup; after
//! that every lookup is a plain map read.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Metadata about a resource domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainInfo {
    /// Canonical name, e.g. `load_balancer`
    pub name: String,
    /// Human readable name, e.g. `Load Balancer`
    pub display_name: String,
    /// Functional description
    pub description: String,
    /// Short forms, e.g. `lb`
    pub aliases: Vec<String>,
}

impl DomainInfo {
    /// Create a domain entry
    pub fn new<I, S>(name: &str, display_name: &str, description: &str, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }
}

/// Read-only domain table with an alias index
#[derive(Debug)]
pub struct DomainRegistry {
    /// Entries sorted by canonical name
    domains: Vec<DomainInfo>,
    /// Name or alias -> position in `domains`, built on first use
    index: OnceLock<HashMap<String, usize>>,
}

static BUILTIN: OnceLock<DomainRegistry> = OnceLock::new();

impl DomainRegistry {
    /// Create a registry over the given table
    ///
    /// # Arguments
    /// * `domains` - Domain entries; listing order is by canonical name
    pub fn new(mut domains: Vec<DomainInfo>) -> Self {
        domains.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            domains,
            index: OnceLock::new(),
        }
    }

    /// The process-wide registry over the built-in domain table.
    ///
    /// Built on first call and never mutated afterwards.
    pub fn builtin() -> &'static DomainRegistry {
        BUILTIN.get_or_init(|| Self::new(builtin_domains()))
    }

    fn index(&self) -> &HashMap<String, usize> {
        self.index.get_or_init(|| {
            tracing::debug!("Building domain alias index ({} domains)", self.domains.len());
            let mut index = HashMap::with_capacity(self.domains.len() * 2);
            for (pos, info) in self.domains.iter().enumerate() {
                index.insert(info.name.clone(), pos);
            }
            // Canonical names take precedence over a clashing alias
            for (pos, info) in self.domains.iter().enumerate() {
                for alias in &info.aliases {
                    index.entry(alias.clone()).or_insert(pos);
                }
            }
            index
        })
    }

    /// Resolve a canonical name or alias to the canonical name
    pub fn resolve(&self, name_or_alias: &str) -> Option<&str> {
        self.info(name_or_alias).map(|info| info.name.as_str())
    }

    /// Look up domain metadata by canonical name or alias
    pub fn info(&self, name_or_alias: &str) -> Option<&DomainInfo> {
        self.index()
            .get(name_or_alias)
            .and_then(|&pos| self.domains.get(pos))
    }

    /// Check whether the name is a canonical domain name or alias
    pub fn is_valid(&self, name_or_alias: &str) -> bool {
        self.index().contains_key(name_or_alias)
    }

    /// All domains, sorted by canonical name
    pub fn all(&self) -> &[DomainInfo] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

const BUILTIN_DOMAINS: &[(&str, &str, &str, &[&str])] = &[
    ("load_balancer", "Load Balancer", "HTTP, TCP, UDP load balancing and origin pool management", &["lb"]),
    ("security", "Security", "WAF policies, bot defense, service policies, and threat protection", &["sec"]),
    ("networking", "Networking", "Networks, routing, BGP, and virtual connectivity", &["net"]),
    ("dns", "DNS", "DNS zones, records, and DNS load balancing", &[]),
    ("infrastructure", "Infrastructure", "Sites, fleets, cloud provisioning, and cluster management", &["infra"]),
    ("observability", "Observability", "Monitoring, logging, alerts, metrics, and dashboards", &["obs", "o11y"]),
    ("identity", "Identity", "Namespaces, users, roles, authentication, and access control", &["iam"]),
    ("api_security", "API Security", "API discovery, testing, crawling, and endpoint protection", &["apisec"]),
    ("service_mesh", "Service Mesh", "Service mesh configuration, discovery, and orchestration", &["mesh"]),
    ("shape_security", "Shape Security", "Advanced bot protection, device identification, and client defense", &["shape"]),
    ("infrastructure_protection", "Infrastructure Protection", "DDoS protection, alerts, events, and mitigation policies", &["infraprot"]),
    ("applications", "Applications", "Application deployment, management, and configuration", &["app", "apps"]),
    ("integrations", "Integrations", "Third-party integrations and external connectors", &["int", "connect"]),
    ("cdn", "CDN", "Content delivery network, caching, and distribution", &[]),
    ("bigip", "BIG-IP", "BIG-IP integration and management", &[]),
    ("nginx", "NGINX", "NGINX configuration and management", &[]),
    ("operations", "Operations", "Operational tasks, workflows, and system operations", &["ops"]),
    ("subscriptions", "Subscriptions", "Subscription management and plan administration", &["sub"]),
    ("tenant_management", "Tenant Management", "Tenant administration, organization management, and governance", &["tenant"]),
    ("billing", "Billing", "Billing, usage tracking, and payment management", &[]),
    ("vpn", "VPN", "VPN configuration and remote access management", &[]),
    ("ai_intelligence", "AI Intelligence", "AI and machine learning features and capabilities", &["ai"]),
    ("config", "Configuration", "System configuration and settings management", &[]),
];

fn builtin_domains() -> Vec<DomainInfo> {
    BUILTIN_DOMAINS
        .iter()
        .map(|(name, display, description, aliases)| {
            DomainInfo::new(name, display, description, aliases.iter().copied())
        })
        .collect()
}

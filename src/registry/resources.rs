//! Resource-type table
//!
//! Resource types describe the API shape the lookup layer needs to list
//! instance names: the list path and whether it is namespace scoped. The
//! per-domain index is derived lazily, once.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Operations a resource type supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceOperations {
    pub create: bool,
    pub get: bool,
    pub list: bool,
    pub update: bool,
    pub delete: bool,
    pub status: bool,
}

impl ResourceOperations {
    /// All operations enabled
    pub const fn all() -> Self {
        Self {
            create: true,
            get: true,
            list: true,
            update: true,
            delete: true,
            status: true,
        }
    }

    /// Whether an action applies to a type with these operations. Mutating
    /// actions other than create and delete count as updates; unknown actions
    /// are allowed.
    pub fn allows(&self, action: &str) -> bool {
        match action {
            "list" => self.list,
            "get" => self.get,
            "create" => self.create,
            "apply" => self.create || self.update,
            "replace" | "patch" | "add-labels" | "remove-labels" => self.update,
            "delete" => self.delete,
            "status" => self.status,
            _ => true,
        }
    }
}

/// A resource type known to the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceType {
    /// API name, e.g. `http_loadbalancer`
    pub name: String,
    /// Command name, e.g. `http-loadbalancer`
    pub cli_name: String,
    pub description: String,
    /// List path; `{namespace}` is substituted for namespace-scoped types
    pub api_path: String,
    pub supports_namespace: bool,
    /// Domains the type is reachable from
    pub domains: Vec<String>,
    pub operations: ResourceOperations,
}

impl ResourceType {
    /// Build the list path for the given namespace
    pub fn list_path(&self, namespace: &str) -> String {
        if self.supports_namespace {
            self.api_path.replace("{namespace}", namespace)
        } else {
            self.api_path.clone()
        }
    }

    /// Check whether a typed word names this type
    pub fn matches(&self, word: &str) -> bool {
        self.name == word || self.cli_name == word
    }
}

/// Read-only resource-type table
#[derive(Debug)]
pub struct ResourceRegistry {
    types: Vec<ResourceType>,
    /// Domain -> positions in `types`, built on first use
    by_domain: OnceLock<HashMap<String, Vec<usize>>>,
}

static BUILTIN: OnceLock<ResourceRegistry> = OnceLock::new();

impl ResourceRegistry {
    pub fn new(types: Vec<ResourceType>) -> Self {
        Self {
            types,
            by_domain: OnceLock::new(),
        }
    }

    /// The process-wide registry over the built-in resource table
    pub fn builtin() -> &'static ResourceRegistry {
        BUILTIN.get_or_init(|| Self::new(builtin_resources()))
    }

    fn domain_index(&self) -> &HashMap<String, Vec<usize>> {
        self.by_domain.get_or_init(|| {
            let mut index: HashMap<String, Vec<usize>> = HashMap::new();
            for (pos, rt) in self.types.iter().enumerate() {
                for domain in &rt.domains {
                    index.entry(domain.clone()).or_default().push(pos);
                }
            }
            index
        })
    }

    /// Look up a resource type by API name or command name
    pub fn get(&self, name: &str) -> Option<&ResourceType> {
        self.types.iter().find(|rt| rt.matches(name))
    }

    /// All resource types reachable from a domain
    pub fn by_domain(&self, domain: &str) -> Vec<&ResourceType> {
        self.domain_index()
            .get(domain)
            .map(|positions| positions.iter().map(|&pos| &self.types[pos]).collect())
            .unwrap_or_default()
    }

    /// Find the resource type a word names within a domain
    pub fn find_in_domain(&self, domain: &str, word: &str) -> Option<&ResourceType> {
        self.by_domain(domain).into_iter().find(|rt| rt.matches(word))
    }

    pub fn all(&self) -> &[ResourceType] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

const BUILTIN_RESOURCES: &[(&str, &str, &str, &[&str])] = &[
    ("http_loadbalancer", "HTTP load balancer", "/api/config/namespaces/{namespace}/http_loadbalancers", &["load_balancer"]),
    ("tcp_loadbalancer", "TCP load balancer", "/api/config/namespaces/{namespace}/tcp_loadbalancers", &["load_balancer"]),
    ("origin_pool", "Origin pool", "/api/config/namespaces/{namespace}/origin_pools", &["load_balancer"]),
    ("healthcheck", "Health check", "/api/config/namespaces/{namespace}/healthchecks", &["load_balancer"]),
    ("app_firewall", "Web application firewall", "/api/config/namespaces/{namespace}/app_firewalls", &["security"]),
    ("service_policy", "Service policy", "/api/config/namespaces/{namespace}/service_policys", &["security"]),
    ("rate_limiter", "Rate limiter", "/api/config/namespaces/{namespace}/rate_limiters", &["security"]),
    ("network_policy", "Network policy", "/api/config/namespaces/{namespace}/network_policys", &["networking", "security"]),
    ("virtual_network", "Virtual network", "/api/config/namespaces/{namespace}/virtual_networks", &["networking"]),
    ("dns_zone", "DNS zone", "/api/config/dns/namespaces/{namespace}/dns_zones", &["dns"]),
    ("dns_load_balancer", "DNS load balancer", "/api/config/dns/namespaces/{namespace}/dns_load_balancers", &["dns"]),
    ("aws_vpc_site", "AWS VPC site", "/api/config/namespaces/{namespace}/aws_vpc_sites", &["infrastructure"]),
    ("fleet", "Fleet", "/api/config/namespaces/{namespace}/fleets", &["infrastructure"]),
    ("alert_policy", "Alert policy", "/api/config/namespaces/{namespace}/alert_policys", &["observability"]),
    ("cdn_loadbalancer", "CDN load balancer", "/api/config/namespaces/{namespace}/cdn_loadbalancers", &["cdn"]),
    ("user", "Tenant user", "/api/web/custom/namespaces/system/users", &["identity"]),
    ("api_definition", "API definition", "/api/config/namespaces/{namespace}/api_definitions", &["api_security"]),
];

fn builtin_resources() -> Vec<ResourceType> {
    BUILTIN_RESOURCES
        .iter()
        .map(|(name, description, api_path, domains)| ResourceType {
            name: name.to_string(),
            cli_name: name.replace('_', "-"),
            description: description.to_string(),
            api_path: api_path.to_string(),
            supports_namespace: api_path.contains("{namespace}"),
            domains: domains.iter().map(|d| d.to_string()).collect(),
            operations: operations_for(name),
        })
        .collect()
}

fn operations_for(name: &str) -> ResourceOperations {
    match name {
        // Invitation managed, no status endpoint
        "user" => ResourceOperations {
            create: false,
            status: false,
            ..ResourceOperations::all()
        },
        _ => ResourceOperations::all(),
    }
}

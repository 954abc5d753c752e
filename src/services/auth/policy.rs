//! Route -> required scope table.
//!
//! Built once at startup and shared read-only across workers.

use std::collections::{BTreeSet, HashMap};

use axum::http::Method;

static NO_SCOPES: BTreeSet<String> = BTreeSet::new();

/// Data-management API routes and the scope each one requires.
const MANAGEMENT_API: &[(&str, Method, &str)] = &[
    ("assets", Method::GET, "assetRead"),
    ("assets", Method::POST, "assetWrite"),
    ("assets", Method::DELETE, "assetWrite"),
    ("catalog", Method::GET, "catalogRead"),
    ("contractagreements", Method::GET, "contractAgreementRead"),
    ("contractdefinitions", Method::GET, "contractDefinitionRead"),
    ("contractdefinitions", Method::POST, "contractDefinitionWrite"),
    ("contractdefinitions", Method::DELETE, "contractDefinitionWrite"),
    ("contractnegotiations", Method::GET, "contractNegotiationRead"),
    ("contractnegotiations", Method::POST, "contractNegotiationWrite"),
    ("policydefinitions", Method::GET, "policyDefinitionRead"),
    ("policydefinitions", Method::POST, "policyDefinitionWrite"),
    ("policydefinitions", Method::DELETE, "policyDefinitionWrite"),
    ("transferprocess", Method::GET, "transferProcessRead"),
    ("transferprocess", Method::POST, "transferProcessWrite"),
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PolicyTableError {
    #[error("duplicate policy entry for {method} {path}")]
    Duplicate { path: String, method: Method },
    #[error("policy entry for {method} {path} requires no scopes")]
    EmptyScopes { path: String, method: Method },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    path: String,
    method: Method,
}

impl RouteKey {
    fn new(path: &str, method: Method) -> Self {
        Self {
            path: normalize_path(path).to_string(),
            method,
        }
    }
}

fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

#[derive(Debug)]
pub struct ScopePolicyTable {
    entries: HashMap<RouteKey, BTreeSet<String>>,
}

impl ScopePolicyTable {
    pub fn builder() -> ScopePolicyTableBuilder {
        ScopePolicyTableBuilder::default()
    }

    /// The fixed table guarding the data-management API.
    pub fn management_api() -> Result<Self, PolicyTableError> {
        MANAGEMENT_API
            .iter()
            .fold(Self::builder(), |b, (path, method, scope)| {
                b.entry(path, method.clone(), [*scope])
            })
            .build()
    }

    /// Required scopes for an exact (path, method) match.
    ///
    /// Unknown routes yield an empty set; callers must treat that as deny.
    pub fn lookup(&self, path: &str, method: &Method) -> &BTreeSet<String> {
        self.entries
            .get(&RouteKey::new(path, method.clone()))
            .unwrap_or(&NO_SCOPES)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Default)]
pub struct ScopePolicyTableBuilder {
    entries: Vec<(RouteKey, BTreeSet<String>)>,
}

impl ScopePolicyTableBuilder {
    pub fn entry<I, S>(mut self, path: &str, method: Method, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scopes = scopes.into_iter().map(Into::into).collect();
        self.entries.push((RouteKey::new(path, method), scopes));
        self
    }

    pub fn build(self) -> Result<ScopePolicyTable, PolicyTableError> {
        let mut entries = HashMap::with_capacity(self.entries.len());

        for (key, scopes) in self.entries {
            if scopes.is_empty() {
                return Err(PolicyTableError::EmptyScopes {
                    path: key.path,
                    method: key.method,
                });
            }
            if entries.contains_key(&key) {
                return Err(PolicyTableError::Duplicate {
                    path: key.path,
                    method: key.method,
                });
            }
            entries.insert(key, scopes);
        }

        Ok(ScopePolicyTable { entries })
    }
}

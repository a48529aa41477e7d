//! Bearer-token tenant resolution.
//!
//! Every `/v1` request carries `Authorization: Bearer <token>`; the token
//! resolves to a [`TenantContext`] which is injected into request extensions
//! and stamped into audit fields. Unknown or absent tokens get 401.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::error::AppError;
use super::state::AppState;
use crate::models::{TenantContext, TenantId};

/// One tenant entry in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantEntry {
    pub token: String,
    pub tenant_id: i64,
    pub name: String,
}

/// Tenants configuration file contents (`tenants.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantsConfig {
    #[serde(default)]
    pub tenant: Vec<TenantEntry>,
}

/// Token-to-tenant lookup table.
#[derive(Debug, Default)]
pub struct TenantRegistry {
    tokens: HashMap<String, TenantContext>,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configuration entries.
    pub fn from_entries(entries: impl IntoIterator<Item = TenantEntry>) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            registry.register(entry);
        }
        registry
    }

    /// Load from a `tenants.toml` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read tenants file: {}", e))?;
        let config: TenantsConfig =
            toml::from_str(&content).map_err(|e| format!("Failed to parse tenants file: {}", e))?;
        Ok(Self::from_entries(config.tenant))
    }

    /// Load from the `HERDBOOK_TENANTS` environment variable.
    ///
    /// Format: comma-separated `token:tenant_id:name` triples, e.g.
    /// `sk-north:1:clinic-north,sk-south:2:clinic-south`.
    pub fn from_env() -> Result<Self, String> {
        let raw = std::env::var("HERDBOOK_TENANTS")
            .map_err(|_| "HERDBOOK_TENANTS must be set".to_string())?;

        let mut entries = Vec::new();
        for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
            let fields: Vec<&str> = part.trim().splitn(3, ':').collect();
            if fields.len() != 3 {
                return Err(format!("Invalid tenant entry (want token:id:name): {}", part));
            }
            let tenant_id: i64 = fields[1]
                .parse()
                .map_err(|_| format!("Invalid tenant id in entry: {}", part))?;
            entries.push(TenantEntry {
                token: fields[0].to_string(),
                tenant_id,
                name: fields[2].to_string(),
            });
        }

        if entries.is_empty() {
            return Err("HERDBOOK_TENANTS contained no tenant entries".to_string());
        }
        Ok(Self::from_entries(entries))
    }

    /// Register one tenant token.
    pub fn register(&mut self, entry: TenantEntry) {
        self.tokens.insert(
            entry.token,
            TenantContext::new(TenantId::new(entry.tenant_id), format!("api:{}", entry.name)),
        );
    }

    /// Resolve a bearer token to its tenant context.
    pub fn resolve(&self, token: &str) -> Option<TenantContext> {
        self.tokens.get(token).cloned()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Axum middleware requiring a valid bearer token on the request.
pub async fn require_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let ctx = state
        .tenants
        .resolve(token)
        .ok_or_else(|| AppError::Unauthorized("Unknown bearer token".to_string()))?;

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolution() {
        let registry = TenantRegistry::from_entries([TenantEntry {
            token: "sk-north".to_string(),
            tenant_id: 7,
            name: "clinic-north".to_string(),
        }]);

        let ctx = registry.resolve("sk-north").unwrap();
        assert_eq!(ctx.tenant_id.value(), 7);
        assert_eq!(ctx.principal, "api:clinic-north");
        assert!(registry.resolve("sk-unknown").is_none());
    }

    #[test]
    fn test_config_file_format() {
        let toml = r#"
[[tenant]]
token = "sk-north"
tenant_id = 1
name = "clinic-north"

[[tenant]]
token = "sk-south"
tenant_id = 2
name = "clinic-south"
"#;
        let config: TenantsConfig = toml::from_str(toml).unwrap();
        let registry = TenantRegistry::from_entries(config.tenant);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("sk-south").unwrap().tenant_id.value(), 2);
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of the institution that owns a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Proof that a caller has been bound to exactly one tenant.
///
/// Repository methods take `&TenantScope` rather than a raw id, so an
/// unscoped query cannot be written. A scope can only be built from a
/// non-empty identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    tenant: TenantId,
}

impl TenantScope {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TenantError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TenantError::Missing);
        }
        if trimmed
            .chars()
            .any(|ch| ch.is_whitespace() || ch.is_control())
        {
            return Err(TenantError::Malformed(trimmed.to_string()));
        }

        Ok(Self {
            tenant: TenantId(trimmed.to_string()),
        })
    }

    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    pub fn owns(&self, tenant: &TenantId) -> bool {
        &self.tenant == tenant
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TenantError {
    #[error("tenant scope is required")]
    Missing,
    #[error("tenant identifier '{0}' is malformed")]
    Malformed(String),
}

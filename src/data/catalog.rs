use serde::Deserialize;

// ---------------------------------------------------------------------------
// CKAN `package_show` response
// ---------------------------------------------------------------------------

/// Envelope returned by `/api/3/action/package_show`.
///
/// ```json
/// { "success": true, "result": { "resources": [ { "id": "…", "datastore_active": true } ] } }
/// { "success": false, "error": { "__type": "Not Found Error", "message": "Not found" } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PackageShowResponse {
    pub success: bool,
    #[serde(default)]
    pub result: Option<CatalogEntry>,
    #[serde(default)]
    pub error: Option<CatalogError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogError {
    #[serde(rename = "__type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        self.kind == "Not Found Error"
    }
}

/// Metadata for one dataset: its resources in catalog order.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDescriptor {
    pub id: String,
    /// Only datastore-backed resources have a bulk dump.
    #[serde(rename = "datastore_active", default)]
    pub queryable: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

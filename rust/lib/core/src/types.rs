use serde::{Deserialize, Serialize};

/// Pagination for list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Hard ceiling on a single page.
pub const MAX_LIMIT: usize = 500;

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl ListParams {
    /// `limit` clamped to `1..=MAX_LIMIT`.
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIMIT)
    }
}

/// One page of a list operation plus the unpaginated total.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult<T: Serialize> {
    pub items: Vec<T>,
    pub total: usize,
}

/// New random record id (UUIDv4 without dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Current UTC time as RFC 3339.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Apply an RFC 7386 JSON merge patch to `base`.
///
/// `null` removes the key, objects merge recursively, anything else
/// replaces.
pub fn merge_patch(base: &mut serde_json::Value, patch: &serde_json::Value) {
    match (base.as_object_mut(), patch.as_object()) {
        (Some(base_obj), Some(patch_obj)) => {
            for (key, value) in patch_obj {
                if value.is_null() {
                    base_obj.remove(key);
                } else if value.is_object() {
                    let entry = base_obj
                        .entry(key.clone())
                        .or_insert_with(|| serde_json::Value::Object(Default::default()));
                    merge_patch(entry, value);
                } else {
                    base_obj.insert(key.clone(), value.clone());
                }
            }
        }
        _ => *base = patch.clone(),
    }
}

/// Remove caller-protected keys from a patch object before merging.
pub fn strip_fields(patch: &mut serde_json::Value, fields: &[&str]) {
    if let Some(obj) = patch.as_object_mut() {
        for field in fields {
            obj.remove(*field);
        }
    }
}

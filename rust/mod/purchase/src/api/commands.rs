//! Vendor list encodings accepted on RFQ creation.
//!
//! Clients send the candidate vendors either as a plain list of ids or as a
//! list of relation commands:
//!
//! ```text
//! ["v1", "v2"]                   link each id
//! [[6, 0, ["v1", "v2"]]]         replace the whole set
//! [[4, "v3"]]                    link one id
//! ```
//!
//! Everything is flattened here into an ordered list of unique ids before
//! it reaches the service.

use serde_json::Value;

use openerp_core::ServiceError;

use crate::service::rfq::dedup_ids;

const REPLACE_ALL: u64 = 6;
const LINK: u64 = 4;

fn id_of(value: &Value) -> Result<String, ServiceError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ServiceError::Validation(format!(
            "invalid vendor id {other}"
        ))),
    }
}

fn apply_command(ids: &mut Vec<String>, command: &[Value]) -> Result<(), ServiceError> {
    let code = command.first().and_then(Value::as_u64);
    match code {
        Some(REPLACE_ALL) => {
            let set = command
                .get(2)
                .and_then(Value::as_array)
                .ok_or_else(|| ServiceError::Validation("replace command needs an id list".into()))?;
            ids.clear();
            for value in set {
                ids.push(id_of(value)?);
            }
        }
        Some(LINK) => {
            let value = command
                .get(1)
                .ok_or_else(|| ServiceError::Validation("link command needs an id".into()))?;
            ids.push(id_of(value)?);
        }
        _ => {
            return Err(ServiceError::Validation(format!(
                "unsupported vendor command {}",
                Value::Array(command.to_vec())
            )))
        }
    }
    Ok(())
}

/// Flatten a vendor list payload to ordered, de-duplicated ids.
pub fn normalize_vendor_ids(value: &Value) -> Result<Vec<String>, ServiceError> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(ServiceError::Validation(format!(
                "vendorIds must be a list, got {other}"
            )))
        }
    };

    let mut ids = Vec::new();
    for item in items {
        match item {
            Value::Array(command) => apply_command(&mut ids, command)?,
            plain => ids.push(id_of(plain)?),
        }
    }
    Ok(dedup_ids(&ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_ids() {
        let ids = normalize_vendor_ids(&json!(["v1", "v2", "v1"])).unwrap();
        assert_eq!(ids, vec!["v1", "v2"]);
    }

    #[test]
    fn commands() {
        let ids = normalize_vendor_ids(&json!([[4, "v0"], [6, 0, ["v1", "v2"]], [4, "v3"], [4, 7]])).unwrap();
        assert_eq!(ids, vec!["v1", "v2", "v3", "7"]);
    }

    #[test]
    fn missing_is_empty() {
        assert!(normalize_vendor_ids(&Value::Null).unwrap().is_empty());
        assert!(normalize_vendor_ids(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(normalize_vendor_ids(&json!([[3, "v1"]])).is_err());
        assert!(normalize_vendor_ids(&json!([[6, 0]])).is_err());
        assert!(normalize_vendor_ids(&json!("v1")).is_err());
        assert!(normalize_vendor_ids(&json!([true])).is_err());
    }
}

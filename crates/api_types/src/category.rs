use serde::{Deserialize, Serialize};

use crate::{FieldErrors, field_error};

/// A transaction category. Categories form a tree through `parent_id`; the
/// API does not guarantee the tree is acyclic and neither does this layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Hex color code, e.g. `#FF5733`.
    pub color: Option<String>,
    pub parent_id: Option<i64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CategoryNew {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

impl CategoryNew {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        if self.name.trim().is_empty() {
            return Err(field_error("name", "can't be blank"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_fails_validation() {
        let draft = CategoryNew {
            name: String::new(),
            color: None,
            parent_id: None,
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn optional_fields_are_omitted_from_the_body() {
        let draft = CategoryNew {
            name: "Mercado".to_string(),
            color: None,
            parent_id: None,
        };
        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body, serde_json::json!({"name": "Mercado"}));
    }
}

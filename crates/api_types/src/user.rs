use serde::{Deserialize, Serialize};

/// The account owner. Read-only resource.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Option<String>,
}

use serde::{Deserialize, Serialize};

// ========== USER ==========
/// Stored user record, as read back for permission checks.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub email: String,
    pub role: Option<String>, // "admin" or absent
}

#[derive(Debug, Deserialize)]
pub struct MakeAdminRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AdminStatusResponse {
    pub admin: bool,
}

// ========== PRODUCT ==========
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub image: Option<serde_json::Value>,
    pub title: Option<serde_json::Value>,
    pub price: Option<serde_json::Value>,
    pub desc: Option<serde_json::Value>,
    pub rating: Option<serde_json::Value>,
    pub reviews: Option<serde_json::Value>,
}

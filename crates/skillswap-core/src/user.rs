// User profile types
//
// Only what the coordination layer needs: a display name for notifications
// and an active flag for reviewee checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateUser {
    #[cfg_attr(feature = "openapi", schema(example = "Asha Rao"))]
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(example = "asha@campus.edu"))]
    pub email: String,
    #[serde(default)]
    pub student_id: Option<String>,
}

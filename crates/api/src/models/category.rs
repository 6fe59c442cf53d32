//! Category domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use gxi_core::CategoryId;

/// A catalog category.
///
/// Names are unique under case-insensitive comparison; the store enforces
/// this with a `lower(name)` unique index.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::proto;
use crate::shared::query::NamedQuery;

/// Column list shared by every category SELECT
pub const CATEGORY_COLUMNS: &str = "id, name, parent, created_at, updated_at";

/// Database model for category
#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub parent: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Category row from a list query, carrying the window count
#[derive(Debug, Clone, FromRow)]
pub struct CategoryListRow {
    pub total_count: i64,
    #[sqlx(flatten)]
    pub category: CategoryRow,
}

impl From<CategoryRow> for proto::Category {
    fn from(c: CategoryRow) -> Self {
        Self {
            id: c.id,
            name: c.name,
            parent: c.parent.unwrap_or_default(),
            created_at: c.created_at.to_string(),
            updated_at: c.updated_at.to_string(),
        }
    }
}

/// Columns an `UpdatePatch` call may touch. `None` leaves the column as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub parent: Option<String>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent.is_none()
    }

    /// Bind the present fields under their column names.
    pub fn into_fields(self) -> NamedQuery {
        let mut fields = NamedQuery::new();
        if let Some(name) = self.name {
            fields = fields.bind("name", name);
        }
        if let Some(parent) = self.parent {
            fields = fields.bind("parent", parent);
        }
        fields
    }
}

impl From<proto::UpdatePatchCategory> for CategoryPatch {
    fn from(req: proto::UpdatePatchCategory) -> Self {
        Self {
            name: req.name,
            parent: req.parent,
        }
    }
}

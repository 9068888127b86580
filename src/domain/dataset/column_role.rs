// ============================================================
// COLUMN ROLE
// ============================================================
// Decides which statistics and insight rules apply to a column

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    /// Every sampled value is a number or missing, and at least one is a number
    Numeric,

    /// At least one sampled value is text
    Categorical,

    /// Nothing to go on (all-missing column or no rows)
    Unclassified,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnRole::Numeric => write!(f, "Numeric"),
            ColumnRole::Categorical => write!(f, "Categorical"),
            ColumnRole::Unclassified => write!(f, "Unclassified"),
        }
    }
}

/// Roles for every column of a dataset, in schema order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    entries: Vec<(String, ColumnRole)>,
}

impl ColumnRoles {
    pub fn new(entries: Vec<(String, ColumnRole)>) -> Self {
        Self { entries }
    }

    pub fn role_of(&self, column: &str) -> Option<ColumnRole> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, role)| *role)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnRole)> + '_ {
        self.entries.iter().map(|(name, role)| (name.as_str(), *role))
    }

    pub fn numeric(&self) -> Vec<&str> {
        self.with_role(ColumnRole::Numeric)
    }

    pub fn categorical(&self) -> Vec<&str> {
        self.with_role(ColumnRole::Categorical)
    }

    fn with_role(&self, role: ColumnRole) -> Vec<&str> {
        self.iter()
            .filter(|(_, r)| *r == role)
            .map(|(name, _)| name)
            .collect()
    }
}

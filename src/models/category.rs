use serde::{Deserialize, Serialize};

use super::TransactionType;

/// Closed set of transaction categories.
///
/// Variant order is significant: it is the tie-break order used when ranking
/// categories (keyword prediction, per-category totals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Housing,
    Transportation,
    Food,
    Utilities,
    Insurance,
    Healthcare,
    Savings,
    Personal,
    Entertainment,
    Other,
    Salary,
    Business,
    Investment,
    Gift,
}

impl Category {
    pub const COUNT: usize = 14;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Housing => "housing",
            Self::Transportation => "transportation",
            Self::Food => "food",
            Self::Utilities => "utilities",
            Self::Insurance => "insurance",
            Self::Healthcare => "healthcare",
            Self::Savings => "savings",
            Self::Personal => "personal",
            Self::Entertainment => "entertainment",
            Self::Other => "other",
            Self::Salary => "salary",
            Self::Business => "business",
            Self::Investment => "investment",
            Self::Gift => "gift",
        }
    }

    /// Case-insensitive lookup. Unknown labels yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::all().iter().copied().find(|c| c.as_str() == lower)
    }

    pub fn parse_or_other(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::Other)
    }

    pub fn all() -> &'static [Category] {
        &[
            Self::Housing,
            Self::Transportation,
            Self::Food,
            Self::Utilities,
            Self::Insurance,
            Self::Healthcare,
            Self::Savings,
            Self::Personal,
            Self::Entertainment,
            Self::Other,
            Self::Salary,
            Self::Business,
            Self::Investment,
            Self::Gift,
        ]
    }

    /// The transaction type this category is normally recorded under.
    pub fn usual_type(&self) -> TransactionType {
        match self {
            Self::Salary | Self::Business | Self::Investment | Self::Gift => TransactionType::Income,
            _ => TransactionType::Expense,
        }
    }

    /// Categories offered when recording a transaction of the given type.
    /// `other` is offered for both.
    pub fn for_type(kind: TransactionType) -> Vec<Category> {
        Self::all()
            .iter()
            .copied()
            .filter(|c| *c == Self::Other || c.usual_type() == kind)
            .collect()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Category
//!
//! Closed set of aisle categories an item can belong to.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    Produce,
    Dairy,
    Meat,
    Bakery,
    Pantry,
    Frozen,
    Household,
    /// Catch-all for unspecified or unknown tags
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Produce,
        Category::Dairy,
        Category::Meat,
        Category::Bakery,
        Category::Pantry,
        Category::Frozen,
        Category::Household,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Produce => "produce",
            Category::Dairy => "dairy",
            Category::Meat => "meat",
            Category::Bakery => "bakery",
            Category::Pantry => "pantry",
            Category::Frozen => "frozen",
            Category::Household => "household",
            Category::Other => "other",
        }
    }

    /// Parse a tag; anything unrecognised falls back to `Other`.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "produce" => Category::Produce,
            "dairy" => Category::Dairy,
            "meat" => Category::Meat,
            "bakery" => Category::Bakery,
            "pantry" => Category::Pantry,
            "frozen" => Category::Frozen,
            "household" => Category::Household,
            _ => Category::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Produce => "🥕 Produce",
            Category::Dairy => "🥛 Dairy",
            Category::Meat => "🥩 Meat",
            Category::Bakery => "🍞 Bakery",
            Category::Pantry => "🥫 Pantry",
            Category::Frozen => "🧊 Frozen",
            Category::Household => "🧽 Household",
            Category::Other => "📦 Other",
        }
    }

    /// Accent color (hex)
    pub fn color(&self) -> &'static str {
        match self {
            Category::Produce => "#4CAF50",
            Category::Dairy => "#2196F3",
            Category::Meat => "#F44336",
            Category::Bakery => "#FF9800",
            Category::Pantry => "#9C27B0",
            Category::Frozen => "#00BCD4",
            Category::Household => "#795548",
            Category::Other => "#607D8B",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Category::from_str(&tag))
    }
}

/// Category filter applied by the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// `"all"` (or empty) selects everything, any other tag one category.
    pub fn from_str(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(Category::from_str(s))
        }
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

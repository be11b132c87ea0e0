//! Legacy export categories and their processing order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Products,
    Branches,
    Inventory,
    Waste,
    Purchases,
    Invoices,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Branches => "branches",
            Self::Inventory => "inventory",
            Self::Waste => "waste",
            Self::Purchases => "purchases",
            Self::Invoices => "invoices",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "products" => Some(Self::Products),
            "branches" => Some(Self::Branches),
            "inventory" => Some(Self::Inventory),
            "waste" => Some(Self::Waste),
            "purchases" => Some(Self::Purchases),
            "invoices" => Some(Self::Invoices),
            _ => None,
        }
    }

    /// All categories in import order. Inventory, waste and purchases reference
    /// products and branches, so those two come first.
    pub fn all() -> &'static [Self] {
        &[
            Self::Products,
            Self::Branches,
            Self::Inventory,
            Self::Waste,
            Self::Purchases,
            Self::Invoices,
        ]
    }

    /// Display label used in CLI summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Products => "Products",
            Self::Branches => "Branches",
            Self::Inventory => "Inventory",
            Self::Waste => "Waste",
            Self::Purchases => "Purchases",
            Self::Invoices => "Invoices",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_round_trips_all() {
        for c in Category::all() {
            assert_eq!(Category::from_str(c.as_str()), Some(*c));
        }
    }

    #[test]
    fn from_str_is_case_sensitive() {
        assert_eq!(Category::from_str("Products"), None);
        assert_eq!(Category::from_str("settings"), None);
    }

    #[test]
    fn references_come_after_products_and_branches() {
        let order = Category::all();
        let pos = |c: Category| order.iter().position(|x| *x == c).unwrap();
        assert!(pos(Category::Products) < pos(Category::Inventory));
        assert!(pos(Category::Branches) < pos(Category::Inventory));
        assert!(pos(Category::Branches) < pos(Category::Invoices));
    }
}

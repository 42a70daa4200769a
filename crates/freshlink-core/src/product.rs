#![forbid(unsafe_code)]

//! Catalog reference data.
//!
//! Products are read-only for the lifetime of a screen. The catalog is
//! currently a fixed table rather than a fetched document set, so it lives
//! here as plain data in declaration order — the buyer screen's visible list
//! is required to preserve that order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Pricing unit for a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    PerLb,
    Each,
    PerBunch,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerLb => write!(f, "per lb"),
            Self::Each => write!(f, "each"),
            Self::PerBunch => write!(f, "per bunch"),
        }
    }
}

/// Product category. Mirrors the chips on the buyer screen; the "All" filter
/// is not a category, it is the absence of one (see the app crate's filter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Vegetables,
    Fruits,
    Herbs,
    Organic,
}

impl Category {
    /// All categories in chip order.
    pub const ALL: [Category; 4] = [
        Category::Vegetables,
        Category::Fruits,
        Category::Herbs,
        Category::Organic,
    ];

    /// Stable lookup key, also used as an i18n key suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vegetables => "Vegetables",
            Self::Fruits => "Fruits",
            Self::Herbs => "Herbs",
            Self::Organic => "Organic",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single catalog entry.
///
/// Prices are integer cents; the source data is a decimal quantity like
/// `2.99` and floats are the wrong representation for money.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price_cents: u32,
    pub unit: Unit,
    pub category: Category,
    /// Star rating in `[0, 5]`.
    pub rating: f32,
    pub in_stock: bool,
    pub farmer_name: String,
}

impl Product {
    fn new(
        id: u32,
        name: &str,
        price_cents: u32,
        unit: Unit,
        category: Category,
        rating: f32,
        in_stock: bool,
        farmer_name: &str,
    ) -> Self {
        Self {
            id: ProductId(id),
            name: name.to_string(),
            price_cents,
            unit,
            category,
            rating,
            in_stock,
            farmer_name: farmer_name.to_string(),
        }
    }

    /// Price formatted for display, e.g. `$2.99`.
    pub fn price_display(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

/// The demo catalog shown on the buyer screen, in declaration order.
pub fn demo_catalog() -> Vec<Product> {
    vec![
        Product::new(
            1,
            "Fresh Broccoli",
            299,
            Unit::PerLb,
            Category::Vegetables,
            4.5,
            true,
            "Green Valley Farm",
        ),
        Product::new(
            2,
            "Organic Avocado",
            149,
            Unit::Each,
            Category::Fruits,
            4.8,
            true,
            "Sunrise Orchard",
        ),
        Product::new(
            3,
            "Roma Tomatoes",
            349,
            Unit::PerLb,
            Category::Vegetables,
            4.3,
            true,
            "Hillside Growers",
        ),
        Product::new(
            4,
            "Red Bell Pepper",
            279,
            Unit::Each,
            Category::Vegetables,
            4.6,
            true,
            "Green Valley Farm",
        ),
        Product::new(
            5,
            "Fresh Spinach",
            229,
            Unit::PerBunch,
            Category::Vegetables,
            4.4,
            true,
            "Riverbend Gardens",
        ),
        Product::new(
            6,
            "Organic Carrots",
            199,
            Unit::PerLb,
            Category::Vegetables,
            4.7,
            false,
            "Sunrise Orchard",
        ),
    ]
}

#![forbid(unsafe_code)]

//! Buyer-screen view-state.
//!
//! Ephemeral, per-session, never persisted: search text, the active
//! category chip, favorites, and cart quantities. Everything here is pure
//! local state — no operation performs I/O and none can fail. The whole
//! thing is reset when the buyer navigates away.

use ahash::{AHashMap, AHashSet};
use freshlink_core::{Category, Product, ProductId, demo_catalog};

/// The category chip row. "All" is the absence of a filter, not a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    fn admits(&self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => *only == category,
        }
    }
}

/// Holds the catalog (read-only reference data) and everything the buyer
/// has done to it this visit.
///
/// Invariant: every cart entry has quantity >= 1. A quantity that would
/// reach zero is removed, never stored.
pub struct CatalogView {
    products: Vec<Product>,
    search_query: String,
    active_category: CategoryFilter,
    favorites: AHashSet<ProductId>,
    cart: AHashMap<ProductId, u32>,
}

impl CatalogView {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            search_query: String::new(),
            active_category: CategoryFilter::All,
            favorites: AHashSet::new(),
            cart: AHashMap::new(),
        }
    }

    /// The built-in demo catalog.
    pub fn demo() -> Self {
        Self::new(demo_catalog())
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Replace the search text; the visible list is derived on demand.
    pub fn set_search_query(&mut self, text: impl Into<String>) {
        self.search_query = text.into();
    }

    pub fn active_category(&self) -> CategoryFilter {
        self.active_category
    }

    pub fn set_category(&mut self, filter: CategoryFilter) {
        self.active_category = filter;
    }

    /// Symmetric membership toggle: each call flips, two calls restore.
    pub fn toggle_favorite(&mut self, id: ProductId) {
        if !self.favorites.insert(id) {
            self.favorites.remove(&id);
        }
    }

    pub fn is_favorite(&self, id: ProductId) -> bool {
        self.favorites.contains(&id)
    }

    pub fn favorite_count(&self) -> usize {
        self.favorites.len()
    }

    /// Increment the cart quantity for `id`, inserting at 1.
    ///
    /// Returns whether the add was accepted: unknown ids and out-of-stock
    /// products are rejected without touching the cart, so stock-gating
    /// holds even if a stale view leaves the button enabled.
    pub fn add_to_cart(&mut self, id: ProductId) -> bool {
        let sellable = self
            .products
            .iter()
            .any(|p| p.id == id && p.in_stock);
        if !sellable {
            return false;
        }
        *self.cart.entry(id).or_insert(0) += 1;
        true
    }

    /// Decrement the cart quantity for `id`; the entry is deleted when the
    /// quantity reaches zero.
    pub fn remove_from_cart(&mut self, id: ProductId) {
        if let Some(quantity) = self.cart.get_mut(&id) {
            *quantity -= 1;
            if *quantity == 0 {
                self.cart.remove(&id);
            }
        }
    }

    pub fn quantity(&self, id: ProductId) -> u32 {
        self.cart.get(&id).copied().unwrap_or(0)
    }

    /// Sum of all cart quantities, derived on demand.
    pub fn cart_count(&self) -> u32 {
        self.cart.values().sum()
    }

    /// The products admitted by the current search text and category chip,
    /// in catalog declaration order. Matching is a case-insensitive
    /// substring test on the product name.
    pub fn visible_products(&self) -> Vec<&Product> {
        let needle = self.search_query.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .filter(|p| self.active_category.admits(p.category))
            .collect()
    }

    /// Clear every per-visit mutation. Called when the buyer screen
    /// unmounts; nothing survives to the next visit.
    pub fn reset(&mut self) {
        self.search_query.clear();
        self.active_category = CategoryFilter::All;
        self.favorites.clear();
        self.cart.clear();
    }
}

impl Default for CatalogView {
    fn default() -> Self {
        Self::demo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_view_shows_full_catalog_in_order() {
        let view = CatalogView::demo();
        let names: Vec<&str> = view
            .visible_products()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "Fresh Broccoli",
                "Organic Avocado",
                "Roma Tomatoes",
                "Red Bell Pepper",
                "Fresh Spinach",
                "Organic Carrots",
            ]
        );
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut view = CatalogView::demo();
        view.set_search_query("TOMATO");
        let names: Vec<&str> = view
            .visible_products()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Roma Tomatoes"]);
    }

    #[test]
    fn category_chip_narrows_the_list() {
        let mut view = CatalogView::demo();
        view.set_category(CategoryFilter::Only(Category::Fruits));
        let names: Vec<&str> = view
            .visible_products()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Organic Avocado"]);
    }

    #[test]
    fn search_and_category_compose() {
        let mut view = CatalogView::demo();
        view.set_search_query("fresh");
        view.set_category(CategoryFilter::Only(Category::Vegetables));
        let names: Vec<&str> = view
            .visible_products()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Fresh Broccoli", "Fresh Spinach"]);
    }

    #[test]
    fn empty_search_matches_everything() {
        let mut view = CatalogView::demo();
        view.set_search_query("no such produce");
        assert!(view.visible_products().is_empty());
        view.set_search_query("");
        assert_eq!(view.visible_products().len(), 6);
    }

    #[test]
    fn favorite_toggles_symmetrically() {
        let mut view = CatalogView::demo();
        let id = ProductId(3);
        view.toggle_favorite(id);
        assert!(view.is_favorite(id));
        view.toggle_favorite(id);
        assert!(!view.is_favorite(id));
    }

    #[test]
    fn add_to_cart_accumulates() {
        let mut view = CatalogView::demo();
        let id = ProductId(1);
        for _ in 0..4 {
            assert!(view.add_to_cart(id));
        }
        assert_eq!(view.quantity(id), 4);
        assert_eq!(view.cart_count(), 4);
    }

    #[test]
    fn cart_count_sums_across_products() {
        let mut view = CatalogView::demo();
        view.add_to_cart(ProductId(1));
        view.add_to_cart(ProductId(1));
        view.add_to_cart(ProductId(2));
        assert_eq!(view.cart_count(), 3);
    }

    #[test]
    fn out_of_stock_add_is_rejected() {
        let mut view = CatalogView::demo();
        // Organic Carrots is the out-of-stock demo entry.
        assert!(!view.add_to_cart(ProductId(6)));
        assert_eq!(view.cart_count(), 0);
    }

    #[test]
    fn unknown_product_add_is_rejected() {
        let mut view = CatalogView::demo();
        assert!(!view.add_to_cart(ProductId(999)));
        assert_eq!(view.cart_count(), 0);
    }

    #[test]
    fn removal_deletes_the_key_instead_of_storing_zero() {
        let mut view = CatalogView::demo();
        let id = ProductId(2);
        view.add_to_cart(id);
        view.add_to_cart(id);
        view.remove_from_cart(id);
        assert_eq!(view.quantity(id), 1);
        view.remove_from_cart(id);
        assert_eq!(view.quantity(id), 0);
        assert_eq!(view.cart_count(), 0);
        // Removing an absent entry stays a no-op.
        view.remove_from_cart(id);
        assert_eq!(view.quantity(id), 0);
    }

    #[test]
    fn reset_clears_every_mutation() {
        let mut view = CatalogView::demo();
        view.set_search_query("fresh");
        view.set_category(CategoryFilter::Only(Category::Fruits));
        view.toggle_favorite(ProductId(1));
        view.add_to_cart(ProductId(2));
        view.reset();
        assert_eq!(view.search_query(), "");
        assert_eq!(view.active_category(), CategoryFilter::All);
        assert_eq!(view.favorite_count(), 0);
        assert_eq!(view.cart_count(), 0);
        assert_eq!(view.visible_products().len(), 6);
    }

    proptest! {
        // Membership after N toggles is exactly N mod 2.
        #[test]
        fn favorite_parity(toggles in 0usize..32) {
            let mut view = CatalogView::demo();
            let id = ProductId(4);
            for _ in 0..toggles {
                view.toggle_favorite(id);
            }
            prop_assert_eq!(view.is_favorite(id), toggles % 2 == 1);
        }

        // N accepted adds always yield quantity N.
        #[test]
        fn add_n_times_quantity_is_n(adds in 1usize..64) {
            let mut view = CatalogView::demo();
            let id = ProductId(5);
            for _ in 0..adds {
                prop_assert!(view.add_to_cart(id));
            }
            prop_assert_eq!(view.quantity(id) as usize, adds);
        }

        // The cart never holds a zero-quantity entry, whatever the
        // interleaving of adds and removals.
        #[test]
        fn cart_never_stores_zero(ops in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut view = CatalogView::demo();
            let id = ProductId(1);
            for add in ops {
                if add {
                    view.add_to_cart(id);
                } else {
                    view.remove_from_cart(id);
                }
                let q = view.quantity(id);
                prop_assert!(q == 0 || view.cart_count() >= q);
                prop_assert_eq!(view.cart_count(), q);
            }
        }
    }
}

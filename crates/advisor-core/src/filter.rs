use crate::types::Product;

/// Current category and search term, as read from the input controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub category: String,
    pub term: String,
    /// False until the first category or search event; the grid shows the
    /// "choose a category" placeholder until then.
    pub applied: bool,
}

impl FilterState {
    /// Apply this state to a product list.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        filter_products(products, Some(&self.category), Some(&self.term))
    }
}

/// Narrow `products` by exact category and case-insensitive substring over
/// name, brand, and description. Empty or absent criteria are ignored, and
/// input order is preserved.
pub fn filter_products(
    products: &[Product],
    category: Option<&str>,
    term: Option<&str>,
) -> Vec<Product> {
    let category = category.filter(|c| !c.is_empty());
    let term = term.filter(|t| !t.is_empty()).map(|t| t.to_lowercase());

    products
        .iter()
        .filter(|p| category.map_or(true, |c| p.category == c))
        .filter(|p| match &term {
            Some(t) => matches_term(p, t),
            None => true,
        })
        .cloned()
        .collect()
}

/// `term` must already be lowercase.
fn matches_term(product: &Product, term: &str) -> bool {
    product.name.to_lowercase().contains(term)
        || product.brand.to_lowercase().contains(term)
        || product
            .description
            .as_ref()
            .map(|d| d.to_lowercase().contains(term))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn product(id: i64, name: &str, brand: &str, category: &str, desc: Option<&str>) -> Product {
        Product {
            id: ProductId::from(id),
            name: name.into(),
            brand: brand.into(),
            category: category.into(),
            image: format!("{}.png", id),
            description: desc.map(String::from),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Clay Mask", "X", "skincare", None),
            product(2, "Shine Serum", "Y", "haircare", None),
            product(3, "Night Cream", "Revitalift", "skincare", Some("Rich hydrating cream")),
            product(4, "Volume Mousse", "Elvive", "haircare", Some("Light HOLD for fine hair")),
        ]
    }

    fn ids(products: &[Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_category_only() {
        let catalog = vec![
            product(1, "Clay Mask", "X", "skincare", None),
            product(2, "Shine Serum", "Y", "haircare", None),
        ];
        let result = filter_products(&catalog, Some("skincare"), Some(""));
        assert_eq!(result, vec![catalog[0].clone()]);
    }

    #[test]
    fn test_no_criteria_returns_everything_in_order() {
        assert_eq!(ids(&filter_products(&catalog(), None, None)), vec!["1", "2", "3", "4"]);
        assert_eq!(ids(&filter_products(&catalog(), Some(""), Some(""))), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_term_matches_name_brand_and_description_case_insensitively() {
        assert_eq!(ids(&filter_products(&catalog(), None, Some("MASK"))), vec!["1"]);
        assert_eq!(ids(&filter_products(&catalog(), None, Some("elvive"))), vec!["4"]);
        assert_eq!(ids(&filter_products(&catalog(), None, Some("hydrating"))), vec!["3"]);
        assert_eq!(ids(&filter_products(&catalog(), None, Some("hold"))), vec!["4"]);
    }

    #[test]
    fn test_category_is_exact_match() {
        assert!(filter_products(&catalog(), Some("Skincare"), None).is_empty());
        assert!(filter_products(&catalog(), Some("skin"), None).is_empty());
    }

    #[test]
    fn test_filters_compose_in_any_order() {
        let all = catalog();
        for (cat, term) in [("skincare", "cream"), ("haircare", "s"), ("skincare", "zzz")] {
            let by_cat = filter_products(&all, Some(cat), None);
            let by_term = filter_products(&all, None, Some(term));
            let cat_then_term = filter_products(&by_cat, None, Some(term));
            let term_then_cat = filter_products(&by_term, Some(cat), None);
            let combined = filter_products(&all, Some(cat), Some(term));
            assert_eq!(cat_then_term, combined);
            assert_eq!(term_then_cat, combined);
        }
    }

    #[test]
    fn test_filter_state_apply() {
        let state = FilterState {
            category: "haircare".into(),
            term: "serum".into(),
            applied: true,
        };
        assert_eq!(ids(&state.apply(&catalog())), vec!["2"]);
    }
}

use crate::product::Product;

/// Number of products returned by the price ranking when no `n` is given.
pub const DEFAULT_TOP_N: usize = 5;

/// Select the `n` most expensive active products, price descending.
///
/// Ties keep their relative input order (stable sort).
pub fn top_by_price(products: Vec<Product>, n: usize) -> Vec<Product> {
    let mut active: Vec<Product> = products.into_iter().filter(Product::is_active).collect();
    active.sort_by(|a, b| b.price.cmp(&a.price));
    active.truncate(n);
    active
}

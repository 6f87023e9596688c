//! Display-title normalization.

const PRODUCT_SUFFIX: &str = " - Google ";

/// Strip a trailing `" - Google <Product>"` suffix from a tab title.
///
/// The product is a single word (no spaces) running to the end of the
/// title. "Google" is matched case-sensitively. Titles without the suffix
/// are returned unchanged.
pub fn strip_title(title: &str) -> &str {
    match title.rfind(PRODUCT_SUFFIX) {
        Some(idx) => {
            let product = &title[idx + PRODUCT_SUFFIX.len()..];
            if product.is_empty() || product.contains(' ') { title } else { &title[..idx] }
        }
        None => title,
    }
}

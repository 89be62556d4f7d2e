//! Turns free-text search into a predicate over transactions.

/// Matches transactions whose title or description contains the search text,
/// or whose price equals the search text when it is a number.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPredicate {
    /// The raw text to look for in titles and descriptions.
    text: String,
    /// The price to match exactly, set only when the whole search text is a number.
    price: Option<f64>,
}

impl SearchPredicate {
    /// Build a predicate from the search text the client sent.
    ///
    /// An empty search matches every transaction. The price branch is only
    /// added when the entire (trimmed) text parses as a finite number, so
    /// `"300"` also matches a price of 300 while `"300x"` is matched as text
    /// only.
    pub fn new(search: &str) -> Self {
        let price = match search.trim().parse::<f64>() {
            Ok(price) if price.is_finite() => Some(price),
            Ok(price) => {
                tracing::debug!("ignoring non-finite numeric search {price} for price matching");
                None
            }
            Err(_) => None,
        };

        Self {
            text: search.to_owned(),
            price,
        }
    }

    /// The search text as the client sent it.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The price to match exactly, if the search text is a number.
    pub fn price(&self) -> Option<f64> {
        self.price
    }

    /// Whether this predicate matches every transaction.
    pub fn matches_all(&self) -> bool {
        self.text.is_empty()
    }

    /// A `LIKE` pattern that matches the lowercased search text anywhere in
    /// a string.
    ///
    /// SQLite only folds ASCII case in `LIKE`, so the pattern must be matched
    /// against text that was lowercased the same way, e.g. the `title_folded`
    /// column. Use together with `ESCAPE '\'`.
    pub fn like_pattern(&self) -> String {
        format!("%{}%", escape_like_pattern(&self.text.to_lowercase()))
    }
}

/// Escape the `LIKE` wildcards in `text` so that it only matches literally.
///
/// Backslash is the escape character, so the query must use `ESCAPE '\'`.
pub fn escape_like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }

        escaped.push(c);
    }

    escaped
}

//! The API endpoints URIs.

/// The route for searching transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for the sales statistics of a month.
pub const STATISTICS: &str = "/api/statistics";
/// The route for the price histogram of a month.
pub const BAR_CHART: &str = "/api/bar-chart";
/// The route for the category distribution of a month.
pub const PIE_CHART: &str = "/api/pie-chart";
/// The route for every analytics view of a month in one response.
pub const COMBINED: &str = "/api/combined";

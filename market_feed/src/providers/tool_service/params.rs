use serde::Serialize;

/// Tool names exposed by the service.
pub mod tools {
    pub const STOCK_PRICE: &str = "get_stock_price";
    pub const COMPANY_NAME: &str = "get_company_name";
    pub const OPENING_PRICE: &str = "get_opening_price";
    pub const STOCK_NEWS: &str = "get_stock_news";
    pub const LIVE_DATA: &str = "get_live_data";
}

/// Arguments for every per-symbol tool.
#[derive(Clone, Debug, Serialize)]
pub struct SymbolArgs<'a> {
    pub symbol: &'a str,
}

/// Arguments for tools that take none (`{}` on the wire).
#[derive(Clone, Debug, Default, Serialize)]
pub struct NoArgs {}

/// Builds the invoke URL for `tool`.
pub fn invoke_url(base_url: &str, tool: &str) -> String {
    format!("{base_url}/tools/{tool}/invoke")
}

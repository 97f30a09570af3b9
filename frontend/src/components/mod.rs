pub mod charts;
pub mod dashboard;
pub mod hero;
pub mod indices;
pub mod price_chart;
pub mod rankings;
pub mod sparkline;
pub mod stock_detail;
pub mod stock_list;
pub mod timing;
pub mod watchlist;

/// Link to the detail page of `symbol`.
pub fn detail_href(symbol: &str) -> String {
    let encoded: String = js_sys::encode_uri_component(symbol).into();
    format!("/stocks/detail?s={encoded}")
}

//! Framework-free market data: snapshot parsing, formatting and the view
//! models the components render.

pub mod charts;
pub mod classify;
pub mod constants;
pub mod detail;
pub mod format;
pub mod hero;
pub mod ranking;
pub mod refresh;
pub mod source;
pub mod sparkline;
pub mod stock_list;
pub mod storage;
pub mod types;
pub mod watchlist;

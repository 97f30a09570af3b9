/// Refresh cadence shared by every page controller.
pub const POLL_INTERVAL_MS: u32 = 5 * 60 * 1000;
pub const RESIZE_DEBOUNCE_MS: u32 = 250;
pub const SEARCH_DEBOUNCE_MS: u32 = 300;
/// Repaint once the grid layout has settled after the first render.
pub const INITIAL_REPAINT_DELAY_MS: u32 = 100;

pub const SPARKLINE_MAX_WIDTH: f64 = 280.0;
pub const SPARKLINE_HEIGHT: f64 = 60.0;
pub const SPARKLINE_PADDING: f64 = 20.0;
pub const DEFAULT_SURFACE_WIDTH: f64 = 300.0;
pub const DEFAULT_SURFACE_HEIGHT: f64 = 150.0;

pub const PAGE_SIZE: usize = 50;
pub const PAGINATION_WINDOW: usize = 5;
pub const WATCHLIST_DISPLAY_LIMIT: usize = 5;
pub const RELATED_STOCKS_LIMIT: usize = 4;

pub const WATCHLIST_STORAGE_KEY: &str = "stock_watchlist";

pub const MISSING_VALUE: &str = "---";
pub const MISSING_PERCENT: &str = "-%";
pub const ERROR_TEXT: &str = "エラー";
pub const FETCH_ERROR_TEXT: &str = "データ取得エラー";
pub const NO_DATA_TEXT: &str = "データがありません";
pub const NO_MATCH_TEXT: &str = "該当する銘柄が見つかりません";
pub const LOADING_TEXT: &str = "読込中...";

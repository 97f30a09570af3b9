pub const DEFAULT_SNAPSHOT_ROOT: &str = "data";
pub const DEFAULT_DIST_DIR: &str = "frontend/dist";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

pub const DEFAULT_CHART_WIDTH: u32 = 120;
pub const DEFAULT_CHART_HEIGHT: u32 = 30;
pub const MIN_CHART_WIDTH: u32 = 40;
pub const MIN_CHART_HEIGHT: u32 = 10;

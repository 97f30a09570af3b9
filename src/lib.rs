pub mod chart;
pub mod check;
pub mod cli;
pub mod constants;
pub mod logging;
pub mod serve;
pub mod snapshot_dir;

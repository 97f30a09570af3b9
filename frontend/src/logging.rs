use log::Level;

#[cfg(debug_assertions)]
const CONSOLE_LEVEL: Level = Level::Debug;
#[cfg(not(debug_assertions))]
const CONSOLE_LEVEL: Level = Level::Info;

/// Route `log` records to the browser console. Safe to call more than once.
pub fn init_logging() {
    if console_log::init_with_level(CONSOLE_LEVEL).is_ok() {
        log::info!("dashboard frontend started, console level {CONSOLE_LEVEL}");
    }
}

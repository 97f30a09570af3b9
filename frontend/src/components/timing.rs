use gloo_timers::callback::{Interval, Timeout};
use leptos::*;

/// Trailing-edge debounce: each call replaces, and so cancels, the pending one.
#[derive(Clone, Copy)]
pub struct Debounce {
    delay_ms: u32,
    pending: StoredValue<Option<Timeout>>,
}

impl Debounce {
    pub fn new(delay_ms: u32) -> Self {
        let pending = store_value(None::<Timeout>);
        on_cleanup(move || {
            pending.try_update_value(|pending| pending.take());
        });
        Debounce { delay_ms, pending }
    }

    pub fn schedule(&self, action: impl FnOnce() + 'static) {
        self.pending
            .set_value(Some(Timeout::new(self.delay_ms, action)));
    }

    pub fn cancel(&self) {
        self.pending.set_value(None);
    }
}

/// Runs `tick` every `period_ms` until the owning component unmounts.
pub fn poll_every(period_ms: u32, tick: impl Fn() + 'static) {
    let interval = store_value(Some(Interval::new(period_ms, tick)));
    on_cleanup(move || {
        interval.try_update_value(|interval| interval.take());
        log::debug!("polling stopped");
    });
}

/// Runs `action` once after `delay_ms`, unless the component unmounts first.
pub fn run_after(delay_ms: u32, action: impl FnOnce() + 'static) {
    let timeout = store_value(Some(Timeout::new(delay_ms, action)));
    on_cleanup(move || {
        timeout.try_update_value(|timeout| timeout.take());
    });
}

use leptos::*;

use crate::market::refresh::{RefreshReport, SnapshotCache};

#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use crate::market::{
    constants::{INITIAL_REPAINT_DELAY_MS, POLL_INTERVAL_MS, RESIZE_DEBOUNCE_MS},
    refresh::RefreshController,
    source::HttpFetcher,
};

#[cfg(target_arch = "wasm32")]
use super::timing::{Debounce, poll_every, run_after};

use super::{
    charts::ChartsPanel, hero::HeroPanel, indices::IndicesPanel, rankings::RankingsPanel,
    watchlist::WatchlistPanel,
};

/// Last successful payload of every dashboard source.
#[derive(Clone, Copy)]
pub struct SnapshotSignal(pub RwSignal<SnapshotCache>);

#[derive(Clone, Copy)]
pub struct ReportSignal(pub RwSignal<RefreshReport>);

/// Bumped whenever sparklines should re-measure their container.
#[derive(Clone, Copy)]
pub struct RepaintSignal(pub RwSignal<u32>);

/// Landing page: index heroes, watchlist, world indices, 30-day charts and
/// rankings.
#[component]
pub fn Dashboard() -> impl IntoView {
    let cache = create_rw_signal(SnapshotCache::default());
    let report = create_rw_signal(RefreshReport::default());
    let repaint = create_rw_signal(0_u32);

    #[cfg(target_arch = "wasm32")]
    start_refresh(cache, report, repaint);

    provide_context(SnapshotSignal(cache));
    provide_context(ReportSignal(report));
    provide_context(RepaintSignal(repaint));

    view! {
        <div class="dashboard">
            <header class="dashboard__header">
                <h1>"マーケットダッシュボード"</h1>
                <nav class="dashboard__nav">
                    <a href="/stocks">"銘柄一覧"</a>
                </nav>
            </header>
            <HeroPanel />
            <section class="dashboard__body">
                <div class="dashboard__main">
                    <IndicesPanel />
                    <ChartsPanel />
                    <RankingsPanel />
                </div>
                <aside class="dashboard__sidebar">
                    <WatchlistPanel />
                </aside>
            </section>
        </div>
    }
}

#[cfg(target_arch = "wasm32")]
fn start_refresh(
    cache: RwSignal<SnapshotCache>,
    report: RwSignal<RefreshReport>,
    repaint: RwSignal<u32>,
) {
    let controller = Rc::new(RefreshController::new(HttpFetcher));
    let tick = move || {
        let controller = controller.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let latest = controller.refresh().await;
            // The page may have been left while the tick was in flight.
            cache.try_set(controller.cache());
            report.try_set(latest);
        });
    };
    tick();
    poll_every(POLL_INTERVAL_MS, tick);

    let bump = move || {
        repaint.try_update(|count| *count = count.wrapping_add(1));
    };
    run_after(INITIAL_REPAINT_DELAY_MS, bump);

    let resize = Debounce::new(RESIZE_DEBOUNCE_MS);
    let listener = window_event_listener(ev::resize, move |_| {
        resize.schedule(move || {
            log::debug!("resize settled, repainting sparklines");
            bump();
        });
    });
    on_cleanup(move || listener.remove());
}

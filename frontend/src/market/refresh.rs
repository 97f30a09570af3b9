use std::cell::RefCell;
use std::collections::HashMap;

use log::{debug, error, warn};

use super::hero::{HeroBoard, HeroOrigin};
use super::source::{FetchError, SnapshotFetcher, fetch_snapshot};
use super::types::{
    ExtendedRankings, MajorIndices, PeriodRankings, Rankings, RealtimeSnapshot, Snapshot,
    SummarySnapshot,
};

/// Independent regions of the dashboard, in the order a tick visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Hero,
    MajorIndices,
    Rankings,
    ExtendedRankings,
    PeriodRankings,
}

impl Source {
    pub const ORDER: [Source; 5] = [
        Source::Hero,
        Source::MajorIndices,
        Source::Rankings,
        Source::ExtendedRankings,
        Source::PeriodRankings,
    ];
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SourceStatus {
    #[default]
    Pending,
    Ready,
    Failed(FetchError),
}

impl SourceStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, SourceStatus::Failed(_))
    }
}

/// Last successfully parsed payload per source. Failures never clear a slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotCache {
    pub realtime: Option<RealtimeSnapshot>,
    pub summary: Option<SummarySnapshot>,
    pub hero_origin: Option<HeroOrigin>,
    pub major_indices: Option<MajorIndices>,
    pub rankings: Option<Rankings>,
    pub extended_rankings: Option<ExtendedRankings>,
    pub period_rankings: Option<PeriodRankings>,
}

impl SnapshotCache {
    /// Board rebuilt from whichever hero payload last succeeded.
    pub fn hero_board(&self) -> Option<HeroBoard> {
        match self.hero_origin? {
            HeroOrigin::Realtime => self.realtime.as_ref().map(HeroBoard::from_realtime),
            HeroOrigin::Summary => self.summary.as_ref().map(HeroBoard::from_summary),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub statuses: HashMap<Source, SourceStatus>,
}

impl RefreshReport {
    pub fn status(&self, source: Source) -> SourceStatus {
        self.statuses.get(&source).cloned().unwrap_or_default()
    }

    /// Cards to show for the current hero status.
    pub fn hero_view(&self, cache: &SnapshotCache) -> HeroBoard {
        match self.status(Source::Hero) {
            SourceStatus::Failed(_) => HeroBoard::failed(),
            _ => cache.hero_board().unwrap_or_else(HeroBoard::loading),
        }
    }
}

/// Page-owned refresh state: one fetcher, one cache, one status table.
pub struct RefreshController<F> {
    fetcher: F,
    cache: RefCell<SnapshotCache>,
    report: RefCell<RefreshReport>,
}

impl<F: SnapshotFetcher> RefreshController<F> {
    pub fn new(fetcher: F) -> Self {
        RefreshController {
            fetcher,
            cache: RefCell::new(SnapshotCache::default()),
            report: RefCell::new(RefreshReport::default()),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn cache(&self) -> SnapshotCache {
        self.cache.borrow().clone()
    }

    pub fn report(&self) -> RefreshReport {
        self.report.borrow().clone()
    }

    /// Runs one tick over every source. Overlapping ticks are not guarded;
    /// the last response to land wins.
    pub async fn refresh(&self) -> RefreshReport {
        self.refresh_hero().await;

        let indices = self.load::<MajorIndices>().await;
        self.store(Source::MajorIndices, indices, |cache, value| {
            cache.major_indices = Some(value)
        });

        let rankings = self.load::<Rankings>().await;
        self.store(Source::Rankings, rankings, |cache, value| {
            cache.rankings = Some(value)
        });

        let extended = self.load::<ExtendedRankings>().await;
        self.store(Source::ExtendedRankings, extended, |cache, value| {
            cache.extended_rankings = Some(value)
        });

        let periods = self.load::<PeriodRankings>().await;
        self.store(Source::PeriodRankings, periods, |cache, value| {
            cache.period_rankings = Some(value)
        });

        self.report()
    }

    /// Primary realtime quotes, falling back to the summary payload within
    /// the same tick.
    pub async fn refresh_hero(&self) -> SourceStatus {
        let status = match self.load::<RealtimeSnapshot>().await {
            Ok(snapshot) => {
                let mut cache = self.cache.borrow_mut();
                cache.realtime = Some(snapshot);
                cache.hero_origin = Some(HeroOrigin::Realtime);
                SourceStatus::Ready
            }
            Err(_) => match self.load::<SummarySnapshot>().await {
                Ok(snapshot) => {
                    let mut cache = self.cache.borrow_mut();
                    cache.summary = Some(snapshot);
                    cache.hero_origin = Some(HeroOrigin::Summary);
                    SourceStatus::Ready
                }
                Err(err) => {
                    error!("index quotes unavailable from every source: {err}");
                    SourceStatus::Failed(err)
                }
            },
        };
        self.set_status(Source::Hero, status.clone());
        status
    }

    async fn load<T: Snapshot>(&self) -> Result<T, FetchError> {
        let endpoint = T::endpoint();
        let result = fetch_snapshot::<T, F>(&self.fetcher).await;
        match &result {
            Ok(_) => debug!("refreshed {endpoint}"),
            Err(err) => warn!("fetch {endpoint} failed: {err}"),
        }
        result
    }

    fn store<T>(
        &self,
        source: Source,
        result: Result<T, FetchError>,
        apply: impl FnOnce(&mut SnapshotCache, T),
    ) {
        let status = match result {
            Ok(value) => {
                apply(&mut self.cache.borrow_mut(), value);
                SourceStatus::Ready
            }
            Err(err) => SourceStatus::Failed(err),
        };
        self.set_status(source, status);
    }

    fn set_status(&self, source: Source, status: SourceStatus) {
        self.report.borrow_mut().statuses.insert(source, status);
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::market::constants::ERROR_TEXT;
    use crate::market::hero::HeroKey;
    use crate::market::source::Endpoint;
    use crate::market::source::testing::MemoryFetcher;

    const REALTIME: &str = r#"{"timestamp": 1716359400, "indices": [{"ticker": "^N225", "current_price": 38000, "change": 5}], "foreign": []}"#;
    const SUMMARY: &str = r#"{"updatedAt": "2024-05-22T06:30:00Z", "indices": [
        {"symbol": "NIKKEI225", "price": 37900.5, "change": -20, "pct": -0.05, "spark": [3, 2, 1]}
    ]}"#;
    const INDICES: &str = r#"{"indices": {"us": {"^IXIC": {"price": 16000}}}}"#;
    const RANKINGS: &str = r#"{"rankings": {"gainers": [{"symbol": "AAA", "change_percent": 3.0}]}}"#;

    fn full_fetcher() -> MemoryFetcher {
        MemoryFetcher::default()
            .with(Endpoint::RealtimePrices, REALTIME)
            .with(Endpoint::Summary, SUMMARY)
            .with(Endpoint::MajorIndices, INDICES)
            .with(Endpoint::Rankings, RANKINGS)
            .with(Endpoint::ExtendedRankings, r#"{"rankings": {}}"#)
            .with(Endpoint::PeriodRankings, r#"{"periods": {}}"#)
    }

    #[test]
    fn sources_are_fetched_in_fixed_order() {
        let controller = RefreshController::new(full_fetcher());
        let report = block_on(controller.refresh());

        assert_eq!(
            controller.fetcher().requests(),
            vec![
                "/data/realtime_prices.json",
                "/api/major_indices.json",
                "/api/rankings.json",
                "/api/extended_rankings.json",
                "/api/period_rankings.json",
            ]
        );
        assert!(Source::ORDER.iter().all(|s| report.status(*s) == SourceStatus::Ready));
        assert_eq!(controller.cache().hero_origin, Some(HeroOrigin::Realtime));
    }

    #[test]
    fn primary_failure_falls_back_to_summary_once() {
        let fetcher = full_fetcher().failing(Endpoint::RealtimePrices, FetchError::Http(500));
        let controller = RefreshController::new(fetcher);
        let report = block_on(controller.refresh());

        assert_eq!(controller.fetcher().count(&Endpoint::Summary), 1);
        assert_eq!(report.status(Source::Hero), SourceStatus::Ready);

        let cache = controller.cache();
        assert_eq!(cache.hero_origin, Some(HeroOrigin::Summary));
        let board = report.hero_view(&cache);
        let nikkei = board.card(HeroKey::Nikkei).expect("nikkei card");
        assert_eq!(nikkei.price, "¥37,900.5");
        assert_eq!(nikkei.percent, "(-0.05%)");
        assert_eq!(board.updated, "最終更新: 05/22 15:30 JST");
    }

    #[test]
    fn summary_not_requested_when_primary_succeeds() {
        let controller = RefreshController::new(full_fetcher());
        block_on(controller.refresh());
        assert_eq!(controller.fetcher().count(&Endpoint::Summary), 0);
    }

    #[test]
    fn total_hero_failure_shows_error_without_blocking_siblings() {
        let fetcher = full_fetcher()
            .failing(Endpoint::RealtimePrices, FetchError::Network("offline".into()))
            .failing(Endpoint::Summary, FetchError::Http(503));
        let controller = RefreshController::new(fetcher);
        let report = block_on(controller.refresh());

        assert_eq!(
            report.status(Source::Hero),
            SourceStatus::Failed(FetchError::Http(503))
        );
        let board = report.hero_view(&controller.cache());
        assert!(board.cards.iter().all(|card| card.price == ERROR_TEXT));
        assert_eq!(report.status(Source::Rankings), SourceStatus::Ready);
        assert!(controller.cache().rankings.is_some());
    }

    #[test]
    fn failure_keeps_earlier_success() {
        let controller = RefreshController::new(full_fetcher());
        block_on(controller.refresh());

        controller
            .fetcher()
            .set(Endpoint::MajorIndices, Err(FetchError::Parse("truncated".into())));
        controller
            .fetcher()
            .set(Endpoint::Rankings, Ok("not json".to_string()));
        let report = block_on(controller.refresh());

        assert!(report.status(Source::MajorIndices).is_failed());
        assert!(report.status(Source::Rankings).is_failed());
        assert_eq!(report.status(Source::PeriodRankings), SourceStatus::Ready);

        let cache = controller.cache();
        assert!(cache.major_indices.is_some());
        let rankings = cache.rankings.expect("earlier rankings kept");
        assert_eq!(rankings.0.category("gainers").map(<[_]>::len), Some(1));
    }
}

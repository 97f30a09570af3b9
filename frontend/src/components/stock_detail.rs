use leptos::*;
use leptos_meta::Title;
use leptos_router::{use_location, use_query_map};
use log::warn;

use crate::market::classify::ChangeClass;
use crate::market::constants::LOADING_TEXT;
use crate::market::detail::{
    ChartPeriod, DetailState, IndicatorPanel, PredictionPanel, StockDetail, related_stocks,
    resolve_detail, series_for_period, symbol_from_location, watch_button_label,
};
use crate::market::format::format_price;
use crate::market::source::{HttpFetcher, fetch_snapshot};
use crate::market::storage::BrowserStore;
use crate::market::types::{ChartData, HistoricalData, MajorIndices, Snapshot, StockRecord};
use crate::market::watchlist::Watchlist;

use super::detail_href;
use super::price_chart::PriceChart;

/// Optional payloads degrade to "no chart" instead of failing the page.
async fn load_optional<T: Snapshot>() -> Option<T> {
    fetch_snapshot::<T, _>(&HttpFetcher)
        .await
        .map_err(|err| warn!("{} unavailable: {err}", T::endpoint()))
        .ok()
}

#[component]
pub fn StockDetailPage() -> impl IntoView {
    let query = use_query_map();
    let location = use_location();
    let symbol = create_memo(move |_| {
        let from_query = query.with(|query| query.get("s").cloned());
        location
            .pathname
            .with(|path| symbol_from_location(from_query.as_deref(), path))
    });

    let indices = create_local_resource(
        || (),
        |_| async { fetch_snapshot::<MajorIndices, _>(&HttpFetcher).await },
    );
    let historical = create_local_resource(|| (), |_| load_optional::<HistoricalData>());
    let charts = create_local_resource(|| (), |_| load_optional::<ChartData>());

    let state = create_memo(move |_| {
        let symbol = symbol.get();
        resolve_detail(symbol.as_deref(), indices.get().as_ref())
    });

    view! {
        <div class="stock-detail">
            <nav class="breadcrumb">
                <a href="/">"ホーム"</a>
                " › "
                <a href="/stocks">"銘柄一覧"</a>
                " › "
                <span>{move || symbol.get().unwrap_or_default()}</span>
            </nav>
            {move || match state.get() {
                DetailState::Loading => view! {
                    <div class="loading-overlay">{LOADING_TEXT}</div>
                }
                .into_view(),
                DetailState::Error(message) => view! {
                    <div class="error-overlay">
                        <p class="error-message">{message}</p>
                        <a href="/stocks" class="btn-secondary">"銘柄一覧へ戻る"</a>
                    </div>
                }
                .into_view(),
                DetailState::Ready(detail) => {
                    let related: Vec<StockRecord> = match indices.get() {
                        Some(Ok(indices)) => related_stocks(&indices, &detail.record)
                            .into_iter()
                            .cloned()
                            .collect(),
                        _ => Vec::new(),
                    };
                    view! {
                        <DetailBody detail=detail related=related historical=historical charts=charts />
                    }
                    .into_view()
                }
            }}
        </div>
    }
}

#[component]
fn DetailBody(
    detail: StockDetail,
    related: Vec<StockRecord>,
    historical: Resource<(), Option<HistoricalData>>,
    charts: Resource<(), Option<ChartData>>,
) -> impl IntoView {
    let symbol = detail.record.symbol.clone();
    let name = detail.name().to_string();
    let price = detail.price_section();
    let change_class = format!("price-change {}", price.class.css_class());

    let watched = create_rw_signal(Watchlist::load(BrowserStore).contains(&symbol));
    let toggle_symbol = symbol.clone();
    let on_toggle = move |_| match Watchlist::load(BrowserStore).toggle(&toggle_symbol) {
        Ok(now_watched) => watched.set(now_watched),
        Err(err) => warn!("watchlist update failed: {err}"),
    };

    let period = create_rw_signal(ChartPeriod::default());
    let chart_symbol = symbol.clone();
    let series = Signal::derive(move || {
        let period = period.get();
        series_for_period(
            &chart_symbol,
            period,
            historical.get().flatten().as_ref(),
            charts.get().flatten().as_ref(),
        )
    });
    let chart_name = name.clone();

    view! {
        <Title text=format!("{name} ({symbol})") />
        <header class="stock-header">
            <div>
                <h1 class="stock-name">{name.clone()}</h1>
                <span class="stock-symbol">{symbol.clone()}</span>
                <span class=format!("market-badge {}", detail.market.code())>
                    {detail.market.long_label()}
                </span>
                <span class=format!("tier-badge {}", detail.tier.as_str())>{detail.tier.label()}</span>
            </div>
            <p class="stock-updated">{detail.updated()}</p>
            <button
                class="watchlist-toggle"
                class:active=move || watched.get()
                on:click=on_toggle
            >
                "⭐ "
                <span class="watchlist-text">{move || watch_button_label(watched.get())}</span>
            </button>
        </header>

        <section class="price-section">
            <div class="current-price">{price.price}</div>
            <div class=change_class>
                <span>{price.change}</span>
                " "
                <span>{price.percent}</span>
            </div>
            <dl class="price-stats">
                <dt>"前日終値"</dt>
                <dd>{price.previous_close}</dd>
                <dt>"出来高"</dt>
                <dd>{price.volume}</dd>
                <dt>"52週高値"</dt>
                <dd>{price.week52_high}</dd>
                <dt>"52週安値"</dt>
                <dd>{price.week52_low}</dd>
            </dl>
        </section>

        <div class="chart-periods">
            {ChartPeriod::ALL
                .into_iter()
                .map(|option| {
                    view! {
                        <button
                            class="chart-period"
                            class:active=move || period.get() == option
                            on:click=move |_| period.set(option)
                        >
                            {option.label()}
                        </button>
                    }
                })
                .collect_view()}
        </div>
        <PriceChart name=chart_name period=period series=series />

        {detail.predictions().map(predictions_view)}
        {detail.indicators().map(indicators_view)}
        {related_view(related)}
    }
}

fn predictions_view(panel: PredictionPanel) -> impl IntoView {
    view! {
        <section class="predictions">
            <h2>"価格予測"</h2>
            {panel.ensemble.map(|ensemble| view! {
                <div class="prediction-ensemble">
                    <span class="prediction-value">{ensemble.value}</span>
                    <span class="prediction-confidence">{ensemble.confidence}</span>
                </div>
            })}
            <ul class="prediction-methods">
                {panel
                    .methods
                    .into_iter()
                    .map(|row| view! {
                        <li>
                            <span class="prediction-method">{row.label}</span>
                            <span class="prediction-value">{row.value}</span>
                            <span class="prediction-confidence">{row.confidence}</span>
                        </li>
                    })
                    .collect_view()}
            </ul>
        </section>
    }
}

fn indicators_view(panel: IndicatorPanel) -> impl IntoView {
    let labelled = |title: &'static str, reading: Option<(String, &'static str)>| {
        reading.map(|(value, signal)| view! {
            <div class="indicator">
                <h3>{title}</h3>
                <span class="indicator-value">{value}</span>
                <span class="indicator-signal">{signal}</span>
            </div>
        })
    };

    view! {
        <section class="indicators">
            <h2>"テクニカル指標"</h2>
            {panel.rsi.map(|rsi| view! {
                <div class="indicator">
                    <h3>"RSI (14)"</h3>
                    <span class="indicator-value">{rsi.value}</span>
                    <div class="rsi-bar">
                        <div
                            class="rsi-bar__fill"
                            style:width=rsi.width
                            style:background-color=rsi.color
                        ></div>
                    </div>
                </div>
            })}
            {labelled("移動平均 (20日)", panel.ma20)}
            {labelled("ボリンジャーバンド", panel.band)}
            {labelled("ボラティリティ", panel.volatility)}
        </section>
    }
}

fn related_view(related: Vec<StockRecord>) -> impl IntoView {
    (!related.is_empty()).then(|| {
        view! {
            <section class="related-stocks">
                <h2>"関連銘柄"</h2>
                <div class="related-stocks__grid">
                    {related
                        .into_iter()
                        .map(|record| {
                            let class = ChangeClass::of(record.change).css_class();
                            view! {
                                <a class=format!("related-stock-card {class}") href=detail_href(&record.symbol)>
                                    <strong>{record.display_name().to_string()}</strong>
                                    <span class="related-stock-card__symbol">{record.symbol.clone()}</span>
                                    <span>{format_price(record.price, record.market())}</span>
                                </a>
                            }
                        })
                        .collect_view()}
                </div>
            </section>
        }
    })
}

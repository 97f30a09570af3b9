use leptos::*;
use log::warn;

use crate::market::charts::{CHART_LOAD_ERROR_TEXT, ChartCard, ChartGrid, chart_grid};
use crate::market::constants::{LOADING_TEXT, NO_DATA_TEXT};
use crate::market::source::{HttpFetcher, fetch_snapshot};
use crate::market::types::ChartData;

use super::detail_href;
use super::sparkline::SparklineChart;

/// 30-day chart per ticker. Loaded once per visit; resize repaints reuse it.
#[component]
pub fn ChartsPanel() -> impl IntoView {
    let charts = create_local_resource(
        || (),
        |_| async {
            fetch_snapshot::<ChartData, _>(&HttpFetcher)
                .await
                .map_err(|err| {
                    warn!("chart data unavailable: {err}");
                    err
                })
        },
    );

    view! {
        <section class="stock-charts">
            <h2>"株価チャート"</h2>
            {move || match chart_grid(charts.get().as_ref()) {
                ChartGrid::Loading => view! {
                    <p class="stock-charts__status">{LOADING_TEXT}</p>
                }
                .into_view(),
                ChartGrid::Failed => view! {
                    <p class="stock-charts__status stock-charts__status--error">
                        {CHART_LOAD_ERROR_TEXT}
                    </p>
                }
                .into_view(),
                ChartGrid::Ready(cards) if cards.is_empty() => view! {
                    <p class="stock-charts__status">{NO_DATA_TEXT}</p>
                }
                .into_view(),
                ChartGrid::Ready(cards) => view! {
                    <div class="stock-charts__grid">
                        {cards.into_iter().map(chart_card).collect_view()}
                    </div>
                }
                .into_view(),
            }}
        </section>
    }
}

fn chart_card(card: ChartCard) -> impl IntoView {
    let input = card.sparkline_input();
    let change_class = format!("chart-card__change {}", card.class.css_class());

    view! {
        <article class="chart-container" data-ticker=card.ticker.clone()>
            <header class="chart-card__header">
                <a class="chart-card__title" href=detail_href(&card.ticker)>{card.title}</a>
                {card.range.map(|range| view! { <span class="chart-card__range">{range}</span> })}
            </header>
            <SparklineChart input=input />
            <footer class="chart-card__footer">
                <span class="chart-card__close">{card.last_close}</span>
                <span class=change_class>{card.window_change}</span>
            </footer>
        </article>
    }
}

use leptos::*;

use crate::market::ranking::{
    BASIC_CATEGORIES, Category, EXTENDED_CATEGORIES, PERIOD_CATEGORIES, PERIODS, RankingRow,
    RankingSection, RankingView, period_label, ranking_sections,
};
use crate::market::refresh::{SnapshotCache, Source};
use crate::market::types::RankingSet;

use super::dashboard::{ReportSignal, SnapshotSignal};
use super::detail_href;

#[component]
pub fn RankingsPanel() -> impl IntoView {
    let cache = use_context::<SnapshotSignal>().expect("snapshot cache context missing");
    let report = use_context::<ReportSignal>().expect("refresh report context missing");

    let sections_for = move |source: Source,
                             known: &'static [Category],
                             pick: fn(&SnapshotCache) -> Option<&RankingSet>| {
        create_memo(move |_| {
            report.0.with(|report| {
                cache
                    .0
                    .with(|cache| ranking_sections(&report.status(source), pick(cache), known))
            })
        })
    };

    let basic = sections_for(Source::Rankings, &BASIC_CATEGORIES, basic_set);
    let extended = sections_for(Source::ExtendedRankings, &EXTENDED_CATEGORIES, extended_set);

    let period = create_rw_signal(PERIODS[0].0);
    let period_sections = create_memo(move |_| {
        let key = period.get();
        report.0.with(|report| {
            cache.0.with(|cache| {
                ranking_sections(
                    &report.status(Source::PeriodRankings),
                    cache
                        .period_rankings
                        .as_ref()
                        .and_then(|periods| periods.period(key)),
                    &PERIOD_CATEGORIES,
                )
            })
        })
    });

    view! {
        <section class="rankings">
            <h2>"ランキング"</h2>
            <div class="rankings__grid">
                {move || basic.get().into_iter().map(section_view).collect_view()}
            </div>

            <h2>"期間別ランキング"</h2>
            <div class="rankings__tabs">
                {PERIODS
                    .into_iter()
                    .map(|(key, label)| {
                        view! {
                            <button
                                class="rankings__tab"
                                class:active=move || period.get() == key
                                on:click=move |_| period.set(key)
                            >
                                {label}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
            <p class="rankings__period">{move || period_label(period.get()).to_string()}</p>
            <div class="rankings__grid">
                {move || period_sections.get().into_iter().map(section_view).collect_view()}
            </div>

            <h2>"詳細ランキング"</h2>
            <div class="rankings__grid rankings__grid--extended">
                {move || extended.get().into_iter().map(section_view).collect_view()}
            </div>
        </section>
    }
}

fn basic_set(cache: &SnapshotCache) -> Option<&RankingSet> {
    cache.rankings.as_ref().map(|rankings| &rankings.0)
}

fn extended_set(cache: &SnapshotCache) -> Option<&RankingSet> {
    cache.extended_rankings.as_ref().map(|rankings| &rankings.0)
}

fn section_view(section: RankingSection) -> impl IntoView {
    let body = match section.view {
        RankingView::Rows(rows) => rows.into_iter().map(row_view).collect_view(),
        placeholder => {
            let text = placeholder.placeholder().unwrap_or_default();
            view! {
                <tr class="ranking__placeholder">
                    <td colspan="4">{text}</td>
                </tr>
            }
            .into_view()
        }
    };

    view! {
        <div class="ranking" id=format!("ranking-{}", section.key)>
            <h3>{section.title}</h3>
            <table class="ranking__table">
                <tbody>{body}</tbody>
            </table>
        </div>
    }
}

fn row_view(row: RankingRow) -> impl IntoView {
    let href = detail_href(&row.symbol);
    let class = format!("ranking__row {}", row.class.css_class());
    view! {
        <tr class=class>
            <td class="ranking__rank">{row.rank}</td>
            <td class="ranking__name">
                <a href=href>{row.name}</a>
                <span class="ranking__symbol">{row.symbol}</span>
            </td>
            <td class="ranking__primary">{row.primary}</td>
            <td class="ranking__secondary">{row.secondary}</td>
        </tr>
    }
}

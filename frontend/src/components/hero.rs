use leptos::*;

use crate::market::hero::HeroCard;

use super::dashboard::{ReportSignal, SnapshotSignal};
use super::detail_href;
use super::sparkline::SparklineChart;

#[component]
pub fn HeroPanel() -> impl IntoView {
    let cache = use_context::<SnapshotSignal>().expect("snapshot cache context missing");
    let report = use_context::<ReportSignal>().expect("refresh report context missing");

    let board = create_memo(move |_| {
        report
            .0
            .with(|report| cache.0.with(|cache| report.hero_view(cache)))
    });

    view! {
        <section class="hero">
            <div class="hero__cards">
                {move || {
                    board
                        .get()
                        .cards
                        .into_iter()
                        .map(|card| view! { <HeroCardView card=card /> })
                        .collect_view()
                }}
            </div>
            <p class="hero__updated">{move || board.get().updated}</p>
        </section>
    }
}

#[component]
fn HeroCardView(card: HeroCard) -> impl IntoView {
    let change_class = format!("hero-card__change {}", card.class.css_class());

    view! {
        <article class="hero-card">
            <header class="hero-card__header">
                <h2>{card.key.title()}</h2>
                <a class="btn-primary" href=detail_href(card.key.detail_symbol())>"詳細"</a>
            </header>
            <div class="hero-card__price">{card.price}</div>
            <div class=change_class>
                <span>{card.change}</span>
                " "
                <span>{card.percent}</span>
            </div>
            <div class="hero-card__chart">
                {card.sparkline.map(|input| view! { <SparklineChart input=input /> })}
            </div>
        </article>
    }
}

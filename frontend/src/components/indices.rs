use leptos::*;

use crate::market::constants::FETCH_ERROR_TEXT;
use crate::market::hero::{IndexTile, Region, international_tiles};
use crate::market::refresh::Source;

use super::dashboard::{ReportSignal, SnapshotSignal};
use super::detail_href;

#[component]
pub fn IndicesPanel() -> impl IntoView {
    let cache = use_context::<SnapshotSignal>().expect("snapshot cache context missing");
    let report = use_context::<ReportSignal>().expect("refresh report context missing");

    let tiles = create_memo(move |_| {
        cache
            .0
            .with(|cache| international_tiles(cache.major_indices.as_ref()))
    });
    let failed =
        move || report.0.with(|report| report.status(Source::MajorIndices).is_failed());

    view! {
        <section class="indices">
            <h2>"世界の主要指数"</h2>
            <Show when=failed>
                <p class="indices__error">{FETCH_ERROR_TEXT}</p>
            </Show>
            {move || {
                Region::ALL
                    .into_iter()
                    .map(|region| {
                        let region_tiles: Vec<IndexTile> = tiles.with(|tiles| {
                            tiles.iter().filter(|tile| tile.region == region).cloned().collect()
                        });
                        view! {
                            <div class="indices__region">
                                <h3>{region.title()}</h3>
                                <div class="indices__grid">
                                    {region_tiles.into_iter().map(tile_view).collect_view()}
                                </div>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </section>
    }
}

fn tile_view(tile: IndexTile) -> impl IntoView {
    let change_class = format!("index-tile__change {}", tile.class.css_class());
    view! {
        <a class="index-tile" id=tile.slot href=detail_href(tile.symbol)>
            <span class="index-tile__title">{tile.title}</span>
            <span class="index-tile__price">{tile.price}</span>
            <span class=change_class>{tile.change}</span>
        </a>
    }
}

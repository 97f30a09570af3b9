use leptos::*;
use leptos_router::use_query_map;
use log::{error, warn};

use crate::market::classify::{Market, Tier};
use crate::market::constants::{
    LOADING_TEXT, NO_DATA_TEXT, NO_MATCH_TEXT, POLL_INTERVAL_MS, SEARCH_DEBOUNCE_MS,
};
use crate::market::source::{FetchError, HttpFetcher, fetch_snapshot};
use crate::market::stock_list::{ListedStock, MarketFilter, SortKey, StockList, TierFilter};
use crate::market::storage::BrowserStore;
use crate::market::types::{StockIndex, Universe};
use crate::market::watchlist::Watchlist;

use super::detail_href;
use super::timing::{Debounce, poll_every};

const COLUMN_COUNT: &str = "9";

#[derive(Debug, Clone, PartialEq)]
enum ListStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Loads the index (and, on the first pass, the tier universe) into `list`.
/// A failed refresh keeps the rows already shown.
async fn load_stocks(list: RwSignal<StockList>, status: RwSignal<ListStatus>, with_universe: bool) {
    let index = fetch_snapshot::<StockIndex, _>(&HttpFetcher).await;
    let universe = if with_universe {
        fetch_snapshot::<Universe, _>(&HttpFetcher)
            .await
            .map_err(|err| warn!("universe unavailable, tiers default to other: {err}"))
            .ok()
    } else {
        None
    };

    match index {
        Ok(index) => {
            list.try_update(|list| list.load(index, universe));
            status.try_set(ListStatus::Ready);
        }
        Err(err) => {
            error!("stock index load failed: {err}");
            if status.get_untracked() != ListStatus::Ready {
                status.try_set(ListStatus::Failed(load_error_text(&err)));
            }
        }
    }
}

fn load_error_text(err: &FetchError) -> String {
    match err {
        FetchError::Http(status) => format!("データ取得エラー: {status}"),
        other => other.to_string(),
    }
}

/// The page's watchlist, read from storage once and shared by every row.
#[derive(Clone, Copy)]
struct WatchState {
    list: StoredValue<Watchlist<BrowserStore>>,
    symbols: RwSignal<Vec<String>>,
}

impl WatchState {
    fn load() -> Self {
        let list = Watchlist::load(BrowserStore);
        let symbols = create_rw_signal(list.symbols().to_vec());
        WatchState {
            list: store_value(list),
            symbols,
        }
    }

    fn contains(self, symbol: &str) -> bool {
        self.symbols.with(|symbols| symbols.iter().any(|watched| watched == symbol))
    }

    fn toggle(self, symbol: &str) {
        let result = self.list.try_update_value(|list| {
            list.toggle(symbol).map(|_| list.symbols().to_vec())
        });
        match result {
            Some(Ok(symbols)) => self.symbols.set(symbols),
            Some(Err(err)) => warn!("watchlist update failed: {err}"),
            None => {}
        }
    }
}

fn tier_option_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Other => "その他",
        tier => tier.label(),
    }
}

#[component]
pub fn StockListPage() -> impl IntoView {
    let query = use_query_map();
    let list = create_rw_signal(StockList::new());
    let status = create_rw_signal(ListStatus::Loading);

    let seeded_search = query.with_untracked(|query| {
        list.update(|list| {
            list.apply_query(
                query.get("filter").map(String::as_str),
                query.get("sort").map(String::as_str),
                query.get("q").map(String::as_str),
            )
        });
        query.get("q").cloned().unwrap_or_default()
    });
    let search_text = create_rw_signal(seeded_search);
    let search_debounce = Debounce::new(SEARCH_DEBOUNCE_MS);
    let header_anchor = create_node_ref::<html::Div>();
    let watch = WatchState::load();

    wasm_bindgen_futures::spawn_local(load_stocks(list, status, true));
    poll_every(POLL_INTERVAL_MS, move || {
        wasm_bindgen_futures::spawn_local(load_stocks(list, status, false));
    });

    let on_search = move |ev: ev::Event| {
        let text = event_target_value(&ev);
        search_text.set(text.clone());
        search_debounce.schedule(move || list.update(|list| list.set_search(&text)));
    };
    let on_clear = move |_| {
        search_debounce.cancel();
        search_text.set(String::new());
        list.update(|list| list.set_search(""));
    };

    let go_to = move |page: usize| {
        let moved = list.try_update(|list| list.go_to_page(page)).unwrap_or(false);
        if moved {
            if let Some(anchor) = header_anchor.get_untracked() {
                let options = web_sys::ScrollIntoViewOptions::new();
                options.set_behavior(web_sys::ScrollBehavior::Smooth);
                anchor.scroll_into_view_with_scroll_into_view_options(&options);
            }
        }
    };

    view! {
        <div class="stocks-page">
            <div class="stocks-header" node_ref=header_anchor>
                <h1>"銘柄一覧"</h1>
                <p class="stocks-count">
                    {move || list.with(|list| format!("{} / {} 銘柄", list.filtered_len(), list.total_len()))}
                </p>
            </div>

            <div class="stocks-controls">
                <div class="search-box">
                    <input
                        type="search"
                        id="stock-search"
                        placeholder="銘柄コード・銘柄名で検索"
                        prop:value=move || search_text.get()
                        on:input=on_search
                    />
                    <Show when=move || !search_text.with(String::is_empty)>
                        <button class="search-clear" on:click=on_clear>"×"</button>
                    </Show>
                </div>

                <select
                    id="market-filter"
                    prop:value=move || list.with(|list| list.market().as_str())
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        list.update(|list| list.set_market(MarketFilter::parse(&value)));
                    }
                >
                    <option value="all">"すべての市場"</option>
                    {Market::ALL
                        .into_iter()
                        .map(|market| view! { <option value=market.code()>{market.label()}</option> })
                        .collect_view()}
                </select>

                <select
                    id="tier-filter"
                    prop:value=move || list.with(|list| list.tier().as_str())
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        list.update(|list| list.set_tier(TierFilter::parse(&value)));
                    }
                >
                    <option value="all">"すべてのティア"</option>
                    {Tier::ALL
                        .into_iter()
                        .map(|tier| view! { <option value=tier.as_str()>{tier_option_label(tier)}</option> })
                        .collect_view()}
                </select>

                <select
                    id="sort-by"
                    prop:value=move || list.with(|list| list.sort_key().as_str())
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        if let Some(key) = SortKey::parse(&value) {
                            list.update(|list| {
                                let direction = list.direction();
                                list.set_sort(key, direction);
                            });
                        }
                    }
                >
                    {SortKey::ALL
                        .into_iter()
                        .map(|key| view! { <option value=key.as_str()>{key.label()}</option> })
                        .collect_view()}
                </select>
                <button
                    id="sort-direction"
                    on:click=move |_| list.update(StockList::toggle_direction)
                >
                    {move || list.with(|list| list.direction().label())}
                </button>
            </div>

            <table class="stocks-table">
                <thead>
                    <tr>
                        {[
                            SortKey::Symbol,
                            SortKey::Name,
                            SortKey::Market,
                            SortKey::Price,
                            SortKey::Change,
                            SortKey::Pct,
                            SortKey::Volume,
                        ]
                            .into_iter()
                            .map(|key| {
                                view! {
                                    <th
                                        class="sortable"
                                        class:sorted=move || list.with(|list| list.sort_key() == key)
                                        on:click=move |_| list.update(|list| list.sort_by_header(key))
                                    >
                                        {key.label()}
                                        {move || {
                                            list.with(|list| {
                                                (list.sort_key() == key)
                                                    .then(|| format!(" {}", list.direction().label()))
                                            })
                                        }}
                                    </th>
                                }
                            })
                            .collect_view()}
                        <th>"ティア"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody id="stocks-tbody">
                    {move || {
                        let placeholder = match status.get() {
                            ListStatus::Loading => Some(LOADING_TEXT.to_string()),
                            ListStatus::Failed(message) => Some(format!("❌ {message}")),
                            ListStatus::Ready => list.with(|list| {
                                if list.filtered_len() == 0 {
                                    Some(if list.total_len() == 0 { NO_DATA_TEXT } else { NO_MATCH_TEXT }.to_string())
                                } else {
                                    None
                                }
                            }),
                        };
                        match placeholder {
                            Some(text) => view! {
                                <tr>
                                    <td colspan=COLUMN_COUNT class="loading-cell">{text}</td>
                                </tr>
                            }
                            .into_view(),
                            None => list
                                .with(|list| list.page_items().cloned().collect::<Vec<_>>())
                                .into_iter()
                                .map(|stock| stock_row(stock, watch))
                                .collect_view(),
                        }
                    }}
                </tbody>
            </table>

            <Show when=move || list.with(|list| list.page_info().is_some())>
                <div class="pagination">
                    <span class="pagination-info">
                        {move || list.with(StockList::page_info).unwrap_or_default()}
                    </span>
                    <div class="pagination-controls">
                        <button
                            class="pagination-btn"
                            prop:disabled=move || list.with(|list| list.page() <= 1)
                            on:click=move |_| go_to(list.with_untracked(StockList::page).saturating_sub(1))
                        >
                            "‹ 前へ"
                        </button>
                        {move || {
                            let (window, current) = list.with(|list| (list.page_window(), list.page()));
                            window
                                .map(|page| {
                                    view! {
                                        <button
                                            class="pagination-btn"
                                            class:active=page == current
                                            on:click=move |_| go_to(page)
                                        >
                                            {page}
                                        </button>
                                    }
                                })
                                .collect_view()
                        }}
                        <button
                            class="pagination-btn"
                            prop:disabled=move || list.with(|list| list.page() >= list.total_pages())
                            on:click=move |_| go_to(list.with_untracked(StockList::page) + 1)
                        >
                            "次へ ›"
                        </button>
                    </div>
                </div>
            </Show>
        </div>
    }
}

fn stock_row(stock: ListedStock, watch: WatchState) -> impl IntoView {
    let symbol = stock.record.symbol.clone();
    let change_class = format!("number price-change {}", stock.class().css_class());
    let watched_symbol = symbol.clone();
    let toggle_symbol = symbol.clone();
    let on_toggle = move |_| watch.toggle(&toggle_symbol);

    view! {
        <tr class="stock-row">
            <td class="stock-symbol">{symbol.clone()}</td>
            <td class="stock-name">{stock.record.display_name().to_string()}</td>
            <td>
                <span class=format!("market-badge {}", stock.market.code())>{stock.market.label()}</span>
            </td>
            <td class="number">{stock.price_text()}</td>
            <td class=change_class.clone()>{stock.change_text()}</td>
            <td class=change_class>{stock.percent_text()}</td>
            <td class="number">{stock.volume_text()}</td>
            <td class="tier-col">
                <span class=format!("tier-badge {}", stock.tier.as_str())>{stock.tier.label()}</span>
            </td>
            <td>
                <div class="action-buttons">
                    <a href=detail_href(&symbol) class="btn-mini">"詳細"</a>
                    <button
                        class="btn-mini btn-watchlist"
                        class:active=move || watch.contains(&watched_symbol)
                        on:click=on_toggle
                    >
                        "⭐"
                    </button>
                </div>
            </td>
        </tr>
    }
}

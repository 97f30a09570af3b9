use leptos::*;

use crate::market::source::HttpFetcher;
use crate::market::storage::BrowserStore;
use crate::market::watchlist::{WatchQuote, Watchlist, resolve_quotes};

use super::dashboard::SnapshotSignal;
use super::detail_href;

const EMPTY_TEXT: &str = "ウォッチリストが空です";

#[component]
pub fn WatchlistPanel() -> impl IntoView {
    let cache = use_context::<SnapshotSignal>().expect("snapshot cache context missing");

    let symbols = Watchlist::load(BrowserStore).display_symbols().to_vec();
    let quotes = create_rw_signal(
        symbols
            .iter()
            .map(|symbol| WatchQuote::pending(symbol))
            .collect::<Vec<_>>(),
    );
    let has_symbols = !symbols.is_empty();

    // Re-resolve whenever a refresh tick lands new snapshots.
    create_effect(move |_| {
        let snapshot = cache.0.get();
        let symbols = symbols.clone();
        if symbols.is_empty() {
            return;
        }
        wasm_bindgen_futures::spawn_local(async move {
            let resolved = resolve_quotes(&HttpFetcher, &snapshot, &symbols).await;
            quotes.try_set(resolved);
        });
    });

    view! {
        <section class="watchlist">
            <h2>"ウォッチリスト"</h2>
            <Show
                when=move || has_symbols
                fallback=|| view! {
                    <div class="watchlist-empty">
                        <p>{EMPTY_TEXT}</p>
                        <a href="/stocks" class="btn-secondary">"銘柄を探す"</a>
                    </div>
                }
            >
                <div class="watchlist-items">
                    <For
                        each=move || quotes.get()
                        key=|quote| (quote.symbol.clone(), quote.price.clone(), quote.change.clone())
                        children=move |quote: WatchQuote| {
                            let change_class = format!("change {}", quote.class.css_class());
                            view! {
                                <a class="watchlist-item" href=detail_href(&quote.symbol)>
                                    <span class="symbol">{quote.symbol}</span>
                                    <span class="price">{quote.price}</span>
                                    <span class=change_class>{quote.change}</span>
                                </a>
                            }
                        }
                    />
                </div>
            </Show>
        </section>
    }
}

use leptos::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{Route, Router, Routes};
use wasm_bindgen::prelude::wasm_bindgen;

mod components;
mod logging;
pub mod market;

pub use components::dashboard::Dashboard;
pub use components::stock_detail::StockDetailPage;
pub use components::stock_list::StockListPage;
pub use logging::init_logging;
pub use market::refresh::{RefreshController, RefreshReport, SnapshotCache};
pub use market::source::{Endpoint, FetchError, SnapshotFetcher};
pub use market::types::{Snapshot, StockRecord};

/// Root component: page routing plus the document title.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="マーケットダッシュボード" />
        <Router>
            <main class="app-root">
                <Routes>
                    <Route path="/" view=Dashboard />
                    <Route path="/stocks" view=StockListPage />
                    <Route path="/stocks/detail" view=StockDetailPage />
                    <Route path="/stocks/:symbol" view=StockDetailPage />
                </Routes>
            </main>
        </Router>
    }
}

/// WASM entry point called automatically by `trunk`.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), wasm_bindgen::JsValue> {
    init_logging();
    console_error_panic_hook::set_once();

    leptos::mount_to_body(|| view! { <App /> });
    Ok(())
}

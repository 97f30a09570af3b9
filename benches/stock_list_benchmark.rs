use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use dashboard_frontend::market::classify::Market;
use dashboard_frontend::market::stock_list::{MarketFilter, SortDirection, SortKey, StockList};
use dashboard_frontend::market::types::{Snapshot, StockIndex, Universe};
use serde_json::json;

const STOCK_COUNT: usize = 4_000;

fn index_body() -> String {
    let stocks: Vec<_> = (0..STOCK_COUNT)
        .map(|i| {
            let symbol = if i % 3 == 0 {
                format!("TICK{i}")
            } else {
                format!("{}.T", 1300 + i)
            };
            json!({
                "symbol": symbol,
                "name": format!("銘柄 {i}"),
                "price": 1000.0 + (i as f64 * 7.3) % 900.0,
                "change": (i as f64 % 41.0) - 20.0,
                "change_percent": (i as f64 % 13.0) - 6.0,
                "volume": (i * 1_250) as f64,
            })
        })
        .collect();
    json!({ "stocks": stocks }).to_string()
}

fn universe_body() -> String {
    let core: Vec<_> = (0..STOCK_COUNT / 10)
        .map(|i| json!({ "ticker": format!("{}.T", 1301 + i * 3) }))
        .collect();
    json!({ "core_universe": core, "active_universe": [] }).to_string()
}

fn bench_stock_list(c: &mut Criterion) {
    let body = index_body();
    let universe = Universe::from_body(&universe_body()).expect("universe fixture");

    let mut group = c.benchmark_group("stock_list");
    group.throughput(Throughput::Elements(STOCK_COUNT as u64));

    group.bench_function("parse_and_load", |b| {
        b.iter(|| {
            let index = StockIndex::from_body(black_box(&body)).expect("index fixture");
            let mut list = StockList::new();
            list.load(index, Some(universe.clone()));
            black_box(list.filtered_len())
        });
    });

    let mut loaded = StockList::new();
    loaded.load(
        StockIndex::from_body(&body).expect("index fixture"),
        Some(universe.clone()),
    );

    group.bench_function("search_filter_sort", |b| {
        b.iter(|| {
            let mut list = loaded.clone();
            list.set_market(MarketFilter::Only(Market::Jp));
            list.set_search(black_box("銘柄 1"));
            list.set_sort(SortKey::Volume, SortDirection::Desc);
            black_box(list.page_items().count())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_stock_list);
criterion_main!(benches);

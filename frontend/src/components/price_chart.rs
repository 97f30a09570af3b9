use leptos::*;

use crate::market::detail::{ChartPeriod, PriceSeries, chart_title};

const CHART_WIDTH: f64 = 620.0;
const CHART_HEIGHT: f64 = 260.0;
/// Axis labels shown under the chart, first and last always included.
const AXIS_TICKS: usize = 6;

const PREPARING_TEXT: &str = "チャートデータを準備中です";

/// Line chart of one period's closes. `None` shows the preparing placeholder.
#[component]
pub fn PriceChart(
    #[prop(into)] name: MaybeSignal<String>,
    #[prop(into)] period: Signal<ChartPeriod>,
    #[prop(into)] series: Signal<Option<PriceSeries>>,
) -> impl IntoView {
    let geometry = create_memo(move |_| {
        series.with(|series| {
            series
                .as_ref()
                .and_then(|series| compute_chart_geometry(&series.values, CHART_WIDTH, CHART_HEIGHT))
        })
    });

    view! {
        <section class="price-chart">
            <h2 class="price-chart__title">{move || chart_title(&name.get(), period.get())}</h2>
            {move || match (geometry.get(), series.get()) {
                (Some(geometry), Some(series)) => {
                    let ticks = axis_ticks(&series.labels, AXIS_TICKS);
                    view! {
                        <div class="price-chart__content">
                            <svg
                                width=CHART_WIDTH
                                height=CHART_HEIGHT
                                viewBox=format!("0 0 {} {}", CHART_WIDTH, CHART_HEIGHT)
                                class="price-chart__svg"
                            >
                                <defs>
                                    <linearGradient id="priceFill" x1="0" x2="0" y1="0" y2="1">
                                        <stop offset="0%" stop-color="#38bdf8" stop-opacity="0.35" />
                                        <stop offset="100%" stop-color="#38bdf8" stop-opacity="0.02" />
                                    </linearGradient>
                                </defs>
                                <polygon
                                    class="price-chart__area"
                                    fill="url(#priceFill)"
                                    points=geometry.area_points.clone()
                                />
                                <polyline
                                    class="price-chart__line"
                                    fill="none"
                                    points=geometry.points.clone()
                                />
                            </svg>
                            <div class="price-chart__axis">
                                <span class="price-chart__axis-title">{period.get().axis_title()}</span>
                                {ticks
                                    .into_iter()
                                    .map(|label| view! { <span>{label}</span> })
                                    .collect_view()}
                            </div>
                            <footer class="price-chart__footer">
                                <span>{format!("高値: {:.2}", geometry.max_price)}</span>
                                <span>{format!("安値: {:.2}", geometry.min_price)}</span>
                            </footer>
                        </div>
                    }
                    .into_view()
                }
                _ => view! { <p class="price-chart__placeholder">{PREPARING_TEXT}</p> }.into_view(),
            }}
        </section>
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ChartGeometry {
    points: String,
    area_points: String,
    min_price: f64,
    max_price: f64,
}

/// Points evenly spaced by index. A flat series sits on the midline.
fn compute_chart_geometry(values: &[f64], width: f64, height: f64) -> Option<ChartGeometry> {
    if values.len() < 2 || width <= 0.0 || height <= 0.0 {
        return None;
    }

    let min_price = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max_price = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min_price.is_finite() || !max_price.is_finite() {
        return None;
    }

    let flat = (max_price - min_price).abs() < f64::EPSILON;
    let price_span = max_price - min_price;
    let step = width / (values.len() - 1) as f64;

    let points = values
        .iter()
        .enumerate()
        .map(|(idx, price)| {
            let x = idx as f64 * step;
            let y = if flat {
                height / 2.0
            } else {
                height - ((price - min_price) / price_span) * height
            };
            format!("{:.2},{:.2}", x, y)
        })
        .collect::<Vec<_>>()
        .join(" ");
    let area_points = format!("{} {:.2},{:.2} 0,{:.2}", points, width, height, height);

    Some(ChartGeometry {
        points,
        area_points,
        min_price,
        max_price,
    })
}

/// Up to `count` labels spread across the series.
fn axis_ticks(labels: &[String], count: usize) -> Vec<String> {
    if labels.len() <= count || count < 2 {
        return labels.to_vec();
    }
    let last = labels.len() - 1;
    (0..count)
        .map(|tick| labels[tick * last / (count - 1)].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_chart_geometry_produces_points() {
        let geometry = compute_chart_geometry(&[10.0, 11.0, 9.5], 100.0, 50.0).expect("geometry");
        assert_eq!(geometry.points, "0.00,33.33 50.00,0.00 100.00,50.00");
        assert_eq!(geometry.max_price, 11.0);
        assert!(geometry.area_points.ends_with("100.00,50.00 0,50.00"));
    }

    #[test]
    fn compute_chart_geometry_rejects_insufficient_data() {
        assert!(compute_chart_geometry(&[10.0], 100.0, 50.0).is_none());
        assert!(compute_chart_geometry(&[], 100.0, 50.0).is_none());
    }

    #[test]
    fn flat_series_is_drawn_on_the_midline() {
        let geometry = compute_chart_geometry(&[5.0, 5.0], 10.0, 8.0).expect("geometry");
        assert_eq!(geometry.points, "0.00,4.00 10.00,4.00");
    }

    #[test]
    fn chart_name_accepts_a_plain_string() {
        let name: MaybeSignal<String> = String::from("トヨタ自動車").into();
        assert_eq!(name.get_untracked(), "トヨタ自動車");
    }

    #[test]
    fn axis_ticks_keep_both_ends() {
        let labels: Vec<String> = (0..30).map(|day| format!("d{day}")).collect();
        let ticks = axis_ticks(&labels, 6);
        assert_eq!(ticks.len(), 6);
        assert_eq!(ticks.first().map(String::as_str), Some("d0"));
        assert_eq!(ticks.last().map(String::as_str), Some("d29"));
        assert_eq!(axis_ticks(&labels[..3], 6).len(), 3);
    }
}

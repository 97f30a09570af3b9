use leptos::*;

use crate::market::sparkline::{
    LINE_WIDTH, MARKER_RADIUS, PLACEHOLDER_DASH, PLACEHOLDER_LINE_WIDTH, Sparkline,
    SparklineInput, Surface,
};

use super::dashboard::RepaintSignal;

/// Sized from its container on every repaint; never refetches.
#[component]
pub fn SparklineChart(input: SparklineInput) -> impl IntoView {
    let repaint = use_context::<RepaintSignal>();
    let container = create_node_ref::<html::Div>();

    let surface = move || {
        if let Some(repaint) = repaint {
            repaint.0.track();
        }
        container
            .get()
            .map(|element| Surface::fit(f64::from(element.client_width())))
            .unwrap_or_default()
    };

    view! {
        <div class="sparkline" node_ref=container>
            {move || sparkline_svg(&Sparkline::render(&input, surface()))}
        </div>
    }
}

fn sparkline_svg(sparkline: &Sparkline) -> View {
    let surface = sparkline.surface();
    let points = sparkline.svg_points();
    let stroke = sparkline.stroke();

    let body = match sparkline {
        Sparkline::Placeholder { .. } => view! {
            <polyline
                points=points
                fill="none"
                stroke=stroke
                stroke-width=PLACEHOLDER_LINE_WIDTH
                stroke-dasharray=PLACEHOLDER_DASH
            />
        }
        .into_view(),
        Sparkline::Line { marker, .. } => view! {
            <polyline
                points=points
                fill="none"
                stroke=stroke
                stroke-width=LINE_WIDTH
                stroke-linejoin="round"
            />
            <circle
                cx=format!("{:.2}", marker.x)
                cy=format!("{:.2}", marker.y)
                r=MARKER_RADIUS
                fill=stroke
            />
        }
        .into_view(),
    };

    view! {
        <svg
            class="sparkline__svg"
            width=surface.width
            height=surface.height
            viewBox=format!("0 0 {:.2} {:.2}", surface.width, surface.height)
        >
            {body}
        </svg>
    }
    .into_view()
}

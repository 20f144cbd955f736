mod common;

use std::time::Duration;

use chrono::{TimeZone, Utc};
use common::{daily_bars, dashboard, quick_settings, setup};
use dashboard_core::{
    display::render_panel,
    errors::DashboardError,
    pipeline::PanelState,
    series_store::ResetPolicy,
    window::WindowLabel,
};
use market_feed::models::{
    bar::Bar,
    request_params::HistoryRequest,
    timeframe::{Period, TimeFrame},
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[tokio::test]
async fn reference_scenario_metrics() {
    let (clock, market) = setup();
    market.set_price("TEST", 102.0);
    market.set_reference("TEST", "Test Corp", 99.0, 98.0);
    market.set_bars("TEST", daily_bars(&[100.0, 100.0, 102.0]));
    let mut dash = dashboard(&market, &clock, quick_settings());

    let panels = dash.refresh(&["test"], "Last Month").await;
    assert_eq!(panels.len(), 1);
    let panel = &panels[0];
    assert_eq!(panel.symbol, "TEST");
    assert_eq!(panel.company_name, "Test Corp");
    assert_eq!(panel.window, WindowLabel::LastMonth);

    let data = panel.data().expect("panel should have data");
    let m = &data.metrics;
    assert!(close(m.latest_price, 102.0));
    assert!(close(m.instant_delta, 2.0));
    let session = m.session.expect("opening price is known");
    assert!(close(session.delta, 3.0));
    assert!(close(session.percent, 3.0 / 99.0 * 100.0));
    let prev = m.previous_close.expect("previous close is known");
    assert!(close(prev.delta, 4.0));
    assert!(close(prev.percent, 4.0 / 98.0 * 100.0));
    assert_eq!(data.points.len(), 3);
    assert!(panel.warnings.is_empty(), "{:?}", panel.warnings);

    let text = render_panel(panel);
    assert!(text.contains("Since Open: +3.00 (+3.03%)"), "{text}");
    assert!(text.contains("Since Previous Close: +4.00 (+4.08%)"), "{text}");
}

#[tokio::test]
async fn unknown_open_is_omitted_not_rendered_as_zero() {
    let (clock, market) = setup();
    market.set_price("TEST", 102.0);
    market.set_bars("TEST", daily_bars(&[100.0, 100.0, 102.0]));
    let mut dash = dashboard(&market, &clock, quick_settings());

    let panels = dash.refresh(&["TEST"], "Last Month").await;
    let panel = &panels[0];
    let data = panel.data().expect("bars are available");
    assert!(data.metrics.session.is_none());
    assert!(data.metrics.previous_close.is_none());
    assert!(panel.warnings.iter().any(|w| matches!(
        w,
        DashboardError::ComputationSkipped {
            metric: "change since open",
            ..
        }
    )));

    let text = render_panel(panel);
    assert!(text.contains("Since Open: n/a"), "{text}");
    assert!(text.contains("Since Previous Close: n/a"), "{text}");
    assert!(!text.contains("+0.00 (+0.00%)"), "{text}");
}

#[tokio::test]
async fn history_is_fetched_once_within_ttl() {
    let (clock, market) = setup();
    market.set_price("AAPL", 102.0);
    market.set_reference("AAPL", "Apple Inc.", 99.0, 98.0);
    market.set_bars("AAPL", daily_bars(&[100.0, 101.0, 102.0]));
    let mut dash = dashboard(&market, &clock, quick_settings());
    let window = HistoryRequest::new("AAPL", Period::months(1), TimeFrame::day());

    dash.refresh(&["AAPL"], "Last Month").await;
    clock.advance(Duration::from_secs(300));
    dash.refresh(&["AAPL"], "Last Month").await;
    assert_eq!(market.history_calls(&window), 1);
    assert_eq!(market.history_calls(&HistoryRequest::previous_close("AAPL")), 1);
    assert_eq!(market.quote_calls("AAPL"), 2);

    clock.advance(Duration::from_secs(301));
    dash.refresh(&["AAPL"], "Last Month").await;
    assert_eq!(market.history_calls(&window), 2);
}

#[tokio::test]
async fn failed_history_is_retried_then_cached() {
    let (clock, market) = setup();
    market.set_price("AAPL", 102.0);
    market.set_reference("AAPL", "Apple Inc.", 99.0, 98.0);
    market.set_bars("AAPL", daily_bars(&[100.0, 101.0, 102.0]));
    let mut dash = dashboard(&market, &clock, quick_settings());

    // The previous-close fetch runs first and absorbs the single failure.
    market.fail_history(1);
    let panels = dash.refresh(&["AAPL"], "Last Month").await;
    assert!(panels[0].data().is_some());
    assert_eq!(market.history_calls(&HistoryRequest::previous_close("AAPL")), 2);
}

#[tokio::test]
async fn one_failing_symbol_does_not_affect_others() {
    let (clock, market) = setup();
    market.set_price("AAPL", 102.0);
    market.set_reference("AAPL", "Apple Inc.", 99.0, 98.0);
    market.set_bars("AAPL", daily_bars(&[100.0, 101.0, 102.0]));
    market.break_symbol("BROKEN");
    let mut dash = dashboard(&market, &clock, quick_settings());

    let panels = dash.refresh(&["BROKEN", "AAPL"], "Last Year").await;
    assert_eq!(panels.len(), 2);

    assert_eq!(panels[0].symbol, "BROKEN");
    assert_eq!(panels[0].company_name, "BROKEN");
    assert!(matches!(
        panels[0].state,
        PanelState::Failed(DashboardError::NetworkFailure { .. })
    ));
    assert!(!panels[0].warnings.is_empty());
    assert!(render_panel(&panels[0]).contains("unavailable"));

    assert_eq!(panels[1].symbol, "AAPL");
    assert!(panels[1].data().is_some());
}

#[tokio::test]
async fn out_of_session_bars_render_no_data() {
    let (clock, market) = setup();
    market.set_price("AAPL", 102.0);
    market.set_reference("AAPL", "Apple Inc.", 99.0, 98.0);
    // 02:00-02:20 UTC is the previous evening in New York.
    let night = (0..5)
        .map(|i| Bar {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 4, 2, i * 5, 0).unwrap(),
            close: 100.0,
            volume: None,
        })
        .collect();
    market.set_bars("AAPL", night);
    let mut dash = dashboard(&market, &clock, quick_settings());

    let panels = dash.refresh(&["AAPL"], "Today").await;
    let panel = &panels[0];
    assert!(matches!(panel.state, PanelState::NoData(_)));
    assert!(panel.error().is_some_and(DashboardError::is_data_absent));
    assert!(render_panel(panel).contains("no data available"));
}

#[tokio::test]
async fn empty_history_is_no_data_not_failure() {
    let (clock, market) = setup();
    market.set_price("RIVN", 12.0);
    let mut dash = dashboard(&market, &clock, quick_settings());

    let panels = dash.refresh(&["RIVN"], "Last Week").await;
    assert!(matches!(panels[0].state, PanelState::NoData(_)));
    // Name and open were missing upstream too.
    assert!(panels[0].warnings.iter().all(|w| !matches!(w, DashboardError::NetworkFailure { .. })));
}

#[tokio::test]
async fn unknown_timeframe_falls_back_to_today() {
    let (clock, market) = setup();
    market.set_price("AAPL", 102.0);
    let mut dash = dashboard(&market, &clock, quick_settings());

    let panels = dash.refresh(&["AAPL"], "Last Decade").await;
    assert_eq!(panels[0].window, WindowLabel::Today);
}

#[tokio::test]
async fn live_window_accumulates_until_symbols_change() {
    let (clock, market) = setup();
    market.set_price("AAPL", 100.0);
    market.set_price("MSFT", 400.0);
    market.set_reference("AAPL", "Apple Inc.", 99.0, 98.0);
    let mut dash = dashboard(&market, &clock, quick_settings());

    dash.refresh(&["AAPL"], "Last Hour").await;
    clock.advance(Duration::from_secs(60));
    market.set_price("AAPL", 101.0);
    let panels = dash.refresh(&["AAPL"], "Last Hour").await;

    let data = panels[0].data().expect("live samples");
    assert_eq!(data.points.len(), 2);
    assert!((data.metrics.instant_delta - 1.0).abs() < 1e-9);

    dash.refresh(&["MSFT"], "Last Hour").await;
    let session = dash.session().expect("session started");
    assert_eq!(session.store().len("AAPL"), 0);
    assert_eq!(session.store().len("MSFT"), 1);
    assert!(session.references().get("AAPL").is_none());
}

#[tokio::test]
async fn reordering_symbols_keeps_series_by_default() {
    let (clock, market) = setup();
    market.set_price("AAPL", 100.0);
    market.set_price("MSFT", 400.0);
    let mut dash = dashboard(&market, &clock, quick_settings());

    dash.refresh(&["AAPL", "MSFT"], "Last Hour").await;
    clock.advance(Duration::from_secs(15));
    dash.refresh(&["MSFT, AAPL"], "Last Hour").await;

    let store = dash.session().unwrap().store();
    assert_eq!(store.len("AAPL"), 2);
    assert_eq!(store.len("MSFT"), 2);
}

#[tokio::test]
async fn reordering_symbols_resets_when_order_sensitive() {
    let (clock, market) = setup();
    market.set_price("AAPL", 100.0);
    market.set_price("MSFT", 400.0);
    let settings = dashboard_core::pipeline::Settings {
        reset_policy: ResetPolicy::OrderSensitive,
        ..quick_settings()
    };
    let mut dash = dashboard(&market, &clock, settings);

    dash.refresh(&["AAPL", "MSFT"], "Last Hour").await;
    clock.advance(Duration::from_secs(15));
    dash.refresh(&["MSFT", "AAPL"], "Last Hour").await;

    let store = dash.session().unwrap().store();
    assert_eq!(store.len("AAPL"), 1);
    assert_eq!(store.tracked(), ["MSFT".to_string(), "AAPL".to_string()]);
}

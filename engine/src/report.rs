// Everything the presentation layer shows for one set of inputs, derived in one go.
//
// `derive_report` is a pure function of (records, window, selection, settings) plus the
// parser's fallback day. Its parts depend on:
//   clients          <- records
//   filtered         <- records, window, selection
//   summary, total   <- filtered
//   display          <- filtered
//   original_display <- records
// `ReportSession` keeps the current inputs and re-derives after every change.

use chrono::NaiveDate;
use shared::models::{ClientSelection, DateWindow, Record, RecordCollection};

use crate::config::ReportSettings;
use crate::dates::DateParser;
use crate::filter::{aggregates, filter_records};

#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentReport {
    pub clients: Vec<String>,
    pub filtered: Vec<Record>,
    pub summary: String,
    pub total_price: f64,
    pub display: Vec<Record>,
    pub original_display: Vec<Record>,
}

impl ShipmentReport {
    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn total_price_label(&self) -> String {
        aggregates::price_label(self.total_price)
    }

    pub fn display_json(&self) -> String {
        aggregates::to_display_json(&self.display)
    }

    pub fn original_display_json(&self) -> String {
        aggregates::to_display_json(&self.original_display)
    }
}

pub fn derive_report(
    records: &RecordCollection,
    window: &DateWindow,
    selection: &ClientSelection,
    parser: &DateParser,
    settings: &ReportSettings,
) -> ShipmentReport {
    let fields = &settings.fields;
    let filtered = filter_records(records, window, selection, parser, fields);

    let report = ShipmentReport {
        clients: aggregates::distinct_clients(records, fields),
        summary: aggregates::text_summary(&filtered, fields, &settings.weight_unit),
        total_price: aggregates::total_price(&filtered, fields),
        display: aggregates::display_records(&filtered, parser, fields),
        original_display: aggregates::display_records(records.records(), parser, fields),
        filtered,
    };

    tracing::debug!(
        total = records.len(),
        filtered = report.filtered_count(),
        clients = report.clients.len(),
        total_price = report.total_price,
        "Derived report"
    );
    report
}

/// Filter state of one loaded file: the records, the two date inputs and the client
/// selection. Any change drops the cached report; the next `report()` derives a new one
/// from the full collection. The cache also remembers the day it was derived on, so the
/// fallback date of unparsable cells moves on after midnight.
#[derive(Debug, Default)]
pub struct ReportSession {
    settings: ReportSettings,
    records: RecordCollection,
    start_input: String,
    end_input: String,
    selection: ClientSelection,
    cached: Option<(NaiveDate, ShipmentReport)>,
}

impl ReportSession {
    pub fn new(settings: ReportSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Replaces the records wholesale. Filters stay as they are.
    pub fn load(&mut self, records: RecordCollection) {
        tracing::info!(count = records.len(), "Loaded records into session");
        self.records = records;
        self.cached = None;
    }

    pub fn set_start(&mut self, input: &str) {
        self.start_input = input.to_string();
        self.cached = None;
    }

    pub fn set_end(&mut self, input: &str) {
        self.end_input = input.to_string();
        self.cached = None;
    }

    pub fn toggle_client(&mut self, name: &str) {
        self.selection.toggle(name);
        self.cached = None;
    }

    pub fn clear_filters(&mut self) {
        self.start_input.clear();
        self.end_input.clear();
        self.selection.clear();
        self.cached = None;
    }

    pub fn records(&self) -> &RecordCollection {
        &self.records
    }

    pub fn selection(&self) -> &ClientSelection {
        &self.selection
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::from_inputs(&self.start_input, &self.end_input)
    }

    pub fn report(&mut self) -> &ShipmentReport {
        self.report_as_of(DateParser::new().today())
    }

    /// `report` with `today` as the fallback day.
    pub fn report_as_of(&mut self, today: NaiveDate) -> &ShipmentReport {
        if matches!(&self.cached, Some((day, _)) if *day != today) {
            tracing::debug!(%today, "Day changed, deriving report again");
            self.cached = None;
        }
        let window = self.window();
        let (_, report) = self.cached.get_or_insert_with(|| {
            let parser = DateParser::with_today(today);
            let report = derive_report(&self.records, &window, &self.selection, &parser, &self.settings);
            (today, report)
        });
        report
    }
}

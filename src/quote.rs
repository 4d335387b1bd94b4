use chrono::NaiveDate;
use serde::Serialize;

use crate::impl_record;

/// One day of historical prices as exported by the finance CSV endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Quote {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl_record!(Quote {
    "Date" => date: NaiveDate,
    "Open" => open: f64,
    "High" => high: f64,
    "Low" => low: f64,
    "Close" => close: f64,
    "Volume" => volume: u64,
});

impl Quote {
    pub fn headers() -> Vec<String> {
        ["Date", "Open", "High", "Low", "Close", "Volume"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    pub fn cells(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.open.to_string(),
            self.high.to_string(),
            self.low.to_string(),
            self.close.to_string(),
            self.volume.to_string(),
        ]
    }
}

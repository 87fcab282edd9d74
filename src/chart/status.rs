use chrono::{Days, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Staleness {
    Current,
    Yesterday,
    Outdated,
}

impl Staleness {
    pub fn classify(latest_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        match latest_date {
            Some(date) if date >= today => Staleness::Current,
            Some(date) if Some(date) == today.checked_sub_days(Days::new(1)) => {
                Staleness::Yesterday
            }
            _ => Staleness::Outdated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartStatus {
    pub latest_date: Option<NaiveDate>,
    pub total_rows: usize,
    pub staleness: Staleness,
}

impl ChartStatus {
    pub fn new(latest_date: Option<NaiveDate>, total_rows: usize, today: NaiveDate) -> Self {
        ChartStatus {
            latest_date,
            total_rows,
            staleness: Staleness::classify(latest_date, today),
        }
    }
}

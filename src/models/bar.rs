use chrono::NaiveDate;
use serde::Serialize;

/// 日线数据结构
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub amount: f64,
}

/// 周线数据结构，以周五为周期结束日
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyBar {
    pub week_ending: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub amount: f64,
}

impl DailyBar {
    /// 仅含 OHLC 的日线，成交量与成交额置零
    pub fn ohlc(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume: 0.0,
            amount: 0.0,
        }
    }
}

impl WeeklyBar {
    pub fn ohlc(week_ending: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            week_ending,
            open,
            high,
            low,
            close,
            volume: 0.0,
            amount: 0.0,
        }
    }
}

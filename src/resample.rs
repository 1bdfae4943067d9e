//! 日线到周线的聚合。
//!
//! 每周以周五为结束日：周六到下周五的日线归入该周五。开盘取首根，
//! 最高取最大，最低取最小，收盘取末根，成交量与成交额求和。没有日线的周不输出。

use chrono::{Datelike, Duration, NaiveDate};
use crate::models::bar::{DailyBar, WeeklyBar};

/// 返回日期所属周的周五
pub fn week_ending_friday(date: NaiveDate) -> NaiveDate {
    let weekday = date.weekday().num_days_from_monday() as i64;
    date + Duration::days((4 - weekday).rem_euclid(7))
}

/// 将日线聚合为周线，输入无需有序
pub fn resample_weekly(daily: &[DailyBar]) -> Vec<WeeklyBar> {
    let mut sorted: Vec<&DailyBar> = daily.iter().collect();
    sorted.sort_by_key(|bar| bar.date);

    let mut weeks: Vec<WeeklyBar> = Vec::new();
    for bar in sorted {
        let friday = week_ending_friday(bar.date);
        match weeks.last_mut() {
            Some(week) if week.week_ending == friday => {
                week.high = week.high.max(bar.high);
                week.low = week.low.min(bar.low);
                week.close = bar.close;
                week.volume += bar.volume;
                week.amount += bar.amount;
            }
            _ => weeks.push(WeeklyBar {
                week_ending: friday,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                amount: bar.amount,
            }),
        }
    }

    weeks
}

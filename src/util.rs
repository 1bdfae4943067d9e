use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Asia::Shanghai;
use log::info;
use crate::config::Config;
use crate::errors::{Result, ScreenerError};
use crate::models::industry::Industry;
use crate::models::screen::ScreenWindow;

/// A 股交易所所在时区的当前日期
pub fn today_in_market() -> NaiveDate {
    Utc::now().with_timezone(&Shanghai).date_naive()
}

// 日期转换工具
pub fn compact_to_naive_date(date_str: &str) -> Result<NaiveDate> {
    if date_str.len() != 8 || !date_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScreenerError::DataError(format!("Invalid date format: {}", date_str)));
    }

    let year = date_str[0..4].parse::<i32>()
        .map_err(|e| ScreenerError::DataError(e.to_string()))?;
    let month = date_str[4..6].parse::<u32>()
        .map_err(|e| ScreenerError::DataError(e.to_string()))?;
    let day = date_str[6..8].parse::<u32>()
        .map_err(|e| ScreenerError::DataError(e.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ScreenerError::DataError(format!("Invalid date: {}-{}-{}", year, month, day)))
}

pub fn naive_date_to_compact(date: &NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// 解析用户输入的日期，支持 YYYY-MM-DD 与 YYYYMMDD，空白视为未填写
pub fn parse_user_date(input: &str) -> Result<Option<NaiveDate>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.contains('-') {
        let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")?;
        return Ok(Some(date));
    }

    compact_to_naive_date(trimmed)
        .map(Some)
        .map_err(|_| ScreenerError::ConfigError(format!("Invalid date: {}", trimmed)))
}

/// 根据配置与当天日期确定筛选区间
pub fn resolve_window(config: &Config, today: NaiveDate) -> Result<ScreenWindow> {
    let end = config.end_date.unwrap_or(today);
    let start = config
        .start_date
        .unwrap_or_else(|| today - Duration::days(config.lookback_days));

    if start > end {
        return Err(ScreenerError::ConfigError(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }

    Ok(ScreenWindow {
        start,
        end,
        calc_start: start - Duration::days(config.warmup_days),
    })
}

// 调试模式下限制行业数量
pub fn limit_industries(industries: &mut Vec<Industry>, limit: Option<usize>) {
    if let Some(max) = limit {
        if industries.len() > max {
            info!("DEBUG MODE: Processing only {} out of {} industries", max, industries.len());
            industries.truncate(max);
        }
    }
}

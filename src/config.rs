use chrono::NaiveDate;
use crate::errors::{Result, ScreenerError};

/// 线程池允许的工作线程数范围
pub const MIN_WORKERS: usize = 4;
pub const MAX_WORKERS: usize = 9;

#[derive(Debug, Clone)]
pub struct Config {
    pub threshold: f64,
    pub workers: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub lookback_days: i64,       // 未指定开始日期时向前回溯的天数
    pub warmup_days: i64,         // 为指标预热额外拉取的天数
    pub request_interval_ms: u64,
    pub ths_cookie: Option<String>,
    pub bind_addr: String,
    pub debug_industry_limit: Option<usize>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            threshold: 5.0,
            workers: MAX_WORKERS,
            start_date: None,
            end_date: None,
            lookback_days: 365,
            warmup_days: 150,
            request_interval_ms: 200,
            ths_cookie: None,
            bind_addr: "127.0.0.1:8501".to_string(),
            debug_industry_limit: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_start_date(mut self, date: Option<NaiveDate>) -> Self {
        self.start_date = date;
        self
    }

    pub fn with_end_date(mut self, date: Option<NaiveDate>) -> Self {
        self.end_date = date;
        self
    }

    pub fn with_warmup_days(mut self, days: i64) -> Self {
        self.warmup_days = days;
        self
    }

    pub fn with_request_interval_ms(mut self, ms: u64) -> Self {
        self.request_interval_ms = ms;
        self
    }

    pub fn with_ths_cookie(mut self, cookie: Option<String>) -> Self {
        self.ths_cookie = cookie.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_bind_addr(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn with_debug_industry_limit(mut self, limit: Option<usize>) -> Self {
        self.debug_industry_limit = limit;
        self
    }

    /// 检查配置取值范围
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;

        if !(MIN_WORKERS..=MAX_WORKERS).contains(&self.workers) {
            return Err(ScreenerError::ConfigError(format!(
                "workers must be between {} and {}, got {}",
                MIN_WORKERS, MAX_WORKERS, self.workers
            )));
        }

        if self.lookback_days <= 0 || self.warmup_days < 0 {
            return Err(ScreenerError::ConfigError(format!(
                "invalid lookback/warmup days: {}/{}",
                self.lookback_days, self.warmup_days
            )));
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ScreenerError::ConfigError(format!(
                    "start date {} is after end date {}",
                    start, end
                )));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ScreenerError::ConfigError(format!(
            "threshold must be a finite number >= 0, got {}",
            threshold
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::new().validate().is_ok());
    }

    #[test]
    fn rejects_workers_outside_pool_range() {
        assert!(Config::new().with_workers(3).validate().is_err());
        assert!(Config::new().with_workers(10).validate().is_err());
        assert!(Config::new().with_workers(4).validate().is_ok());
    }

    #[test]
    fn rejects_negative_or_nan_threshold() {
        assert!(Config::new().with_threshold(-0.1).validate().is_err());
        assert!(Config::new().with_threshold(f64::NAN).validate().is_err());
        assert!(Config::new().with_threshold(0.0).validate().is_ok());
    }

    #[test]
    fn rejects_inverted_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1);
        let end = NaiveDate::from_ymd_opt(2024, 1, 1);
        let config = Config::new().with_start_date(start).with_end_date(end);
        assert!(matches!(config.validate(), Err(ScreenerError::ConfigError(_))));
    }

    #[test]
    fn blank_cookie_is_dropped() {
        let config = Config::new().with_ths_cookie(Some("  ".to_string()));
        assert!(config.ths_cookie.is_none());
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use dkby_screener::errors::{Result, ScreenerError};
use dkby_screener::models::bar::DailyBar;
use dkby_screener::models::industry::Industry;
use dkby_screener::scrapers::base::IndustryScraper;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 合成行情的形态
#[derive(Debug, Clone, Copy)]
pub enum Profile {
    /// 收盘价恒定位于区间 45% 处，long 与 short 收敛到同一值
    Converging,
    /// 单边上涨，多空差很大
    Trending,
    /// 正弦波动，多空差居中
    Oscillating(f64),
    /// 只有最近 60 天数据，不足 21 根周线
    ShortHistory,
    Empty,
    Failing,
    /// 拉取时直接 panic
    Panicking,
}

pub struct FakeScraper {
    industries: Vec<Industry>,
    profiles: HashMap<String, Profile>,
    delay: Option<std::time::Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeScraper {
    pub fn new(entries: &[(&str, Profile)]) -> Self {
        let industries = entries
            .iter()
            .enumerate()
            .map(|(i, (name, _))| Industry::new(*name, format!("88{:04}", i)))
            .collect();
        let profiles = entries
            .iter()
            .map(|(name, profile)| (name.to_string(), *profile))
            .collect();

        Self {
            industries,
            profiles,
            delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn standard() -> Self {
        Self::new(&[
            ("白酒", Profile::Converging),
            ("半导体", Profile::Trending),
            ("银行", Profile::Oscillating(5.0)),
            ("煤炭开采", Profile::Oscillating(11.0)),
            ("光伏设备", Profile::Oscillating(17.0)),
            ("新股板块", Profile::ShortHistory),
            ("停牌板块", Profile::Empty),
            ("故障板块", Profile::Failing),
        ])
    }
}

fn synthesize(profile: Profile, start: NaiveDate, end: NaiveDate) -> Vec<DailyBar> {
    let first = match profile {
        Profile::ShortHistory => std::cmp::max(start, end - Duration::days(60)),
        _ => start,
    };

    let mut bars = Vec::new();
    let mut date = first;
    let mut i = 0.0_f64;
    while date <= end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let (high, low, close) = match profile {
                Profile::Converging | Profile::ShortHistory => (110.0, 10.0, 55.0),
                Profile::Trending => (101.0 + i, 99.0 + i, 100.0 + i),
                Profile::Oscillating(period) => {
                    let close = 100.0 + 10.0 * (i / period).sin();
                    (close + 1.5, close - 1.5, close)
                }
                Profile::Empty | Profile::Failing | Profile::Panicking => unreachable!(),
            };
            bars.push(DailyBar::ohlc(date, close, high, low, close));
            i += 1.0;
        }
        date += Duration::days(1);
    }
    bars
}

#[async_trait]
impl IndustryScraper for FakeScraper {
    fn source_code(&self) -> &'static str {
        "FAKE"
    }

    async fn fetch_industry_list(&self) -> Result<Vec<Industry>> {
        Ok(self.industries.clone())
    }

    async fn fetch_industry_history(
        &self,
        industry: &Industry,
        start: &NaiveDate,
        end: &NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let profile = self.profiles.get(&industry.name).copied().unwrap_or(Profile::Empty);
        let result = match profile {
            Profile::Empty => Ok(Vec::new()),
            Profile::Failing => Err(ScreenerError::ProviderError("connection reset".to_string())),
            Profile::Panicking => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                panic!("malformed payload for {}", industry.name);
            }
            other => Ok(synthesize(other, *start, *end)),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

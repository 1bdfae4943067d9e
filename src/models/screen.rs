use chrono::NaiveDate;
use serde::Serialize;
use crate::indicators::dkby;

/// 筛选的日期区间；`calc_start` 早于 `start`，用于指标预热
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub calc_start: NaiveDate,
}

/// 单个行业最新一根周线的 DKBY 读数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryVerdict {
    pub name: String,
    pub long: f64,
    pub short: f64,
    pub gap: f64,
}

impl IndustryVerdict {
    pub fn passes(&self, threshold: f64) -> bool {
        dkby::gap_within(self.gap, threshold)
    }
}

/// 单个行业的处理结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IndustryOutcome {
    /// 数据充足，已算出读数（是否入选由阈值决定）
    Evaluated(IndustryVerdict),
    /// 数据为空或不足 21 根周线
    Insufficient(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryFailure {
    pub name: String,
    pub reason: String,
}

/// 一次筛选的汇总结果，`matched` 不保证顺序
#[derive(Debug, Clone, Serialize)]
pub struct ScreenReport {
    pub window: ScreenWindow,
    pub threshold: f64,
    pub matched: Vec<IndustryVerdict>,
    pub skipped: Vec<String>,
    pub failed: Vec<IndustryFailure>,
}

impl ScreenReport {
    pub fn new(window: ScreenWindow, threshold: f64) -> Self {
        Self {
            window,
            threshold,
            matched: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// 按阈值归档单个行业的结果
    pub fn record(&mut self, outcome: IndustryOutcome) {
        match outcome {
            IndustryOutcome::Evaluated(verdict) => {
                if verdict.passes(self.threshold) {
                    self.matched.push(verdict);
                }
            }
            IndustryOutcome::Insufficient(name) => self.skipped.push(name),
        }
    }

    pub fn record_failure(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.failed.push(IndustryFailure {
            name: name.into(),
            reason: reason.into(),
        });
    }

    pub fn matched_names(&self) -> Vec<&str> {
        self.matched.iter().map(|v| v.name.as_str()).collect()
    }
}

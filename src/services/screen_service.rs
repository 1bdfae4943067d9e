use crate::models::industry::Industry;
use crate::models::screen::{IndustryOutcome, IndustryVerdict, ScreenReport, ScreenWindow};
use crate::scrapers::base::IndustryScraper;
use crate::errors::{Result, ScreenerError};
use crate::config::{self, Config};
use crate::indicators::dkby;
use crate::resample;
use crate::util;
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};

/// 一次筛选请求，未填写的日期使用默认区间
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRequest {
    pub threshold: f64,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ScreenRequest {
    pub fn from_config(config: &Config) -> Self {
        Self {
            threshold: config.threshold,
            start: config.start_date,
            end: config.end_date,
        }
    }
}

/// 筛选服务，负责拉取行业数据、计算指标并按阈值过滤
pub struct ScreenService {
    config: Config,
    scraper: Arc<dyn IndustryScraper + Send + Sync>,
}

impl ScreenService {
    /// 创建新的筛选服务实例
    pub fn new(config: Config, scraper: Arc<dyn IndustryScraper + Send + Sync>) -> Self {
        Self { config, scraper }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 以 A 股当天日期为基准确定区间
    pub fn resolve_window(&self, request: &ScreenRequest) -> Result<ScreenWindow> {
        self.resolve_window_at(request, util::today_in_market())
    }

    pub fn resolve_window_at(&self, request: &ScreenRequest, today: NaiveDate) -> Result<ScreenWindow> {
        config::validate_threshold(request.threshold)?;
        let config = self
            .config
            .clone()
            .with_start_date(request.start)
            .with_end_date(request.end);
        util::resolve_window(&config, today)
    }

    /// 获取行业列表（调试模式下截断）
    pub async fn list_industries(&self) -> Result<Vec<Industry>> {
        let mut industries = self.scraper.fetch_industry_list().await?;
        util::limit_industries(&mut industries, self.config.debug_industry_limit);
        info!("Found {} industries in {}", industries.len(), self.scraper.source_code());
        Ok(industries)
    }

    /// 使用线程池并行筛选全部行业
    pub async fn screen(&self, request: &ScreenRequest) -> Result<ScreenReport> {
        let window = self.resolve_window(request)?;
        let industries = self.list_industries().await?;
        Ok(self.screen_industries(industries, window, request.threshold).await)
    }

    /// 逐个顺序筛选，结果集合与并行版本一致
    pub async fn screen_sequential(&self, request: &ScreenRequest) -> Result<ScreenReport> {
        let window = self.resolve_window(request)?;
        let industries = self.list_industries().await?;
        Ok(self.screen_industries_sequential(industries, window, request.threshold).await)
    }

    /// 对给定行业并行求值，同时运行的任务数不超过 `config.workers`
    pub async fn screen_industries(
        &self,
        industries: Vec<Industry>,
        window: ScreenWindow,
        threshold: f64,
    ) -> ScreenReport {
        let total = industries.len();
        info!(
            "Screening {} industries from {} to {} with {} workers, threshold {}",
            total, window.start, window.end, self.config.workers, threshold
        );

        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut join_set: JoinSet<Result<IndustryOutcome>> = JoinSet::new();
        // 任务 ID -> 行业名，任务 panic 时据此记录失败
        let mut names: HashMap<task::Id, String> = HashMap::with_capacity(total);

        for industry in industries {
            let scraper = Arc::clone(&self.scraper);
            let semaphore = Arc::clone(&semaphore);
            let name = industry.name.clone();

            let handle = join_set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ScreenerError::TaskError(e.to_string()))?;
                evaluate_industry(scraper.as_ref(), &industry, &window).await
            });
            names.insert(handle.id(), name);
        }

        let mut report = ScreenReport::new(window, threshold);
        let mut done = 0;

        while let Some(joined) = join_set.join_next_with_id().await {
            done += 1;
            match joined {
                Ok((_, Ok(outcome))) => report.record(outcome),
                Ok((id, Err(e))) => {
                    let name = names.remove(&id).unwrap_or_default();
                    warn!("Failed to evaluate {}: {}", name, e);
                    report.record_failure(name, e.to_string());
                }
                Err(join_error) => {
                    let name = names.remove(&join_error.id()).unwrap_or_default();
                    error!("Screening task for {} failed: {}", name, join_error);
                    report.record_failure(name, join_error.to_string());
                }
            }
            debug!("Progress {}/{}", done, total);
        }

        info!(
            "Screening finished: {} matched, {} skipped, {} failed",
            report.matched.len(), report.skipped.len(), report.failed.len()
        );
        report
    }

    pub async fn screen_industries_sequential(
        &self,
        industries: Vec<Industry>,
        window: ScreenWindow,
        threshold: f64,
    ) -> ScreenReport {
        let mut report = ScreenReport::new(window, threshold);

        for industry in industries {
            let name = industry.name.clone();
            let scraper = Arc::clone(&self.scraper);

            // 单独起任务，panic 与并行版本一样只影响当前行业
            let joined = tokio::spawn(async move {
                evaluate_industry(scraper.as_ref(), &industry, &window).await
            })
            .await;

            match joined {
                Ok(Ok(outcome)) => report.record(outcome),
                Ok(Err(e)) => {
                    warn!("Failed to evaluate {}: {}", name, e);
                    report.record_failure(name, e.to_string());
                }
                Err(join_error) => {
                    error!("Screening task for {} failed: {}", name, join_error);
                    report.record_failure(name, join_error.to_string());
                }
            }
        }

        report
    }

    /// 按名称计算单个行业，名称不存在时报错
    pub async fn evaluate_by_name(&self, name: &str, request: &ScreenRequest) -> Result<IndustryOutcome> {
        let window = self.resolve_window(request)?;
        let industries = self.scraper.fetch_industry_list().await?;

        let industry = industries
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| ScreenerError::DataError(format!(
                "Industry {} not found in {}", name, self.scraper.source_code()
            )))?;

        evaluate_industry(self.scraper.as_ref(), industry, &window).await
    }
}

/// 拉取单个行业的日线，聚合为周线并计算最新 DKBY 读数
pub async fn evaluate_industry(
    scraper: &(dyn IndustryScraper + Send + Sync),
    industry: &Industry,
    window: &ScreenWindow,
) -> Result<IndustryOutcome> {
    let daily = scraper
        .fetch_industry_history(industry, &window.calc_start, &window.end)
        .await?;

    if daily.is_empty() {
        debug!("{}: no daily data", industry.name);
        return Ok(IndustryOutcome::Insufficient(industry.name.clone()));
    }

    let weekly = resample::resample_weekly(&daily);
    match dkby::latest_reading(&weekly) {
        Some(reading) => Ok(IndustryOutcome::Evaluated(IndustryVerdict {
            name: industry.name.clone(),
            long: reading.long,
            short: reading.short,
            gap: reading.gap(),
        })),
        None => {
            debug!("{}: no valid reading from {} weekly bars", industry.name, weekly.len());
            Ok(IndustryOutcome::Insufficient(industry.name.clone()))
        }
    }
}

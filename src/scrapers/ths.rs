use crate::models::bar::DailyBar;
use crate::models::industry::Industry;
use crate::errors::{Result, ScreenerError};
use crate::scrapers::base::IndustryScraper;
use crate::util;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use log::{debug, info, warn};

const THS_INDUSTRY_LIST_URL: &str = "http://q.10jqka.com.cn/thshy/";
const THS_REFERER: &str = "http://q.10jqka.com.cn";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// 同花顺行业指数年度K线 JSONP 中的有效部分
#[derive(Debug, Deserialize)]
struct ThsLinePayload {
    #[serde(default)]
    data: String,
}

/// 同花顺行业板块数据抓取器
pub struct ThsScraper {
    client: Client,
    cookie: Option<String>,
    request_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl ThsScraper {
    /// 创建新的同花顺数据抓取器
    pub fn new(cookie: Option<String>, request_interval: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ScreenerError::RequestError)?;

        Ok(Self {
            client,
            cookie,
            request_interval,
            next_slot: Mutex::new(None),
        })
    }

    /// 等待请求频率限制
    ///
    /// 每个请求预约一个时间槽，槽之间至少间隔 `request_interval`，
    /// 多个任务并发调用时不会同时打到数据源。
    async fn wait_for_rate_limit(&self) {
        let now = Instant::now();
        let slot = {
            let mut next = self.next_slot.lock().unwrap_or_else(|e| e.into_inner());
            let slot = match *next {
                Some(instant) if instant > now => instant,
                _ => now,
            };
            *next = Some(slot + self.request_interval);
            slot
        };

        if slot > now {
            debug!("等待 {:?} 以遵守频率限制", slot - now);
            tokio::time::sleep_until(slot).await;
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url).header("Referer", THS_REFERER);
        match &self.cookie {
            Some(cookie) => request.header("Cookie", format!("v={}", cookie)),
            None => request,
        }
    }
}

/// 解析行业列表页面中 `div.cate_inner` 下的链接
pub fn parse_industry_list(html: &str) -> Result<Vec<Industry>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("div.cate_inner a")
        .map_err(|e| ScreenerError::DataError(format!("Invalid CSS selector: {:?}", e)))?;

    let mut industries: Vec<Industry> = Vec::new();
    for anchor in document.select(&selector) {
        let name = anchor.text().collect::<String>().trim().to_string();
        let code = anchor
            .value()
            .attr("href")
            .and_then(|href| href.trim_end_matches('/').rsplit('/').next())
            .unwrap_or_default()
            .to_string();

        if name.is_empty() || code.is_empty() {
            continue;
        }
        if industries.iter().any(|i| i.code == code) {
            continue;
        }
        industries.push(Industry { name, code });
    }

    Ok(industries)
}

/// 解析年度K线 JSONP，记录格式为 `日期,开盘,最高,最低,收盘,成交量,成交额,...`
pub fn parse_kline_js(text: &str) -> Result<Vec<DailyBar>> {
    let (begin, end) = match (text.find('{'), text.rfind('}')) {
        (Some(b), Some(e)) if b < e => (b, e),
        _ => return Err(ScreenerError::DataError("No JSON object in kline response".to_string())),
    };

    let payload: ThsLinePayload = serde_json::from_str(&text[begin..=end])?;

    let mut bars = Vec::new();
    for record in payload.data.split(';').filter(|r| !r.trim().is_empty()) {
        match parse_kline_record(record) {
            Ok(bar) => bars.push(bar),
            Err(e) => debug!("跳过无法解析的K线记录 {}: {}", record, e),
        }
    }

    Ok(bars)
}

fn parse_kline_record(record: &str) -> Result<DailyBar> {
    let fields: Vec<&str> = record.split(',').map(str::trim).collect();
    if fields.len() < 5 {
        return Err(ScreenerError::DataError(format!("Too few fields: {}", fields.len())));
    }

    let optional = |idx: usize| -> Result<f64> {
        match fields.get(idx) {
            Some(v) if !v.is_empty() => Ok(v.parse::<f64>()?),
            _ => Ok(0.0),
        }
    };

    Ok(DailyBar {
        date: util::compact_to_naive_date(fields[0])?,
        open: fields[1].parse()?,
        high: fields[2].parse()?,
        low: fields[3].parse()?,
        close: fields[4].parse()?,
        volume: optional(5)?,
        amount: optional(6)?,
    })
}

#[async_trait]
impl IndustryScraper for ThsScraper {
    fn source_code(&self) -> &'static str {
        "THS"
    }

    async fn fetch_industry_list(&self) -> Result<Vec<Industry>> {
        info!("获取同花顺行业板块列表");

        // 限制请求频率
        self.wait_for_rate_limit().await;

        let response = self.get(THS_INDUSTRY_LIST_URL).send().await?;
        if !response.status().is_success() {
            return Err(ScreenerError::ProviderError(format!(
                "Industry list request failed: HTTP status {}", response.status()
            )));
        }

        // 页面为 GBK 编码，响应头未声明时按 GBK 解码
        let html = response.text_with_charset("gbk").await?;
        let industries = parse_industry_list(&html)?;

        if industries.is_empty() {
            return Err(ScreenerError::ProviderError(
                "Industry list page contained no boards".to_string(),
            ));
        }

        info!("成功获取 {} 个行业板块", industries.len());
        Ok(industries)
    }

    async fn fetch_industry_history(
        &self,
        industry: &Industry,
        start: &NaiveDate,
        end: &NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        debug!("获取行业 {} ({}) 的历史K线数据", industry.name, industry.code);

        let mut daily = Vec::new();
        for year in start.year()..=end.year() {
            // 限制请求频率
            self.wait_for_rate_limit().await;

            let url = format!("http://d.10jqka.com.cn/v4/line/bk_{}/01/{}.js", industry.code, year);
            let response = self.get(&url).send().await?;
            if !response.status().is_success() {
                debug!("{} {} 年数据不可用: HTTP status {}", industry.name, year, response.status());
                continue;
            }

            let text = response.text().await?;
            match parse_kline_js(&text) {
                Ok(bars) => daily.extend(bars),
                Err(e) => warn!("解析 {} {} 年K线失败: {}", industry.name, year, e),
            }
        }

        daily.retain(|bar| bar.date >= *start && bar.date <= *end);
        daily.sort_by_key(|bar| bar.date);
        daily.dedup_by_key(|bar| bar.date);

        debug!("{} 获取到 {} 条K线记录", industry.name, daily.len());
        Ok(daily)
    }
}

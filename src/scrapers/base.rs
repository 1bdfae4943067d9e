use crate::models::bar::DailyBar;
use crate::models::industry::Industry;
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Base trait for industry index data sources
#[async_trait]
pub trait IndustryScraper {
    /// Get the data source code this scraper is for
    fn source_code(&self) -> &'static str;

    /// Fetch the full industry board list
    async fn fetch_industry_list(&self) -> Result<Vec<Industry>>;

    /// Fetch daily index bars of one industry within `[start, end]`,
    /// in ascending date order
    async fn fetch_industry_history(
        &self,
        industry: &Industry,
        start: &NaiveDate,
        end: &NaiveDate,
    ) -> Result<Vec<DailyBar>>;
}

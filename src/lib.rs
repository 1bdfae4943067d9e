// 公开导出的模块，供外部使用
pub mod models;
pub mod errors;
pub mod config;
pub mod indicators;
pub mod resample;
pub mod scrapers;
pub mod services;
pub mod web;

// 日期工具主要供二进制程序与服务内部使用
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::bar::{DailyBar, WeeklyBar};
pub use models::industry::Industry;
pub use models::screen::{IndustryOutcome, IndustryVerdict, ScreenReport, ScreenWindow};
pub use services::screen_service::{ScreenRequest, ScreenService};
pub use errors::{Result, ScreenerError};
pub use config::Config;

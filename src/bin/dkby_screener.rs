use dkby_screener::config::{Config, MAX_WORKERS};
use dkby_screener::models::screen::{IndustryOutcome, ScreenReport};
use dkby_screener::scrapers::base::IndustryScraper;
use dkby_screener::scrapers::ths::ThsScraper;
use dkby_screener::services::screen_service::{ScreenRequest, ScreenService};
use dkby_screener::util;
use dkby_screener::web;

use anyhow::{bail, Context};
use clap::{App, Arg, ArgMatches, SubCommand};
use log::info;
use std::sync::Arc;
use std::time::Duration;

fn parse_arg<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> anyhow::Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match matches.value_of(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid --{} '{}': {}", name, raw, e)),
        None => Ok(None),
    }
}

fn print_report(report: &ScreenReport) {
    println!(
        "区间 {} 至 {}（计算自 {}），阈值 {}",
        report.window.start, report.window.end, report.window.calc_start, report.threshold
    );

    if report.matched.is_empty() {
        println!("未找到满足条件的行业板块。");
    } else {
        println!("满足条件的行业板块：");
        println!("{:<12} {:>10} {:>10} {:>10}", "行业", "long", "short", "差值");
        println!("{:-<46}", "");
        for verdict in &report.matched {
            println!(
                "{:<12} {:>10.2} {:>10.2} {:>10.2}",
                verdict.name, verdict.long, verdict.short, verdict.gap
            );
        }
    }

    if !report.skipped.is_empty() {
        info!("{} industries skipped for insufficient data", report.skipped.len());
    }
    for failure in &report.failed {
        println!("获取失败: {} ({})", failure.name, failure.reason);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let workers_default = MAX_WORKERS.to_string();

    // 创建基本的命令行应用
    let app = App::new("DKBY Screener")
        .version(env!("CARGO_PKG_VERSION"))
        .author("EgoStrategy Team")
        .about("Screen THS industry boards by the weekly DKBY long/short gap")
        .arg(
            Arg::with_name("cookie")
                .long("cookie")
                .value_name("COOKIE")
                .help("Value of the THS 'v' cookie (falls back to DKBY_THS_COOKIE)")
                .takes_value(true)
                .global(true),
        );

    // 在开发模式下添加调试参数
    #[cfg(debug_assertions)]
    let app = app.arg(
        Arg::with_name("debug-limit")
            .long("debug-limit")
            .value_name("N")
            .help("Only evaluate the first N industries")
            .takes_value(true)
            .global(true),
    );

    // 添加子命令
    let app = app
        .subcommand(
            SubCommand::with_name("screen")
                .about("Screen all industries and print the matches")
                .arg(
                    Arg::with_name("threshold")
                        .short('t')
                        .long("threshold")
                        .value_name("THRESHOLD")
                        .help("Maximum absolute long-short gap")
                        .takes_value(true)
                        .default_value("5.0"),
                )
                .arg(
                    Arg::with_name("start")
                        .long("start")
                        .value_name("DATE")
                        .help("Start date (YYYY-MM-DD, default one year ago)")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("end")
                        .long("end")
                        .value_name("DATE")
                        .help("End date (YYYY-MM-DD, default today)")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("workers")
                        .short('w')
                        .long("workers")
                        .value_name("WORKERS")
                        .help("Worker pool size (4-9)")
                        .takes_value(true)
                        .default_value(&workers_default),
                )
                .arg(
                    Arg::with_name("industry")
                        .short('i')
                        .long("industry")
                        .value_name("NAME")
                        .help("Evaluate a single industry by name")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("sequential")
                        .long("sequential")
                        .help("Evaluate industries one by one instead of in the pool")
                        .takes_value(false),
                ),
        )
        .subcommand(
            SubCommand::with_name("industries")
                .about("List THS industry boards"),
        )
        .subcommand(
            SubCommand::with_name("serve")
                .about("Serve the screening web form")
                .arg(
                    Arg::with_name("bind")
                        .short('b')
                        .long("bind")
                        .value_name("ADDR")
                        .help("Address to listen on")
                        .takes_value(true)
                        .default_value("127.0.0.1:8501"),
                )
                .arg(
                    Arg::with_name("threshold")
                        .short('t')
                        .long("threshold")
                        .value_name("THRESHOLD")
                        .help("Default threshold shown in the form")
                        .takes_value(true)
                        .default_value("5.0"),
                ),
        );

    let matches = app.get_matches();

    let cookie = matches
        .value_of("cookie")
        .map(str::to_string)
        .or_else(|| std::env::var("DKBY_THS_COOKIE").ok());

    #[cfg(debug_assertions)]
    let debug_limit: Option<usize> = parse_arg(&matches, "debug-limit")?;
    #[cfg(not(debug_assertions))]
    let debug_limit: Option<usize> = None;

    let base_config = Config::new()
        .with_ths_cookie(cookie)
        .with_debug_industry_limit(debug_limit);

    let scraper = Arc::new(ThsScraper::new(
        base_config.ths_cookie.clone(),
        Duration::from_millis(base_config.request_interval_ms),
    )?);

    if let Some(matches) = matches.subcommand_matches("screen") {
        let threshold: f64 = parse_arg(matches, "threshold")?.unwrap_or(base_config.threshold);
        let workers: usize = parse_arg(matches, "workers")?.unwrap_or(MAX_WORKERS);
        let start = util::parse_user_date(matches.value_of("start").unwrap_or_default())?;
        let end = util::parse_user_date(matches.value_of("end").unwrap_or_default())?;

        // 创建配置
        let config = base_config
            .with_threshold(threshold)
            .with_workers(workers)
            .with_start_date(start)
            .with_end_date(end);
        config.validate().context("invalid screening options")?;

        let request = ScreenRequest::from_config(&config);
        let service = ScreenService::new(config, scraper);

        if let Some(name) = matches.value_of("industry") {
            match service.evaluate_by_name(name, &request).await? {
                IndustryOutcome::Evaluated(verdict) => {
                    let verdict_text = if verdict.passes(request.threshold) { "满足" } else { "不满足" };
                    println!(
                        "{}: long {:.2}, short {:.2}, 差值 {:.2} ({})",
                        verdict.name, verdict.long, verdict.short, verdict.gap, verdict_text
                    );
                }
                IndustryOutcome::Insufficient(name) => {
                    println!("{}: 数据不足，无法计算 DKBY", name);
                }
            }
            return Ok(());
        }

        let report = if matches.is_present("sequential") {
            service.screen_sequential(&request).await?
        } else {
            service.screen(&request).await?
        };
        print_report(&report);
    } else if matches.subcommand_matches("industries").is_some() {
        let industries = scraper.fetch_industry_list().await?;
        for industry in &industries {
            println!("{:<8} {}", industry.code, industry.name);
        }
        info!("{} industries from {}", industries.len(), scraper.source_code());
    } else if let Some(matches) = matches.subcommand_matches("serve") {
        let threshold: f64 = parse_arg(matches, "threshold")?.unwrap_or(base_config.threshold);
        let bind = matches.value_of("bind").unwrap_or("127.0.0.1:8501");

        let config = base_config.with_threshold(threshold).with_bind_addr(bind);
        config.validate().context("invalid server options")?;

        web::serve(Arc::new(ScreenService::new(config, scraper))).await?;
    } else {
        bail!("No command specified. Use --help for usage information.");
    }

    Ok(())
}

//! DKBY 多空指标
//!
//! 基于 21 周最高/最低价区间内收盘价的位置，构造两条原始振荡序列，
//! 再用通达信式 SMA（alpha = M/N 的指数平滑）平滑：
//!
//! ```text
//! VAR1  = (HHV21 - C) / (HHV21 - LLV21) * 100 - 10
//! VAR2  = (C - LLV21) / (HHV21 - LLV21) * 100
//! LONG  = SMA(SMA(VAR2, 13, 8), 13, 8)
//! SHORT = SMA(VAR1, 21, 8)
//! ```
//!
//! 预热期内的值为 NaN。

use serde::Serialize;
use crate::models::bar::WeeklyBar;

/// 最高/最低价的滚动窗口长度
pub const WINDOW: usize = 21;

/// 每根周线对应的多空值，预热期为 NaN
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DkbyPoint {
    pub long: f64,
    pub short: f64,
}

/// 最新一根周线的有效读数
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DkbyReading {
    pub long: f64,
    pub short: f64,
}

impl DkbyReading {
    pub fn gap(&self) -> f64 {
        self.long - self.short
    }

    pub fn is_within(&self, threshold: f64) -> bool {
        gap_within(self.gap(), threshold)
    }
}

/// 入选规则：多空差的绝对值严格小于阈值。NaN 永不入选
pub fn gap_within(gap: f64, threshold: f64) -> bool {
    gap.abs() < threshold
}

/// 通达信 SMA(X, N, M)：alpha = M/N 的非调整指数平滑。
///
/// 以第一个有效值为初值；之后遇到 NaN 时沿用上一个输出，
/// 但旧值权重继续按 (1 - alpha) 衰减。
pub fn sma_tdx(values: &[f64], n: u32, m: u32) -> Vec<f64> {
    let alpha = m as f64 / n as f64;
    let decay = 1.0 - alpha;

    let mut output = Vec::with_capacity(values.len());
    let mut weighted = f64::NAN;
    let mut old_weight = 1.0;

    for &current in values {
        let observed = !current.is_nan();
        if !weighted.is_nan() {
            old_weight *= decay;
            if observed {
                if weighted != current {
                    weighted = (old_weight * weighted + alpha * current) / (old_weight + alpha);
                }
                old_weight = 1.0;
            }
        } else if observed {
            weighted = current;
        }
        output.push(weighted);
    }

    output
}

fn rolling<F>(values: &[f64], window: usize, pick: F) -> Vec<f64>
where
    F: Fn(f64, f64) -> f64,
{
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return f64::NAN;
            }
            let slice = &values[i + 1 - window..=i];
            if slice.iter().any(|v| v.is_nan()) {
                return f64::NAN;
            }
            slice.iter().copied().reduce(&pick).unwrap_or(f64::NAN)
        })
        .collect()
}

/// 滚动最高值（HHV），窗口未满时为 NaN
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, f64::max)
}

/// 滚动最低值（LLV），窗口未满时为 NaN
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, f64::min)
}

/// 计算整条周线序列的 DKBY
pub fn compute_dkby(bars: &[WeeklyBar]) -> Vec<DkbyPoint> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let hhv = rolling_max(&highs, WINDOW);
    let llv = rolling_min(&lows, WINDOW);

    let mut var1 = Vec::with_capacity(bars.len());
    let mut var2 = Vec::with_capacity(bars.len());
    for ((bar, &h), &l) in bars.iter().zip(&hhv).zip(&llv) {
        let c = bar.close;
        var1.push((h - c) / (h - l) * 100.0 - 10.0);
        var2.push((c - l) / (h - l) * 100.0);
    }

    let var3 = sma_tdx(&var2, 13, 8);
    let long = sma_tdx(&var3, 13, 8);
    let short = sma_tdx(&var1, 21, 8);

    long.into_iter()
        .zip(short)
        .map(|(long, short)| DkbyPoint { long, short })
        .collect()
}

/// 最新一根周线的读数；不足 21 根或数值无效时返回 None
pub fn latest_reading(bars: &[WeeklyBar]) -> Option<DkbyReading> {
    if bars.len() < WINDOW {
        return None;
    }

    let last = compute_dkby(bars).pop()?;
    if !last.long.is_finite() || !last.short.is_finite() {
        return None;
    }

    Some(DkbyReading {
        long: last.long,
        short: last.short,
    })
}

use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseConfigError;
use crate::Idx3d;

/// 生长准入判据.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GrowthMode {
    /// 下界取种子的源值, 候选值不低于下界时准入.
    ///
    /// 被准入的值本来就不低于下界, 因此吸收它也不会降低下界:
    /// 整个分支的阈值等价于固定为种子的源值.
    Min,

    /// 上界取种子的源值, 候选值不高于上界时准入. 与 `Min` 同理, 上界在整个分支内不变.
    Max,

    /// 上下界都取种子的源值, 即只吸收与种子源值相等的连通体素.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "min_max"))]
    MinMax,

    /// 由本次调用全部种子的源值统计出 `mean ± k * stddev`, 所有种子共享.
    #[cfg_attr(feature = "serde", serde(alias = "std_dev"))]
    StdDev,
}

impl GrowthMode {
    /// 区间是否由各个种子各自决定. 否则由全部种子共同统计得出.
    #[inline]
    pub const fn is_per_seed(self) -> bool {
        !matches!(self, Self::StdDev)
    }
}

impl FromStr for GrowthMode {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "minmax" | "min_max" => Ok(Self::MinMax),
            "stddev" | "std_dev" => Ok(Self::StdDev),
            _ => Err(ParseConfigError::UnknownMode(s.to_owned())),
        }
    }
}

/// 闭区间 `[lower, upper]`. 端点可以是无穷.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Band {
    lower: f64,
    upper: f64,
}

impl Band {
    /// 创建区间.
    #[inline]
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// 以种子源值 `v` 决定的区间. `StdDev` 模式不使用该方法.
    #[inline]
    pub fn seeded(mode: GrowthMode, v: f64) -> Self {
        match mode {
            GrowthMode::Min => Self::new(v, f64::INFINITY),
            GrowthMode::Max => Self::new(f64::NEG_INFINITY, v),
            GrowthMode::MinMax | GrowthMode::StdDev => Self::new(v, v),
        }
    }

    /// 由一组样本计算 `mean ± k * stddev` (总体标准差). 样本为空时返回 `None`.
    pub fn from_stats<I: IntoIterator<Item = f64>>(values: I, k: f64) -> Option<Self> {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let half = k * var.sqrt();
        Some(Self::new(mean - half, mean + half))
    }

    /// 下界.
    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// 上界.
    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// `v` 是否在区间内. `NaN` 永远不在.
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        self.lower <= v && v <= self.upper
    }
}

/// 生长分支状态. 每个种子各自携带一份, 原样传给它生长出来的体素,
/// 因此多个种子互不影响.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Branch {
    /// 该分支的源头种子.
    pub origin: Idx3d,

    /// 准入区间.
    pub band: Band,
}

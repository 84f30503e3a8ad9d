#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::GrowthMode;
use crate::consts::{DEFAULT_FILL_VALUE, DEFAULT_STDDEV_FACTOR, UNBOUNDED_RADIUS};

/// 区域生长参数.
///
/// 这些参数由上层服务从配置中解析出来, 这里只作为普通参数消费.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GrowthConfig {
    /// 填充值. 写入时四舍五入并截断到标签体数据的存储类型.
    pub value: f64,

    /// 生长半径 (世界坐标单位), 从各自的源头种子算起. `+inf` 表示不限制.
    /// 负数或 `NaN` 视为空操作.
    pub radius: f64,

    /// 是否允许改写已标注 (非 0) 的体素.
    pub overwrite: bool,

    /// 准入判据.
    pub mode: GrowthMode,

    /// `StdDev` 模式的区间半宽倍率 `k`.
    pub stddev_factor: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_FILL_VALUE,
            radius: UNBOUNDED_RADIUS,
            overwrite: true,
            mode: GrowthMode::default(),
            stddev_factor: DEFAULT_STDDEV_FACTOR,
        }
    }
}

impl GrowthConfig {
    /// 以给定填充值、半径、覆盖策略和判据创建配置, `k` 取默认值.
    #[inline]
    pub fn new(value: f64, radius: f64, overwrite: bool, mode: GrowthMode) -> Self {
        Self {
            value,
            radius,
            overwrite,
            mode,
            stddev_factor: DEFAULT_STDDEV_FACTOR,
        }
    }

    /// 半径是否无意义 (负数或 `NaN`). 此时生长为空操作.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.radius.is_nan() || self.radius < 0.0
    }
}

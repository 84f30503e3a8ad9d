//! 通用常量.

/// `StdDev` 模式下, 准入区间的默认半宽倍率 `k`: 区间为 `mean ± k * stddev`.
///
/// 三个种子中两个相近、一个离群时, 两个相近种子相对均值的偏差为 `d / 3`,
/// 离群种子为 `2d / 3`, 总体标准差约为 `0.471d`. 因此 `k` 必须落在
/// `(0.71, 1.41)` 之间才能区分二者. 取 `1.0`.
pub const DEFAULT_STDDEV_FACTOR: f64 = 1.0;

/// 默认画笔粗细 (直径), 世界坐标单位.
pub const DEFAULT_THICKNESS: f64 = 1.0;

/// 默认填充值.
pub const DEFAULT_FILL_VALUE: f64 = 1.0;

/// 生长半径不设上限.
pub const UNBOUNDED_RADIUS: f64 = f64::INFINITY;

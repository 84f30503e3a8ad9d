use std::fmt::Debug;

use num::{PrimInt, ToPrimitive};

/// 标签 (mask) 体数据的存储类型: 任意宽度的有/无符号整数. `0` 为背景.
pub trait Voxel: PrimInt + Debug + Default + Send + Sync + 'static {
    /// 背景值.
    #[inline]
    fn background() -> Self {
        Self::zero()
    }

    /// 是否为背景.
    #[inline]
    fn is_background(self) -> bool {
        self.is_zero()
    }

    /// 将浮点数写入值转换为存储类型.
    ///
    /// 先四舍五入 (远离零方向), 再截断到该类型的可表示范围内. `NaN` 被视为背景.
    fn from_f64_clamped(v: f64) -> Self {
        if v.is_nan() {
            return Self::background();
        }
        let r = v.round();
        let lo = Self::min_value().to_f64().unwrap_or(f64::MIN);
        let hi = Self::max_value().to_f64().unwrap_or(f64::MAX);
        if r <= lo {
            Self::min_value()
        } else if r >= hi {
            Self::max_value()
        } else {
            num::cast(r).unwrap_or_else(Self::background)
        }
    }
}

impl<T: PrimInt + Debug + Default + Send + Sync + 'static> Voxel for T {}

/// 源图像 (强度) 体数据的元素类型. 任意能无损或近似转换为 `f64` 的数值,
/// 包括以 `f32` 保存 HU 值的 CT 扫描.
pub trait Sample: Copy + ToPrimitive + Debug {
    /// 扩展为 `f64`, 统计运算都在该精度下进行.
    #[inline]
    fn widen(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl<T: Copy + ToPrimitive + Debug> Sample for T {}

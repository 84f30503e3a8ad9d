use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseConfigError;

/// 正交切片方向. 由切片法向 (保持不变的那个坐标轴) 决定.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    /// 矢状面, `x` 不变.
    #[cfg_attr(feature = "serde", serde(alias = "sagittal"))]
    X,

    /// 冠状面, `y` 不变.
    #[cfg_attr(feature = "serde", serde(alias = "frontal", alias = "coronal"))]
    Y,

    /// 横断面 (轴位), `z` 不变.
    #[cfg_attr(feature = "serde", serde(alias = "axial"))]
    Z,
}

impl Orientation {
    /// 保持不变的坐标轴序号 (`0 => x`, `1 => y`, `2 => z`).
    #[inline]
    pub const fn axis(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// 切片平面内的两个坐标轴序号. 第一个分量在行优先存储中变化更快.
    #[inline]
    pub const fn plane_axes(self) -> (usize, usize) {
        match self {
            Self::X => (1, 2),
            Self::Y => (0, 2),
            Self::Z => (0, 1),
        }
    }
}

impl FromStr for Orientation {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" | "x_axis" | "sagittal" => Ok(Self::X),
            "y" | "y_axis" | "frontal" | "coronal" => Ok(Self::Y),
            "z" | "z_axis" | "axial" => Ok(Self::Z),
            _ => Err(ParseConfigError::UnknownOrientation(s.to_owned())),
        }
    }
}

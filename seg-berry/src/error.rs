//! 运行时错误.
//!
//! 越界访问之类的前置条件错误不在这里, 它们会直接 panic.

use thiserror::Error;

/// 构建 [`Volume`](crate::Volume) 时的错误.
#[derive(Copy, Clone, Debug, Error, PartialEq)]
pub enum VolumeError {
    /// 某个维度的体素个数为 0.
    #[error("体数据形状 {0:?} 存在空维度")]
    EmptyShape([usize; 3]),

    /// 数据长度与形状不一致. 第一个参数为期望长度, 第二个参数为实际长度.
    #[error("数据长度不一致: 期望 {0}, 实际 {1}")]
    LengthMismatch(usize, usize),

    /// 体素间距必须为有限正数.
    #[error("体素间距非法: {0:?}")]
    InvalidSpacing([f64; 3]),

    /// 原点必须为有限值.
    #[error("原点非法: {0:?}")]
    InvalidOrigin([f64; 3]),
}

/// 体数据构建结果.
pub type VolumeResult<T> = Result<T, VolumeError>;

/// 从字符串解析配置项时的错误.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseConfigError {
    /// 未知的生长模式.
    #[error("未知的生长模式 `{0}`, 可选: min, max, minmax, stddev")]
    UnknownMode(String),

    /// 未知的切片方向.
    #[error("未知的切片方向 `{0}`, 可选: x, y, z (sagittal, frontal, axial)")]
    UnknownOrientation(String),
}

#![warn(missing_docs)] // <= 合适时移除它.

//! 交互式 3D 分割核心库. 提供基于种子点的区域生长 (flood-fill) 传播引擎.
//!
//! 用户在某个正交切片上用画笔画一笔 (stroke), 笔迹覆盖到的体素成为种子,
//! 然后以这些种子为起点在三维体数据中向外生长标签. 所有对标签体数据的写入都会被记录成
//! [`VoxelDiff`], 一笔 (包括其后的传播) 对应一个可撤销单元.
//!
//! 该 crate 仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 不负责读写任何文件, 也不负责界面交互. 鼠标事件到世界坐标的换算、
//!   撤销栈的展示、渲染等由上层负责.
//! 2. 越界等前置条件不满足时, 程序会直接 panic (函数文档中会注明), 而不会导致内存错误.
//! 3. "什么都没发生" 从来不是错误, 总是以空的 [`VoxelDiff`] (或 `None`) 表示.
//!
//! # 开发计划
//!
//! ### 稀疏改动记录 (diff) ✅
//!
//! 有序记录 `(索引, 旧值, 新值)`, 支持合并、重放、撤销, 以及按索引压缩.
//!
//! 实现位于 `seg-berry/src/diff`.
//!
//! ### 切片内粗线光栅化 ✅
//!
//! 在某个正交切片上, 以给定粗细 (世界坐标单位) 画一条线段 (胶囊形状).
//! 支持 ROI 掩码与覆盖策略.
//!
//! 实现位于 `seg-berry/src/draw`.
//!
//! ### 三维种子区域生长 ✅
//!
//! 6-邻域广度优先生长, 支持 `Min`, `Max`, `MinMax`, `StdDev` 四种准入判据,
//! 支持半径限制与覆盖策略. 可以同时返回被吸收体素的原始强度样本.
//!
//! 实现位于 `seg-berry/src/grow`.
//!
//! ### 交互式传播会话 ✅
//!
//! 把 "按下 - 移动 - 抬起" 的指针事件流转换为画线与生长调用, 最终提交一个 diff.
//!
//! 实现位于 `seg-berry/src/session.rs`.
//!
//! ### GPU 加速 ❌
//!
//! 不在计划内.

/// 三维索引, 按 `(x, y, z)` 排列. 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 带符号三维索引, 按 `(x, y, z)` 排列. 世界坐标换算出来的体素坐标可能越界, 因此需要符号.
pub type Idx3dI64 = (i64, i64, i64);

/// 世界坐标 (物理单位, 一般为毫米), 按 `(x, y, z)` 排列.
pub type World3d = [f64; 3];

/// 体数据及其元信息.
mod data;

pub mod consts;
pub mod diff;
pub mod draw;
pub mod error;
pub mod grow;
pub mod prelude;
pub mod session;

pub use data::{IndexLayout, Orientation, Sample, Volume, Voxel};

pub use diff::{UndoHistory, VoxelChange, VoxelDiff};
pub use draw::LineDrawer;
pub use error::{ParseConfigError, VolumeError, VolumeResult};
pub use grow::{GrowthConfig, GrowthMode, GrowthOutcome, RegionGrower};
pub use session::{Canvas, PropagationSession, SessionConfig};

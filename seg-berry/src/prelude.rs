//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx3d, Idx3dI64, World3d};

pub use crate::data::{IndexLayout, Orientation, Sample, Volume, Voxel};
pub use crate::diff::{UndoHistory, VoxelChange, VoxelDiff};

pub use crate::draw::LineDrawer;
pub use crate::grow::{GrowthConfig, GrowthMode, GrowthOutcome, RegionGrower};
pub use crate::session::{Canvas, PropagationSession, SessionConfig};

pub use crate::consts::{DEFAULT_STDDEV_FACTOR, DEFAULT_THICKNESS};
pub use crate::error::{VolumeError, VolumeResult};

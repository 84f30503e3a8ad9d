//! 交互式传播会话.
//!
//! 将一次 "按下 - 移动* - 抬起" 手势转换为若干次画线, 抬起时以笔迹覆盖的体素为种子做区域生长,
//! 并把笔迹与生长的全部改动作为 **一个** 可撤销单元交给调用者.
//!
//! 笔迹会立刻写入标签体数据 (以便上层实时显示), 因此中途放弃手势时需要回滚.

use std::mem;

use log::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_THICKNESS;
use crate::data::{Orientation, Sample, Voxel};
use crate::{GrowthConfig, Idx3d, LineDrawer, RegionGrower, Volume, VoxelDiff, World3d};

/// 会话配置.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// 画线所在的切片方向.
    pub orientation: Orientation,

    /// 画笔粗细 (直径), 世界坐标单位.
    pub thickness: f64,

    /// 区域生长参数. 其中的填充值与覆盖策略同样用于画线.
    pub growth: GrowthConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Z,
            thickness: DEFAULT_THICKNESS,
            growth: GrowthConfig::default(),
        }
    }
}

/// 一次事件处理期间会话可以访问的体数据.
///
/// 借用期间对 `mask` 独占, 即相当于持有标签体数据的写锁.
pub struct Canvas<'a, S, M> {
    /// 源图像, 只读.
    pub source: &'a Volume<S>,

    /// 标签体数据.
    pub mask: &'a mut Volume<M>,

    /// 可选 ROI, 只写入其中非 0 的位置.
    pub roi: Option<&'a Volume<M>>,
}

impl<'a, S, M> Canvas<'a, S, M> {
    /// 不带 ROI 的画布.
    #[inline]
    pub fn new(source: &'a Volume<S>, mask: &'a mut Volume<M>) -> Self {
        Self {
            source,
            mask,
            roi: None,
        }
    }

    /// 附加 ROI.
    #[inline]
    pub fn with_roi(self, roi: &'a Volume<M>) -> Self {
        Self {
            roi: Some(roi),
            ..self
        }
    }
}

/// 会话状态.
#[derive(Debug)]
enum State<M> {
    /// 没有进行中的手势.
    Idle,

    /// 手势进行中. `last` 为上一个指针位置, `diff` 为尚未提交的改动.
    Stroking { last: World3d, diff: VoxelDiff<M> },
}

/// 交互式传播会话.
///
/// 非 [`Self::on_pointer_down`] 的事件在空闲状态下会被忽略, 而不是报错:
/// 这能容忍上层焦点切换与指针事件之间的竞争.
#[derive(Debug)]
pub struct PropagationSession<M> {
    config: SessionConfig,
    state: State<M>,

    /// 最近一次提交时, 生长吸收的源值 (扩展为 `f64`).
    samples: Vec<f64>,
}

impl<M: Voxel> Default for PropagationSession<M> {
    #[inline]
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl<M: Voxel> PropagationSession<M> {
    /// 创建空闲会话.
    #[inline]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: State::Idle,
            samples: vec![],
        }
    }

    /// 当前配置.
    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// 更新配置. 只能在空闲时更新, 手势进行中返回 `false` 且不做任何修改.
    pub fn set_config(&mut self, config: SessionConfig) -> bool {
        if self.is_stroking() {
            return false;
        }
        self.config = config;
        true
    }

    /// 更新切片方向. 规则同 [`Self::set_config`].
    #[inline]
    pub fn set_orientation(&mut self, orientation: Orientation) -> bool {
        self.set_config(SessionConfig {
            orientation,
            ..self.config
        })
    }

    /// 更新画笔粗细. 规则同 [`Self::set_config`].
    #[inline]
    pub fn set_thickness(&mut self, thickness: f64) -> bool {
        self.set_config(SessionConfig {
            thickness,
            ..self.config
        })
    }

    /// 更新生长参数. 规则同 [`Self::set_config`].
    #[inline]
    pub fn set_growth(&mut self, growth: GrowthConfig) -> bool {
        self.set_config(SessionConfig {
            growth,
            ..self.config
        })
    }

    /// 是否有进行中的手势.
    #[inline]
    pub fn is_stroking(&self) -> bool {
        matches!(self.state, State::Stroking { .. })
    }

    /// 最近一次 [`Self::on_pointer_up`] 提交时, 每个被生长接纳的体素 (包括笔迹种子) 的源值,
    /// 按接纳顺序排列. 用于检查哪些强度被并入了标签. 下一次提交时被替换.
    #[inline]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// 进行中手势尚未提交的改动. 空闲时返回 `None`.
    #[inline]
    pub fn pending(&self) -> Option<&VoxelDiff<M>> {
        match &self.state {
            State::Idle => None,
            State::Stroking { diff, .. } => Some(diff),
        }
    }

    /// 指针按下: 开始手势, 并在 `point` 处画一个圆盘标记起点.
    ///
    /// 手势进行中时忽略.
    pub fn on_pointer_down<S: Sample>(&mut self, canvas: &mut Canvas<'_, S, M>, point: World3d) {
        if self.is_stroking() {
            return;
        }
        let diff = self.stroke(canvas, &point, &point);
        trace!("手势开始于 {point:?}");
        self.state = State::Stroking { last: point, diff };
    }

    /// 指针移动: 从上一个位置画线到 `point`.
    ///
    /// 空闲时忽略.
    pub fn on_pointer_move<S: Sample>(&mut self, canvas: &mut Canvas<'_, S, M>, point: World3d) {
        let State::Stroking { last, .. } = self.state else {
            return;
        };
        let segment = self.stroke(canvas, &last, &point);
        if let State::Stroking { last, diff } = &mut self.state {
            diff.merge(segment);
            *last = point;
        }
    }

    /// 指针抬起: 画完最后一段, 以整个手势改动过的体素为种子生长, 然后回到空闲状态.
    ///
    /// # 返回值
    ///
    /// 笔迹与生长的全部改动 (按写入顺序) 作为一个可撤销单元返回.
    /// 空闲时, 或者整个手势什么都没改时, 返回 `None`.
    pub fn on_pointer_up<S: Sample>(
        &mut self,
        canvas: &mut Canvas<'_, S, M>,
        point: World3d,
    ) -> Option<VoxelDiff<M>> {
        let State::Stroking { last, mut diff } = mem::replace(&mut self.state, State::Idle) else {
            return None;
        };
        diff.merge(self.stroke(canvas, &last, &point));

        let layout = canvas.mask.layout();
        let seeds: Vec<Idx3d> = diff
            .distinct_indices()
            .into_iter()
            .map(|i| layout.coord_of(i))
            .collect();
        let stroke_len = diff.count();
        let grown = RegionGrower::with_roi(canvas.source, &mut *canvas.mask, canvas.roi)
            .propagate_sampled(&seeds, &self.config.growth);
        diff.merge(grown.diff);
        self.samples = grown.samples.into_iter().map(Sample::widen).collect();

        debug!(
            "手势提交: 笔迹 {stroke_len} 条改动, 生长 {} 条改动",
            diff.count() - stroke_len
        );
        (!diff.is_empty()).then_some(diff)
    }

    /// 放弃进行中的手势: 回滚已经写入 `mask` 的笔迹, 回到空闲状态. 不产生任何提交.
    ///
    /// 空闲时什么也不做.
    pub fn on_reset(&mut self, mask: &mut Volume<M>) {
        if let State::Stroking { diff, .. } = mem::replace(&mut self.state, State::Idle) {
            debug!("手势被重置, 回滚 {} 条改动", diff.count());
            diff.revert(mask);
        }
    }

    /// 丢弃进行中的手势但不回滚. 用于标签体数据已经被外部替换的情况.
    pub fn abandon(&mut self) {
        if let State::Stroking { diff, .. } = mem::replace(&mut self.state, State::Idle) {
            debug!("手势被丢弃, 未回滚 {} 条改动", diff.count());
        }
    }

    /// 按当前配置画一段线.
    fn stroke<S>(
        &self,
        canvas: &mut Canvas<'_, S, M>,
        from: &World3d,
        to: &World3d,
    ) -> VoxelDiff<M> {
        let growth = &self.config.growth;
        LineDrawer::with_roi(&mut *canvas.mask, canvas.roi).draw(
            self.config.orientation,
            from,
            to,
            M::from_f64_clamped(growth.value),
            self.config.thickness,
            growth.overwrite,
        )
    }
}

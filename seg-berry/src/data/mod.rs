use std::ops::{Index, IndexMut};

use ndarray::{s, Array3, ArrayView3, ArrayViewMut3};
use num::Zero;

use crate::error::{VolumeError, VolumeResult};
use crate::{Idx3d, Idx3dI64, World3d};

mod layout;
mod orientation;
mod scalar;

pub use layout::IndexLayout;
pub use orientation::Orientation;
pub use scalar::{Sample, Voxel};

/// 将 `(x, y, z)` 转换成 `[z, y, x]`. 内部 `ndarray` 均按照该模式访问.
#[inline]
const fn nd((x, y, z): &Idx3d) -> [usize; 3] {
    [*z, *y, *x]
}

/// 三维标量体数据, 包括数据本身和物理元信息 (体素间距与原点).
///
/// 数据按 `[z, y, x]` 标准布局保存, 因此线性索引与 [`IndexLayout`] 一致:
/// `x + y * size_x + z * size_x * size_y`.
///
/// 对外的所有坐标均按 `(x, y, z)` 排列.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume<T> {
    data: Array3<T>,
    layout: IndexLayout,
    spacing: [f64; 3],
    origin: [f64; 3],
}

/// 检查形状与物理元信息是否合法.
fn validate(size: [usize; 3], spacing: [f64; 3], origin: [f64; 3]) -> VolumeResult<()> {
    if size.contains(&0) {
        return Err(VolumeError::EmptyShape(size));
    }
    if !spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
        return Err(VolumeError::InvalidSpacing(spacing));
    }
    if !origin.iter().all(|o| o.is_finite()) {
        return Err(VolumeError::InvalidOrigin(origin));
    }
    Ok(())
}

impl<T: Clone + Zero> Volume<T> {
    /// 创建全 0 体数据. `size`, `spacing`, `origin` 均按 `[x, y, z]` 排列.
    ///
    /// 任一维度为 0, 间距不是有限正数或原点不是有限值时返回 `Err`.
    pub fn new(size: [usize; 3], spacing: [f64; 3], origin: [f64; 3]) -> VolumeResult<Self> {
        validate(size, spacing, origin)?;
        let [sx, sy, sz] = size;
        Ok(Self {
            data: Array3::zeros((sz, sy, sx)),
            layout: IndexLayout::new(size),
            spacing,
            origin,
        })
    }
}

impl<T> Volume<T> {
    /// 由裸数据创建体数据. `data` 必须按 `x` 变化最快的行优先顺序存储.
    ///
    /// 除 [`Volume::new`] 的检查外, 数据长度与形状不一致时也返回 `Err`.
    pub fn from_shape_vec(
        size: [usize; 3],
        data: Vec<T>,
        spacing: [f64; 3],
        origin: [f64; 3],
    ) -> VolumeResult<Self> {
        validate(size, spacing, origin)?;
        let layout = IndexLayout::new(size);
        let (expected, actual) = (layout.len(), data.len());
        let [sx, sy, sz] = size;
        let data = Array3::from_shape_vec((sz, sy, sx), data)
            .map_err(|_| VolumeError::LengthMismatch(expected, actual))?;
        Ok(Self {
            data,
            layout,
            spacing,
            origin,
        })
    }

    /// `[x, y, z]` 三个方向的体素个数.
    #[inline]
    pub fn size(&self) -> [usize; 3] {
        self.layout.size()
    }

    /// 线性存储布局.
    #[inline]
    pub fn layout(&self) -> IndexLayout {
        self.layout
    }

    /// 体素间距, 按 `[x, y, z]` 排列.
    #[inline]
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// 原点, 按 `[x, y, z]` 排列.
    #[inline]
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// 体素总数.
    #[inline]
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    /// 是否不含任何体素. 合法构建的体数据总是返回 `false`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// 检查索引是否合法.
    #[inline]
    pub fn check(&self, pos: &Idx3d) -> bool {
        self.layout.check(pos)
    }

    /// 获取 `pos` 处的体素. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx3d) -> Option<&T> {
        self.data.get(nd(&pos))
    }

    /// 获得数据的一份不可变 shallow copy. 轴顺序为 `[z, y, x]`.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, T> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy. 轴顺序为 `[z, y, x]`.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut3<'_, T> {
        self.data.view_mut()
    }

    /// 世界坐标 -> 体素坐标: `round((world - origin) / spacing)`. 结果可能越界.
    pub fn world_to_voxel(&self, world: &World3d) -> Idx3dI64 {
        let f = |i: usize| ((world[i] - self.origin[i]) / self.spacing[i]).round() as i64;
        (f(0), f(1), f(2))
    }

    /// 体素坐标 -> 世界坐标 (体素中心).
    pub fn voxel_to_world(&self, &(x, y, z): &Idx3d) -> World3d {
        let f = |i: usize, v: usize| self.origin[i] + v as f64 * self.spacing[i];
        [f(0, x), f(1, y), f(2, z)]
    }

    /// 获取 `pos` 的六个面相邻点坐标, 越界的会被过滤掉.
    #[inline]
    pub fn face_neighbours(&self, pos: Idx3d) -> impl Iterator<Item = Idx3d> {
        self.layout.face_neighbours(pos)
    }

    /// 判断另一体数据是否与自身形状一致.
    #[inline]
    pub fn same_shape<U>(&self, other: &Volume<U>) -> bool {
        self.size() == other.size()
    }
}

impl<T: Copy> Volume<T> {
    /// 按线性索引读取体素.
    ///
    /// 越界时 panic.
    #[inline]
    pub fn at(&self, index: usize) -> T {
        assert!(index < self.len(), "线性索引 {index} 越界");
        self[self.layout.coord_of(index)]
    }

    /// 按线性索引写入体素, 返回旧值.
    ///
    /// 越界时 panic.
    #[inline]
    pub fn set(&mut self, index: usize, value: T) -> T {
        assert!(index < self.len(), "线性索引 {index} 越界");
        let pos = self.layout.coord_of(index);
        std::mem::replace(&mut self[pos], value)
    }

    /// 将 `[from, to)` 长方体区域 (半开区间, `(x, y, z)`) 全部填充为 `value`.
    ///
    /// 区域越界时 panic.
    pub fn fill_box(&mut self, from: Idx3d, to: Idx3d, value: T) {
        let (x0, y0, z0) = from;
        let (x1, y1, z1) = to;
        self.data.slice_mut(s![z0..z1, y0..y1, x0..x1]).fill(value);
    }
}

impl<T: Copy + PartialEq> Volume<T> {
    /// 获取值为 `value` 的体素个数.
    #[inline]
    pub fn count(&self, value: T) -> usize {
        self.data.iter().filter(|p| **p == value).count()
    }

    /// 将值为 `old` 的体素全部替换为 `new`.
    ///
    /// 返回总共成功替换的个数.
    pub fn replace(&mut self, old: T, new: T) -> usize {
        let mut cnt = 0usize;
        self.data.iter_mut().filter(|p| **p == old).for_each(|p| {
            cnt += 1;
            *p = new;
        });
        cnt
    }
}

impl<T> Index<Idx3d> for Volume<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[nd(&index)]
    }
}

impl<T> IndexMut<Idx3d> for Volume<T> {
    #[inline]
    fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
        &mut self.data[nd(&index)]
    }
}

//! 切片内的粗线光栅化.
//!
//! 线段被限制在某个正交切片内. 以 Bresenham 算法在切片平面内从起点走到终点,
//! 在每一步盖上一个直径为 `thickness` (世界坐标单位) 的圆盘, 整体得到一个胶囊形状.
//! 由于体素可以是各向异性的, 圆盘在体素网格上一般是椭圆.

use log::trace;

use crate::data::{Orientation, Voxel};
use crate::{Idx3d, Idx3dI64, Volume, VoxelChange, VoxelDiff, World3d};

mod bresenham;

pub use bresenham::{Bresenham, Idx2dI64};

/// 将切片平面坐标 `(a, b)` 和切片序号放回三维带符号坐标.
#[inline]
fn lift(orientation: Orientation, slice: i64, (a, b): Idx2dI64) -> Idx3dI64 {
    match orientation {
        Orientation::X => (slice, a, b),
        Orientation::Y => (a, slice, b),
        Orientation::Z => (a, b, slice),
    }
}

/// 取出三维带符号坐标在切片平面上的分量.
#[inline]
fn project(orientation: Orientation, (x, y, z): Idx3dI64) -> Idx2dI64 {
    match orientation {
        Orientation::X => (y, z),
        Orientation::Y => (x, z),
        Orientation::Z => (x, y),
    }
}

/// 画笔在切片平面内的最大作用距离 (体素个数). 更远的笔迹中心被直接裁掉,
/// 以保证 Bresenham 的整数运算不会溢出.
const MAX_REACH: i64 = 1 << 40;

/// 圆盘 (体素网格上的椭圆) 印章.
#[derive(Copy, Clone, Debug)]
struct Disk {
    /// 两个平面轴上的体素间距.
    spacing: (f64, f64),

    /// 半径的平方, 世界坐标单位.
    r2: f64,

    /// 两个平面轴上的最大体素偏移.
    reach: Idx2dI64,
}

impl Disk {
    /// 直径为 `thickness` 的圆盘. 粗细非正或不是有限值时退化为单个体素.
    fn new(thickness: f64, spacing: [f64; 3], orientation: Orientation) -> Self {
        let radius = if thickness.is_finite() && thickness > 0.0 {
            thickness / 2.0
        } else {
            0.0
        };
        let (ax, bx) = orientation.plane_axes();
        let (sa, sb) = (spacing[ax], spacing[bx]);
        Self {
            spacing: (sa, sb),
            r2: radius * radius,
            reach: ((radius / sa).floor() as i64, (radius / sb).floor() as i64),
        }
    }

    /// 偏移 `(da, db)` 是否落在圆盘内.
    #[inline]
    fn covers(&self, da: i64, db: i64) -> bool {
        let (fa, fb) = (da as f64 * self.spacing.0, db as f64 * self.spacing.1);
        fa * fa + fb * fb <= self.r2
    }
}

/// Liang-Barsky 裁剪: 将线段 `p0 -> p1` 裁剪到闭矩形 `[lo, hi]` 内.
///
/// 在矩形内的端点原样保留, 因此没越界的线段完全不受影响. 线段完全在矩形外时返回 `None`.
fn clip_segment(
    p0: Idx2dI64,
    p1: Idx2dI64,
    lo: Idx2dI64,
    hi: Idx2dI64,
) -> Option<(Idx2dI64, Idx2dI64)> {
    let inside = |(a, b): Idx2dI64| lo.0 <= a && a <= hi.0 && lo.1 <= b && b <= hi.1;
    if inside(p0) && inside(p1) {
        return Some((p0, p1));
    }

    let (a0, b0) = (p0.0 as f64, p0.1 as f64);
    let (da, db) = (p1.0 as f64 - a0, p1.1 as f64 - b0);
    let (mut t0, mut t1) = (0f64, 1f64);
    let edges = [
        (-da, a0 - lo.0 as f64),
        (da, hi.0 as f64 - a0),
        (-db, b0 - lo.1 as f64),
        (db, hi.1 as f64 - b0),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t0 = t0.max(q / p);
        } else {
            t1 = t1.min(q / p);
        }
    }
    if t0 > t1 {
        return None;
    }

    let at = |t: f64| -> Idx2dI64 {
        (
            ((a0 + t * da).round() as i64).clamp(lo.0, hi.0),
            ((b0 + t * db).round() as i64).clamp(lo.1, hi.1),
        )
    };
    let q0 = if inside(p0) { p0 } else { at(t0) };
    let q1 = if inside(p1) { p1 } else { at(t1) };
    Some((q0, q1))
}

/// 在标签体数据上画粗线.
///
/// 写入规则:
///
/// 1. 落在体数据之外的体素被静默裁剪;
/// 2. 若指定了 ROI, 则只写 ROI 中非 0 的位置;
/// 3. `overwrite == false` 时只写当前为背景 (0) 的体素;
/// 4. 当前值已经等于写入值时跳过, 不产生记录.
///
/// 返回的 diff 只包含真正被改动的体素.
pub struct LineDrawer<'a, T> {
    mask: &'a mut Volume<T>,
    roi: Option<&'a Volume<T>>,
}

impl<'a, T: Voxel> LineDrawer<'a, T> {
    /// 在 `mask` 上画线, 不限制区域.
    #[inline]
    pub fn new(mask: &'a mut Volume<T>) -> Self {
        Self { mask, roi: None }
    }

    /// 在 `mask` 上画线, 只写入 `roi` 中非 0 的位置.
    ///
    /// `roi` 与 `mask` 形状不一致时 panic.
    pub fn with_roi(mask: &'a mut Volume<T>, roi: Option<&'a Volume<T>>) -> Self {
        if let Some(r) = roi {
            assert!(mask.same_shape(r), "ROI 与标签形状不一致");
        }
        Self { mask, roi }
    }

    /// 在 `orientation` 方向的切片上, 从世界坐标 `from` 到 `to` 画一条粗细为 `thickness`
    /// (直径, 世界坐标单位) 的线段, 写入 `value`.
    ///
    /// 切片由 `from` 所在的体素决定, `to` 在切片法向上的分量被忽略.
    /// `from == to` 时画一个实心圆盘.
    pub fn draw(
        &mut self,
        orientation: Orientation,
        from: &World3d,
        to: &World3d,
        value: T,
        thickness: f64,
        overwrite: bool,
    ) -> VoxelDiff<T> {
        let from = self.mask.world_to_voxel(from);
        let to = self.mask.world_to_voxel(to);
        self.draw_voxels(orientation, from, to, value, thickness, overwrite)
    }

    /// 与 [`Self::draw`] 相同, 但端点直接以体素坐标给出.
    pub fn draw_voxels(
        &mut self,
        orientation: Orientation,
        from: Idx3dI64,
        to: Idx3dI64,
        value: T,
        thickness: f64,
        overwrite: bool,
    ) -> VoxelDiff<T> {
        let mut diff = VoxelDiff::new();
        let size = self.mask.size();
        let slice = [from.0, from.1, from.2][orientation.axis()];
        if slice < 0 || slice >= size[orientation.axis()] as i64 {
            trace!("切片 {slice} 在体数据外, 跳过画线");
            return diff;
        }

        let (ax, bx) = orientation.plane_axes();
        let (na, nb) = (size[ax] as i64, size[bx] as i64);
        let disk = Disk::new(thickness, self.mask.spacing(), orientation);
        let (ra, rb) = disk.reach;

        // 圆盘够不着体数据的笔迹中心没有意义, 先把线段裁剪到它们能起作用的范围内.
        let (reach_a, reach_b) = (ra.min(MAX_REACH), rb.min(MAX_REACH));
        let Some((p0, p1)) = clip_segment(
            project(orientation, from),
            project(orientation, to),
            (-reach_a, -reach_b),
            (na - 1 + reach_a, nb - 1 + reach_b),
        ) else {
            trace!("画线 {from:?} -> {to:?} 完全在体数据外");
            return diff;
        };

        let layout = self.mask.layout();
        for (a, b) in Bresenham::new(p0, p1) {
            // 圆盘外接矩形与切片的交集, 按切片行优先遍历.
            let (a_lo, a_hi) = (a.saturating_sub(ra).max(0), a.saturating_add(ra).min(na - 1));
            let (b_lo, b_hi) = (b.saturating_sub(rb).max(0), b.saturating_add(rb).min(nb - 1));
            for vb in b_lo..=b_hi {
                for va in a_lo..=a_hi {
                    if !disk.covers(va - a, vb - b) {
                        continue;
                    }
                    let p = lift(orientation, slice, (va, vb));
                    if let Some(pos) = layout.check_signed(&p) {
                        self.paint(pos, value, overwrite, &mut diff);
                    }
                }
            }
        }
        trace!(
            "画线 {from:?} -> {to:?} ({orientation:?}), 粗细 {thickness}, 改动 {} 个体素",
            diff.count()
        );
        diff
    }

    /// 按写入规则写单个体素, 并记录改动.
    #[inline]
    fn paint(&mut self, pos: Idx3d, value: T, overwrite: bool, diff: &mut VoxelDiff<T>) {
        if self.roi.is_some_and(|r| r[pos].is_background()) {
            return;
        }
        let cur = self.mask[pos];
        if cur == value || (!overwrite && !cur.is_background()) {
            return;
        }
        self.mask[pos] = value;
        let index = self.mask.layout().index_of(&pos);
        diff.append(VoxelChange::new(index, cur, value));
    }
}

use crate::{Idx3d, Idx3dI64};

/// 体数据的线性存储布局: 行优先, `x` 变化最快, 然后是 `y`, 最后是 `z`.
///
/// 线性索引与三维坐标之间的换算 **只** 在这里实现, 其他模块 (diff, 画线, 生长, 会话)
/// 统一通过该结构换算. 如果以后存储布局改变, 只需修改这一处.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexLayout {
    /// `[x, y, z]` 三个方向的体素个数.
    size: [usize; 3],
}

impl IndexLayout {
    /// 以 `[x, y, z]` 三个方向的体素个数创建布局.
    #[inline]
    pub const fn new(size: [usize; 3]) -> Self {
        Self { size }
    }

    /// `[x, y, z]` 三个方向的体素个数.
    #[inline]
    pub const fn size(&self) -> [usize; 3] {
        self.size
    }

    /// 体素总数.
    #[inline]
    pub const fn len(&self) -> usize {
        self.size[0] * self.size[1] * self.size[2]
    }

    /// 是否不含任何体素.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 检查索引是否合法.
    #[inline]
    pub const fn check(&self, (x, y, z): &Idx3d) -> bool {
        *x < self.size[0] && *y < self.size[1] && *z < self.size[2]
    }

    /// 检查带符号索引是否合法. 合法时返回对应的无符号索引.
    #[inline]
    pub fn check_signed(&self, &(x, y, z): &Idx3dI64) -> Option<Idx3d> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        let z = usize::try_from(z).ok()?;
        let pos = (x, y, z);
        self.check(&pos).then_some(pos)
    }

    /// 三维坐标 -> 线性索引: `x + y * size_x + z * size_x * size_y`.
    ///
    /// 不做越界检查, 越界坐标的结果无意义.
    #[inline]
    pub const fn index_of(&self, &(x, y, z): &Idx3d) -> usize {
        x + y * self.size[0] + z * self.size[0] * self.size[1]
    }

    /// 线性索引 -> 三维坐标. [`Self::index_of`] 的逆运算.
    ///
    /// 不做越界检查, 越界索引的结果无意义.
    #[inline]
    pub const fn coord_of(&self, index: usize) -> Idx3d {
        let [sx, sy, _] = self.size;
        (index % sx, (index / sx) % sy, (index / sx) / sy)
    }

    /// 获取 `pos` 前后上下左右六个面相邻点的坐标.
    ///
    /// 在数据范围外的坐标会被过滤掉, 不会出现在迭代结果中.
    pub fn face_neighbours(&self, (x, y, z): Idx3d) -> impl Iterator<Item = Idx3d> {
        let layout = *self;
        [
            (x.wrapping_sub(1), y, z),
            (x.saturating_add(1), y, z),
            (x, y.wrapping_sub(1), z),
            (x, y.saturating_add(1), z),
            (x, y, z.wrapping_sub(1)),
            (x, y, z.saturating_add(1)),
        ]
        .into_iter()
        .filter(move |p| layout.check(p))
    }
}

//! 体数据稀疏改动记录.
//!
//! 任何对标签体数据的写入都会产生一条 [`VoxelChange`]. 一个 [`VoxelDiff`]
//! 是按写入顺序排列的改动序列, 它既是撤销的单位, 也用于通知外部 "哪些体素被改过".

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use itertools::Itertools;

use crate::Volume;

mod history;

pub use history::UndoHistory;

/// 单个体素的一次写入.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VoxelChange<T> {
    /// 线性索引, 见 [`IndexLayout`](crate::IndexLayout).
    pub index: usize,

    /// **本次写入之前** 观察到的值.
    pub previous: T,

    /// 写入的新值.
    pub new: T,
}

impl<T> VoxelChange<T> {
    /// 构建一条改动记录.
    #[inline]
    pub const fn new(index: usize, previous: T, new: T) -> Self {
        Self {
            index,
            previous,
            new,
        }
    }
}

/// 有序的体素改动序列.
///
/// 这是一个序列而不是映射: 同一个索引可以出现多次, 且不去重.
/// 需要某个索引 "当前值" 的读者应当取该索引最后一条记录的 `new`.
/// 每条记录的 `previous` 都是其写入时刻的值, 因此按逆序回放 `previous` 总能完整撤销.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelDiff<T> {
    changes: Vec<VoxelChange<T>>,
}

impl<T> Default for VoxelDiff<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> VoxelDiff<T> {
    /// 创建空 diff.
    #[inline]
    pub const fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    /// 以给定容量创建空 diff.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            changes: Vec::with_capacity(capacity),
        }
    }

    /// 按顺序追加一条改动. 不去重.
    #[inline]
    pub fn append(&mut self, change: VoxelChange<T>) {
        self.changes.push(change);
    }

    /// 将 `other` 的全部改动按顺序追加到自身之后. 复杂度 `O(|other|)`.
    #[inline]
    pub fn merge(&mut self, other: VoxelDiff<T>) {
        self.changes.extend(other.changes);
    }

    /// 改动条数. 可能大于实际涉及的不同体素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.changes.len()
    }

    /// 同 [`Self::count`].
    #[inline]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// 是否没有任何改动.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// 第 `i` 条改动.
    ///
    /// `i >= self.count()` 时 panic.
    #[inline]
    pub fn at(&self, i: usize) -> &VoxelChange<T> {
        &self.changes[i]
    }

    /// 第 `i` 条改动. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<&VoxelChange<T>> {
        self.changes.get(i)
    }

    /// 清空全部改动.
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
    }

    /// 按记录顺序迭代.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, VoxelChange<T>> {
        self.changes.iter()
    }

    /// 按首次出现的顺序收集涉及到的不同线性索引.
    pub fn distinct_indices(&self) -> Vec<usize> {
        self.changes.iter().map(|c| c.index).unique().collect()
    }
}

impl<T: Copy + PartialEq> VoxelDiff<T> {
    /// 将每条改动的 `new` 按顺序写入 `volume` (重做).
    ///
    /// 存在越界索引时 panic.
    pub fn apply(&self, volume: &mut Volume<T>) {
        for c in self.changes.iter() {
            volume.set(c.index, c.new);
        }
    }

    /// 将每条改动的 `previous` 按逆序写入 `volume` (撤销).
    ///
    /// 存在越界索引时 panic.
    pub fn revert(&self, volume: &mut Volume<T>) {
        for c in self.changes.iter().rev() {
            volume.set(c.index, c.previous);
        }
    }

    /// 压缩: 每个索引只保留一条记录, 其 `previous` 取 **第一条** 记录的值,
    /// `new` 取最后一条记录的值. 最终 `previous == new` 的索引会被丢弃.
    ///
    /// 结果按各索引首次出现的顺序排列. 对同一体数据而言, 压缩前后的撤销/重做效果一致.
    pub fn squashed(&self) -> Self {
        let mut slot: HashMap<usize, usize> = HashMap::with_capacity(self.changes.len());
        let mut changes: Vec<VoxelChange<T>> = Vec::with_capacity(self.changes.len());
        for c in self.changes.iter() {
            match slot.entry(c.index) {
                Entry::Occupied(e) => changes[*e.get()].new = c.new,
                Entry::Vacant(e) => {
                    e.insert(changes.len());
                    changes.push(*c);
                }
            }
        }
        changes.retain(|c| c.previous != c.new);
        Self { changes }
    }
}

impl<T> Extend<VoxelChange<T>> for VoxelDiff<T> {
    #[inline]
    fn extend<I: IntoIterator<Item = VoxelChange<T>>>(&mut self, iter: I) {
        self.changes.extend(iter);
    }
}

impl<T> FromIterator<VoxelChange<T>> for VoxelDiff<T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = VoxelChange<T>>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for VoxelDiff<T> {
    type Item = VoxelChange<T>;
    type IntoIter = std::vec::IntoIter<VoxelChange<T>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a VoxelDiff<T> {
    type Item = &'a VoxelChange<T>;
    type IntoIter = std::slice::Iter<'a, VoxelChange<T>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

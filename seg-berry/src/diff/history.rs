use std::collections::VecDeque;

use super::VoxelDiff;
use crate::Volume;

/// 以 [`VoxelDiff`] 为单位的撤销/重做栈.
///
/// 每次提交都是一个原子单元: 撤销时整体回滚, 重做时整体重放.
#[derive(Clone, Debug)]
pub struct UndoHistory<T> {
    undo: VecDeque<VoxelDiff<T>>,
    redo: Vec<VoxelDiff<T>>,
    capacity: Option<usize>,
}

impl<T> Default for UndoHistory<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> UndoHistory<T> {
    /// 创建不限长度的撤销栈.
    #[inline]
    pub fn new() -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: None,
        }
    }

    /// 创建最多保留 `capacity` 个可撤销单元的撤销栈. 超出时丢弃最旧的单元.
    ///
    /// `capacity == 0` 时 panic.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0);
        Self {
            undo: VecDeque::with_capacity(capacity),
            redo: Vec::new(),
            capacity: Some(capacity),
        }
    }

    /// 压入一个已经作用到体数据上的 diff. 空 diff 会被忽略.
    ///
    /// 压入新单元后, 重做栈被清空.
    pub fn push(&mut self, diff: VoxelDiff<T>) {
        if diff.is_empty() {
            return;
        }
        self.redo.clear();
        if self.capacity.is_some_and(|c| self.undo.len() == c) {
            self.undo.pop_front();
        }
        self.undo.push_back(diff);
    }

    /// 是否有可撤销的单元.
    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// 是否有可重做的单元.
    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// 可撤销单元个数.
    #[inline]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// 清空撤销栈与重做栈.
    #[inline]
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl<T: Copy + PartialEq> UndoHistory<T> {
    /// 撤销最近一个单元. 返回是否真的发生了撤销.
    pub fn undo(&mut self, volume: &mut Volume<T>) -> bool {
        let Some(diff) = self.undo.pop_back() else {
            return false;
        };
        diff.revert(volume);
        self.redo.push(diff);
        true
    }

    /// 重做最近一次被撤销的单元. 返回是否真的发生了重做.
    pub fn redo(&mut self, volume: &mut Volume<T>) -> bool {
        let Some(diff) = self.redo.pop() else {
            return false;
        };
        diff.apply(volume);
        self.undo.push_back(diff);
        true
    }
}

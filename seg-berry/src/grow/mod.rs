//! 三维种子区域生长.
//!
//! 从一组种子体素出发, 沿 6-邻域广度优先地向外扩张标签. 候选体素需要同时满足:
//!
//! 1. 在体数据范围内;
//! 2. 到其源头种子的欧氏距离 (世界坐标) 不超过半径;
//! 3. 本次调用中尚未被接纳;
//! 4. 源值 (强度) 满足准入判据;
//! 5. 写入不违反覆盖策略 (以及 ROI).
//!
//! 源值从源图像读取, 标签写入另一个体数据, 因此判据看到的永远是调用开始前的强度,
//! 而不是填充值.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::data::{Sample, Voxel};
use crate::{Idx3d, Volume, VoxelChange, VoxelDiff};

mod band;
mod config;

use band::Branch;
pub use band::{Band, GrowthMode};
pub use config::GrowthConfig;

/// 以世界坐标计算两个体素之间欧氏距离的平方.
#[inline]
fn distance_squared((a, b, c): Idx3d, (x, y, z): Idx3d, spacing: [f64; 3]) -> f64 {
    let dx = a.abs_diff(x) as f64 * spacing[0];
    let dy = b.abs_diff(y) as f64 * spacing[1];
    let dz = c.abs_diff(z) as f64 * spacing[2];
    dx * dx + dy * dy + dz * dz
}

/// 一次生长的完整结果.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowthOutcome<M, S> {
    /// 对标签体数据的全部改动.
    pub diff: VoxelDiff<M>,

    /// 每个被接纳体素 (包括种子) 的源值, 按接纳顺序排列.
    ///
    /// 被接纳但因为已经等于填充值而没有改动的体素也在其中, 因此长度可能大于 `diff`.
    pub samples: Vec<S>,
}

/// 区域生长器. 读源图像, 写标签体数据.
///
/// 生长器本身无状态, 每次调用互不影响.
pub struct RegionGrower<'a, S, M> {
    source: &'a Volume<S>,
    mask: &'a mut Volume<M>,
    roi: Option<&'a Volume<M>>,
}

impl<'a, S: Sample, M: Voxel> RegionGrower<'a, S, M> {
    /// 以 `source` 为强度来源, 在 `mask` 上生长.
    ///
    /// 两者形状不一致时 panic.
    #[inline]
    pub fn new(source: &'a Volume<S>, mask: &'a mut Volume<M>) -> Self {
        Self::with_roi(source, mask, None)
    }

    /// 与 [`Self::new`] 相同, 但只写入 `roi` 中非 0 的位置.
    ///
    /// 三者形状不一致时 panic.
    pub fn with_roi(
        source: &'a Volume<S>,
        mask: &'a mut Volume<M>,
        roi: Option<&'a Volume<M>>,
    ) -> Self {
        assert!(mask.same_shape(source), "源图像与标签形状不一致");
        if let Some(r) = roi {
            assert!(mask.same_shape(r), "ROI 与标签形状不一致");
        }
        Self { source, mask, roi }
    }

    /// 从 `seeds` 出发生长, 返回对标签体数据的改动.
    ///
    /// 种子为空或半径无意义时什么也不做, 返回空 diff.
    ///
    /// # 注意
    ///
    /// 种子坐标越界时 panic. 调用者应当事先裁剪.
    #[inline]
    pub fn propagate(&mut self, seeds: &[Idx3d], config: &GrowthConfig) -> VoxelDiff<M> {
        self.propagate_sampled(seeds, config).diff
    }

    /// 与 [`Self::propagate`] 相同, 但同时返回每个被接纳体素的源值.
    pub fn propagate_sampled(
        &mut self,
        seeds: &[Idx3d],
        config: &GrowthConfig,
    ) -> GrowthOutcome<M, S> {
        let mut outcome = GrowthOutcome {
            diff: VoxelDiff::new(),
            samples: vec![],
        };
        if seeds.is_empty() || config.is_degenerate() {
            debug!("跳过生长: {} 个种子, 半径 {}", seeds.len(), config.radius);
            return outcome;
        }

        let layout = self.mask.layout();
        let spacing = self.mask.spacing();
        let value = M::from_f64_clamped(config.value);
        let r2 = config.radius * config.radius;

        let mut visited = HashSet::<usize>::with_capacity(seeds.len() * 8);
        let mut queue = VecDeque::<(Idx3d, Branch)>::with_capacity(seeds.len() * 4);

        // 去重后的种子. 重复的种子只处理一次.
        let seeds: Vec<Idx3d> = seeds
            .iter()
            .copied()
            .inspect(|p| assert!(layout.check(p), "种子 {p:?} 越界"))
            .filter(|p| visited.insert(layout.index_of(p)))
            .collect();

        let shared = if config.mode.is_per_seed() {
            None
        } else {
            Band::from_stats(
                seeds.iter().map(|p| self.source[*p].widen()),
                config.stddev_factor,
            )
        };

        // 种子总是被接纳 (写入仍受覆盖策略约束), 且先于其任何后代写入.
        for &seed in seeds.iter() {
            let s = self.source[seed];
            let band = shared.unwrap_or_else(|| Band::seeded(config.mode, s.widen()));
            if self.writable(seed, value, config.overwrite) {
                self.paint(seed, value, &mut outcome.diff);
            }
            outcome.samples.push(s);
            queue.push_back((seed, Branch { origin: seed, band }));
        }

        while let Some((pos, branch)) = queue.pop_front() {
            for neigh in layout.face_neighbours(pos) {
                let index = layout.index_of(&neigh);
                if visited.contains(&index) {
                    continue;
                }
                if distance_squared(branch.origin, neigh, spacing) > r2 {
                    continue;
                }
                let s = self.source[neigh];
                if !branch.band.contains(s.widen())
                    || !self.writable(neigh, value, config.overwrite)
                {
                    continue;
                }
                visited.insert(index);
                self.paint(neigh, value, &mut outcome.diff);
                outcome.samples.push(s);
                queue.push_back((neigh, branch));
            }
        }

        debug!(
            "{:?} 生长: {} 个种子, 接纳 {} 个体素, 改动 {} 个体素",
            config.mode,
            seeds.len(),
            outcome.samples.len(),
            outcome.diff.count()
        );
        outcome
    }

    /// 写入 `value` 是否被允许: 在 ROI 内, 且 (允许覆盖, 或当前为背景, 或当前已等于 `value`).
    #[inline]
    fn writable(&self, pos: Idx3d, value: M, overwrite: bool) -> bool {
        if self.roi.is_some_and(|r| r[pos].is_background()) {
            return false;
        }
        let cur = self.mask[pos];
        overwrite || cur.is_background() || cur == value
    }

    /// 写入并记录. 当前值已等于 `value` 时为空操作.
    #[inline]
    fn paint(&mut self, pos: Idx3d, value: M, diff: &mut VoxelDiff<M>) {
        let cur = self.mask[pos];
        if cur == value {
            return;
        }
        self.mask[pos] = value;
        diff.append(VoxelChange::new(self.mask.layout().index_of(&pos), cur, value));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{GrowthConfig, GrowthMode, RegionGrower};
    use crate::{Idx3d, Volume};

    const ISO: [f64; 3] = [1.0, 1.0, 1.0];
    const ZERO: [f64; 3] = [0.0, 0.0, 0.0];

    fn config(mode: GrowthMode) -> GrowthConfig {
        GrowthConfig::new(1.0, f64::INFINITY, true, mode)
    }

    fn line(values: &[i16]) -> Volume<i16> {
        Volume::from_shape_vec([values.len(), 1, 1], values.to_vec(), ISO, ZERO).unwrap()
    }

    fn labeled_x(mask: &Volume<u8>) -> Vec<usize> {
        (0..mask.size()[0]).filter(|&x| mask[(x, 0, 0)] != 0).collect()
    }

    fn histogram(samples: &[i16]) -> HashMap<i16, usize> {
        let mut ans = HashMap::new();
        for s in samples {
            *ans.entry(*s).or_insert(0) += 1;
        }
        ans
    }

    #[test]
    fn test_no_seed_is_noop() {
        let _ = simple_logger::SimpleLogger::new().init();
        let source = line(&[1, 1, 1, 1]);
        let mut mask = Volume::<u8>::new([4, 1, 1], ISO, ZERO).unwrap();
        for mode in [GrowthMode::Min, GrowthMode::Max, GrowthMode::MinMax, GrowthMode::StdDev] {
            let diff = RegionGrower::new(&source, &mut mask).propagate(&[], &config(mode));
            assert_eq!(diff.count(), 0);
        }
        assert_eq!(mask.count(0), 4);
    }

    #[test]
    fn test_negative_radius_is_noop() {
        let source = line(&[1, 1, 1, 1]);
        let mut mask = Volume::<u8>::new([4, 1, 1], ISO, ZERO).unwrap();
        let mut c = config(GrowthMode::MinMax);
        c.radius = -1.0;
        assert!(RegionGrower::new(&source, &mut mask)
            .propagate(&[(0, 0, 0)], &c)
            .is_empty());
        c.radius = f64::NAN;
        assert!(RegionGrower::new(&source, &mut mask)
            .propagate(&[(0, 0, 0)], &c)
            .is_empty());
        assert_eq!(mask.count(0), 4);
    }

    /// 10x20x90 体数据中有两个互不相邻的均匀长方体, 各放一个种子.
    #[test]
    fn test_minmax_two_blocks() {
        let mut source = Volume::<i16>::new([10, 20, 90], ISO, ZERO).unwrap();
        source.fill_box((2, 5, 10), (5, 15, 40), 2554);
        source.fill_box((6, 5, 60), (9, 15, 70), 456);
        let mut mask = Volume::<i16>::new([10, 20, 90], ISO, ZERO).unwrap();

        let seeds = [(3, 10, 25), (7, 10, 65)];
        let outcome = RegionGrower::new(&source, &mut mask)
            .propagate_sampled(&seeds, &config(GrowthMode::MinMax));

        assert_eq!(outcome.diff.count(), 1200);
        assert_eq!(mask.count(1), 1200);
        let h = histogram(&outcome.samples);
        assert_eq!(h.len(), 2);
        assert_eq!(h[&2554], 900);
        assert_eq!(h[&456], 300);

        // 标签恰好等于两个长方体的并集.
        for z in 0..90 {
            for y in 0..20 {
                for x in 0..10 {
                    let inside = source[(x, y, z)] != 0;
                    assert_eq!(mask[(x, y, z)] == 1, inside, "({x}, {y}, {z})");
                }
            }
        }
    }

    /// 均匀区域内单个种子, 受半径约束: 恰好得到半径内的格点球.
    #[test]
    fn test_minmax_radius_ball() {
        let spacing = [1.0, 2.0, 0.5];
        let data = vec![9; 15 * 15 * 15];
        let source = Volume::<u8>::from_shape_vec([15, 15, 15], data, spacing, ZERO).unwrap();
        let mut mask = Volume::<u8>::new([15, 15, 15], spacing, ZERO).unwrap();
        let center: Idx3d = (7, 7, 7);
        let mut c = config(GrowthMode::MinMax);
        c.radius = 3.0;
        let diff = RegionGrower::new(&source, &mut mask).propagate(&[center], &c);

        let mut expected = 0;
        for z in 0..15usize {
            for y in 0..15usize {
                for x in 0..15usize {
                    let d = |v: usize, s: f64| (v as f64 - 7.0) * s;
                    let r2 = d(x, spacing[0]).powi(2) + d(y, spacing[1]).powi(2)
                        + d(z, spacing[2]).powi(2);
                    let inside = r2 <= 9.0;
                    expected += inside as usize;
                    assert_eq!(mask[(x, y, z)] == 1, inside, "({x}, {y}, {z})");
                }
            }
        }
        assert_eq!(diff.count(), expected);
    }

    /// 均匀区域之外 (哪怕值只差 1) 不会被吸收.
    #[test]
    fn test_minmax_saturates_component_only() {
        let mut source = Volume::<i16>::new([8, 8, 8], ISO, ZERO).unwrap();
        source.fill_box((0, 0, 0), (4, 8, 8), 100);
        source.fill_box((4, 0, 0), (8, 8, 8), 101);
        // 同值但不连通的一块.
        source.fill_box((6, 6, 6), (8, 8, 8), 100);
        let mut mask = Volume::<u8>::new([8, 8, 8], ISO, ZERO).unwrap();
        RegionGrower::new(&source, &mut mask).propagate(&[(1, 1, 1)], &config(GrowthMode::MinMax));
        assert_eq!(mask.count(1), 4 * 8 * 8);
        assert_eq!(mask[(7, 7, 7)], 0);
    }

    #[test]
    fn test_min_mode() {
        let source = line(&[5, 6, 7, 3, 8, 9]);
        let mut mask = Volume::<u8>::new([6, 1, 1], ISO, ZERO).unwrap();
        RegionGrower::new(&source, &mut mask).propagate(&[(0, 0, 0)], &config(GrowthMode::Min));
        assert_eq!(labeled_x(&mask), vec![0, 1, 2]);
    }

    #[test]
    fn test_max_mode() {
        let source = line(&[5, 6, 7, 3, 8, 2]);
        let mut mask = Volume::<u8>::new([6, 1, 1], ISO, ZERO).unwrap();
        RegionGrower::new(&source, &mut mask).propagate(&[(2, 0, 0)], &config(GrowthMode::Max));
        assert_eq!(labeled_x(&mask), vec![0, 1, 2, 3]);
    }

    /// 阈值固定为种子的源值: 单调下降的区域不会被 `Min` 吸收, 单调上升的不会被 `Max` 吸收.
    #[test]
    fn test_threshold_stays_at_seed() {
        let source = line(&[9, 8, 7, 9, 10]);
        let mut mask = Volume::<u8>::new([5, 1, 1], ISO, ZERO).unwrap();
        let outcome = RegionGrower::new(&source, &mut mask)
            .propagate_sampled(&[(3, 0, 0)], &config(GrowthMode::Min));
        assert_eq!(labeled_x(&mask), vec![3, 4]);
        assert_eq!(outcome.samples, vec![9, 10]);

        let source = line(&[1, 2, 3, 1, 0]);
        let mut mask = Volume::<u8>::new([5, 1, 1], ISO, ZERO).unwrap();
        RegionGrower::new(&source, &mut mask).propagate(&[(3, 0, 0)], &config(GrowthMode::Max));
        assert_eq!(labeled_x(&mask), vec![3, 4]);
    }

    /// 每个种子维护自己的界, 互不影响.
    #[test]
    fn test_bounds_are_per_seed() {
        let source = line(&[5, 6, 7, 3, 8, 9, 1, 4, 4, 2]);
        let mut mask = Volume::<u8>::new([10, 1, 1], ISO, ZERO).unwrap();
        RegionGrower::new(&source, &mut mask)
            .propagate(&[(0, 0, 0), (9, 0, 0)], &config(GrowthMode::Min));
        assert_eq!(labeled_x(&mask), vec![0, 1, 2, 7, 8, 9]);
    }

    /// 两个相近的种子与一个离群种子: 相近的两个各自占满自己的区域, 离群的只标注自身.
    #[test]
    fn test_stddev_excludes_outlier() {
        let mut source = Volume::<i16>::new([30, 10, 10], ISO, ZERO).unwrap();
        source.fill_box((0, 0, 0), (5, 10, 10), 100);
        source.fill_box((10, 0, 0), (15, 10, 10), 104);
        source.fill_box((20, 0, 0), (25, 10, 10), 400);
        let mut mask = Volume::<u8>::new([30, 10, 10], ISO, ZERO).unwrap();

        let seeds = [(2, 5, 5), (12, 5, 5), (22, 5, 5)];
        let outcome = RegionGrower::new(&source, &mut mask)
            .propagate_sampled(&seeds, &config(GrowthMode::StdDev));

        assert_eq!(mask.count(1), 500 + 500 + 1);
        assert_eq!(mask[(22, 5, 5)], 1);
        assert_eq!(mask[(23, 5, 5)], 0);
        let h = histogram(&outcome.samples);
        assert_eq!(h[&100], 500);
        assert_eq!(h[&104], 500);
        assert_eq!(h[&400], 1);
        assert!(!h.contains_key(&0));
    }

    /// 不论模式与邻域如何, 种子自身总会被标注.
    #[test]
    fn test_seed_always_labeled() {
        let data: Vec<i16> = (0..125).map(|i| (i * 37 % 11) as i16 * 100).collect();
        let source = Volume::from_shape_vec([5, 5, 5], data, ISO, ZERO).unwrap();
        let seeds = [(0, 0, 0), (2, 2, 2), (4, 1, 3)];
        for mode in [GrowthMode::Min, GrowthMode::Max, GrowthMode::MinMax, GrowthMode::StdDev] {
            let mut mask = Volume::<i16>::new([5, 5, 5], ISO, ZERO).unwrap();
            let mut c = config(mode);
            c.value = 7.0;
            RegionGrower::new(&source, &mut mask).propagate(&seeds, &c);
            for s in seeds {
                assert_eq!(mask[s], 7, "{mode:?} {s:?}");
            }
        }
    }

    #[test]
    fn test_overwrite_policy() {
        let source = Volume::<i16>::from_shape_vec([6, 1, 1], vec![4; 6], ISO, ZERO).unwrap();
        let mut mask = Volume::<u8>::new([6, 1, 1], ISO, ZERO).unwrap();
        mask[(3, 0, 0)] = 9;
        mask[(1, 0, 0)] = 2;

        let mut c = config(GrowthMode::MinMax);
        c.value = 2.0;
        c.overwrite = false;
        let diff = RegionGrower::new(&source, &mut mask).propagate(&[(0, 0, 0)], &c);
        // 已是 2 的体素被接纳但不记录; 值为 9 的体素挡住了生长.
        assert_eq!(diff.count(), 2);
        assert_eq!(labeled_x(&mask), vec![0, 1, 2, 3]);
        assert_eq!(mask[(3, 0, 0)], 9);
        assert!(diff.iter().all(|c| c.index != 1 && c.index != 3));

        // 再跑一次, 什么都不会改.
        assert!(RegionGrower::new(&source, &mut mask)
            .propagate(&[(0, 0, 0)], &c)
            .is_empty());

        c.overwrite = true;
        let diff = RegionGrower::new(&source, &mut mask).propagate(&[(0, 0, 0)], &c);
        assert_eq!(diff.count(), 3);
        assert_eq!(diff.iter().find(|c| c.index == 3).unwrap().previous, 9);
        assert_eq!(mask.count(2), 6);
    }

    #[test]
    fn test_seed_written_before_descendants_and_revertible() {
        let source = Volume::<i16>::from_shape_vec([5, 5, 1], vec![3; 25], ISO, ZERO).unwrap();
        let original = Volume::<u8>::new([5, 5, 1], ISO, ZERO).unwrap();
        let mut mask = original.clone();
        let seeds = [(0, 0, 0), (4, 4, 0)];
        let c = config(GrowthMode::MinMax);
        let diff = RegionGrower::new(&source, &mut mask).propagate(&seeds, &c);

        assert_eq!(diff.count(), 25);
        assert_eq!(diff.at(0).index, 0);
        assert_eq!(diff.at(1).index, 24);
        assert_eq!(diff.distinct_indices().len(), 25);

        diff.revert(&mut mask);
        assert_eq!(mask, original);
    }

    #[test]
    fn test_roi_limits_growth() {
        let source = Volume::<i16>::from_shape_vec([6, 6, 1], vec![3; 36], ISO, ZERO).unwrap();
        let mut roi = Volume::<u8>::new([6, 6, 1], ISO, ZERO).unwrap();
        roi.fill_box((0, 0, 0), (3, 6, 1), 1);
        let mut mask = Volume::<u8>::new([6, 6, 1], ISO, ZERO).unwrap();
        RegionGrower::with_roi(&source, &mut mask, Some(&roi))
            .propagate(&[(1, 1, 0)], &config(GrowthMode::MinMax));
        assert_eq!(mask.count(1), 18);
        assert_eq!(mask[(3, 1, 0)], 0);
    }

    #[test]
    fn test_float_source_and_clamped_value() {
        let source =
            Volume::<f32>::from_shape_vec([4, 1, 1], vec![-80.5, -80.5, 60.0, -80.5], ISO, ZERO)
                .unwrap();
        let mut mask = Volume::<u8>::new([4, 1, 1], ISO, ZERO).unwrap();
        let mut c = config(GrowthMode::MinMax);
        c.value = 1000.0;
        let outcome = RegionGrower::new(&source, &mut mask).propagate_sampled(&[(0, 0, 0)], &c);
        assert_eq!(outcome.samples, vec![-80.5, -80.5]);
        assert_eq!(mask[(0, 0, 0)], u8::MAX);
        assert_eq!(mask[(1, 0, 0)], u8::MAX);
        assert_eq!(mask[(3, 0, 0)], 0);
    }

    #[test]
    #[should_panic]
    fn test_seed_out_of_bounds() {
        let source = line(&[1, 1]);
        let mut mask = Volume::<u8>::new([2, 1, 1], ISO, ZERO).unwrap();
        RegionGrower::new(&source, &mut mask).propagate(&[(2, 0, 0)], &config(GrowthMode::Min));
    }

    #[test]
    #[should_panic]
    fn test_shape_mismatch() {
        let source = line(&[1, 1]);
        let mut mask = Volume::<u8>::new([3, 1, 1], ISO, ZERO).unwrap();
        RegionGrower::new(&source, &mut mask);
    }
}

/// 带符号二维整数坐标.
pub type Idx2dI64 = (i64, i64);

/// 二维 Bresenham 直线迭代器. 依次给出从 `from` 到 `to` (两端都包含) 的像素坐标.
///
/// 相邻两个像素 8-连通. `from == to` 时只给出一个像素.
///
/// 误差项以 `i128` 计算, 任意 `i64` 端点都不会溢出. 但路径长度等于两端点坐标差的最大值,
/// 调用者应当事先把线段裁剪到需要的范围内.
#[derive(Debug, Clone)]
pub struct Bresenham {
    cur: Idx2dI64,
    end: Idx2dI64,
    dx: i128,
    dy: i128,
    step: Idx2dI64,
    err: i128,
    done: bool,
}

impl Bresenham {
    /// 创建迭代器.
    pub fn new(from: Idx2dI64, to: Idx2dI64) -> Self {
        let dx = (to.0 as i128 - from.0 as i128).abs();
        let dy = -(to.1 as i128 - from.1 as i128).abs();
        let sign = |a: i64, b: i64| if a < b { 1 } else { -1 };
        Self {
            cur: from,
            end: to,
            dx,
            dy,
            step: (sign(from.0, to.0), sign(from.1, to.1)),
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for Bresenham {
    type Item = Idx2dI64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let ret = self.cur;
        if self.cur == self.end {
            self.done = true;
        } else {
            let e2 = 2 * self.err;
            if e2 >= self.dy {
                self.err += self.dy;
                self.cur.0 += self.step.0;
            }
            if e2 <= self.dx {
                self.err += self.dx;
                self.cur.1 += self.step.1;
            }
        }
        Some(ret)
    }
}

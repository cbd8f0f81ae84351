//! # 常用接口模块
//!
//! 本模块提供一些各模块共用的小工具

use ndarray::ArrayView1;



/// 返回最大值所在位置；若有并列，取索引最小者。空向量返回`None`。
/// NaN 永远不会被选中（除非所有元素都是 NaN，此时返回 0）。
pub fn argmax(values: ArrayView1<'_, f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            None => best = Some((i, v)),
            Some((_, b)) if v > b || (b.is_nan() && !v.is_nan()) => best = Some((i, v)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}

/// 判断一行是否全零（即填充行）
pub fn is_zero_row(row: ArrayView1<'_, f32>) -> bool {
    row.iter().all(|&v| v == 0.0)
}

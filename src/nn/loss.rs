/*
 * @Date         : 2026-10-18
 * @Description  : Softmax + 带掩码的交叉熵损失
 *
 * 数值稳定计算：
 * ```text
 * softmax(x)_i = exp(x_i - max(x)) / Σ exp(x_j - max(x))
 * L = -Σ y_i * (x_i - max(x) - log(Σ exp(x_j - max(x))))
 * ```
 * 目标行全零（填充位置）的时间步不计入损失，也不计入求平均时的分母。
 */

use ndarray::{Array1, Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};

use super::rnn::{BatchTrace, CharRnn};
use crate::data::PaddedBatch;
use crate::errors::{Result, RnnError};
use crate::utils::is_zero_row;

/// 损失的归约方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// 对所有有效时间步求平均
    #[default]
    Mean,
    /// 对所有有效时间步求和
    Sum,
}

/// 逐行计算数值稳定的 softmax
/// 输入/输出: [batch, num_classes]
pub fn stable_softmax_batch(logits: &Array2<f32>) -> Array2<f32> {
    let mut result = logits.clone();
    for mut row in result.rows_mut() {
        let max_val = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max_val).exp());
        let sum_exp = row.sum();
        row /= sum_exp;
    }
    result
}

/// 各行的有效性掩码：非全零的目标行为 1，填充行为 0
pub fn row_mask(targets: ArrayView2<'_, f32>) -> Array1<f32> {
    targets
        .rows()
        .into_iter()
        .map(|r| if is_zero_row(r) { 0.0 } else { 1.0 })
        .collect()
}

/// 逐行交叉熵（未乘掩码）：L_n = -Σ_c y_nc * log_softmax(x_n)_c
pub fn cross_entropy_rows(logits: ArrayView2<'_, f32>, labels: ArrayView2<'_, f32>) -> Array1<f32> {
    let mut losses = Array1::zeros(logits.nrows());
    Zip::from(&mut losses)
        .and(logits.rows())
        .and(labels.rows())
        .for_each(|loss, x, y| {
            let max_val = x.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
            let log_sum_exp = x.mapv(|v| (v - max_val).exp()).sum().ln();
            let dot_product = x.dot(&y);
            let label_mass = y.sum();
            *loss = -dot_product + label_mass * (max_val + log_sum_exp);
        });
    losses
}

/// 已完成前向传播的整批损失：返回（有效时间步上的损失总和, 有效时间步数）
pub(crate) fn masked_loss_sum(trace: &BatchTrace, batch: &PaddedBatch) -> (f32, usize) {
    let mut total = 0.0f32;
    let mut count = 0usize;
    for t in 0..trace.seq_len() {
        let targets = batch.target_at(t);
        let mask = row_mask(targets);
        let losses = cross_entropy_rows(trace.logits_at(t), targets);
        total += (&losses * &mask).sum();
        count += mask.iter().filter(|&&m| m > 0.0).count();
    }
    (total, count)
}

/// 计算模型在整批数据上的带掩码交叉熵，不修改任何参数
///
/// 没有任何有效时间步时返回 0
pub fn masked_cross_entropy(
    model: &CharRnn,
    batch: &PaddedBatch,
    reduction: Reduction,
) -> Result<f32> {
    if batch.is_empty() {
        return Err(RnnError::EmptyBatch);
    }
    let trace = model.forward_batch(batch.inputs().view())?;
    let (total, count) = masked_loss_sum(&trace, batch);
    Ok(match reduction {
        Reduction::Sum => total,
        Reduction::Mean if count == 0 => 0.0,
        Reduction::Mean => total / count as f32,
    })
}

/*
 * @Date         : 2026-10-18
 * @Description  : 训练器：带掩码交叉熵 + 通过时间反向传播（BPTT）+ 优化器更新
 *
 * 对于序列 [t=0, t=1, ..., t=T-1]，从最后一步向前反向传播，
 * 各时间步对参数的梯度贡献累加到同一组梯度上：
 * ```text
 * dz_t = (o_t - y_t) * mask_t / 有效步数
 * dh_t = dz_t @ W_ho^T + da_{t+1} @ W_hh^T
 * da_t = dh_t * (1 - h_t²)
 * ```
 * 填充位置的 dz_t 恒为 0，且填充只出现在序列末尾，因此它们对梯度没有任何贡献。
 */

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use super::loss::{Reduction, masked_cross_entropy, masked_loss_sum, row_mask};
use super::optimizer::{AnyOptimizer, Optimizer, OptimizerConfig};
use super::rnn::{CharRnn, RnnParameters};
use crate::data::{BatchLoader, PaddedBatch};
use crate::errors::{Result, RnnError};

/// 训练配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// 遍历整批数据的轮数`E`
    pub epochs: usize,
    pub optimizer: OptimizerConfig,
    /// mini-batch 大小；为`None`时每轮只做一次整批更新
    pub batch_size: Option<usize>,
    /// 梯度全局范数裁剪阈值
    pub clip_norm: Option<f32>,
    /// mini-batch 打乱顺序所用的种子
    pub seed: u64,
    /// 每隔多少轮输出一次日志（0 表示只在最后一轮输出）
    pub log_every: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            optimizer: OptimizerConfig::default(),
            batch_size: None,
            clip_norm: Some(5.0),
            seed: 42,
            log_every: 10,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        self.optimizer.validate()?;
        if self.batch_size == Some(0) {
            return Err(RnnError::InvalidConfig("batch_size 须大于0".to_string()));
        }
        if let Some(clip) = self.clip_norm {
            if !(clip.is_finite() && clip > 0.0) {
                return Err(RnnError::InvalidConfig(format!(
                    "clip_norm 须为正数，实际为{clip}"
                )));
            }
        }
        Ok(())
    }
}

/// 一次`fit`的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainReport {
    /// 每轮在全部有效时间步上的平均损失
    pub epoch_losses: Vec<f32>,
}

impl TrainReport {
    pub fn final_loss(&self) -> Option<f32> {
        self.epoch_losses.last().copied()
    }
}

/// 计算整批的平均损失及五个参数的梯度（不修改模型）
pub fn loss_and_gradients(model: &CharRnn, batch: &PaddedBatch) -> Result<(f32, RnnParameters)> {
    check_batch(model, batch)?;
    let trace = model.forward_batch(batch.inputs().view())?;
    let (loss_sum, valid) = masked_loss_sum(&trace, batch);

    let params = model.parameters();
    let mut grads = params.zeros_like();
    if valid == 0 {
        return Ok((0.0, grads));
    }
    let scale = 1.0 / valid as f32;

    let mut dh_next = Array2::<f32>::zeros((batch.len(), model.hidden_size()));
    for t in (0..trace.seq_len()).rev() {
        let targets = batch.target_at(t);
        let mask = row_mask(targets).insert_axis(Axis(1));

        // 输出层：∂L/∂logits = softmax - labels（仅有效行）
        let dz = (&trace.probs_at(t) - &targets) * &mask * scale;
        let h = trace.hidden_at(t);
        grads.w_ho += &h.t().dot(&dz);
        grads.b_o += &dz.sum_axis(Axis(0));

        // 隐藏层：来自输出和来自下一时间步的梯度之和，再穿过 tanh
        let dh = dz.dot(&params.w_ho.t()) + &dh_next;
        let da = dh * &h.mapv(|v| 1.0 - v * v);
        grads.w_ih += &batch.input_at(t).t().dot(&da);
        grads.w_hh += &trace.hidden_before(t).t().dot(&da);
        grads.b_h += &da.sum_axis(Axis(0));

        dh_next = da.dot(&params.w_hh.t());
    }

    Ok((loss_sum * scale, grads))
}

fn check_batch(model: &CharRnn, batch: &PaddedBatch) -> Result<()> {
    if batch.is_empty() {
        return Err(RnnError::EmptyBatch);
    }
    if batch.vocab_size() != model.vocab_size() {
        return Err(RnnError::shape_mismatch(
            &[batch.len(), batch.seq_len(), model.vocab_size()],
            batch.inputs().shape(),
            "批次特征宽度须等于模型的字母表大小",
        ));
    }
    if batch.inputs().shape() != batch.targets().shape() {
        return Err(RnnError::shape_mismatch(
            batch.inputs().shape(),
            batch.targets().shape(),
            "输入与目标形状须一致",
        ));
    }
    Ok(())
}

/// 训练器
#[derive(Debug)]
pub struct Trainer {
    config: TrainConfig,
    optimizer: AnyOptimizer,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        let optimizer = config.optimizer.build();
        Ok(Self { config, optimizer })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn optimizer(&self) -> &AnyOptimizer {
        &self.optimizer
    }

    pub fn optimizer_mut(&mut self) -> &mut AnyOptimizer {
        &mut self.optimizer
    }

    /// 在整批数据上计算平均损失，不修改模型
    pub fn evaluate(&self, model: &CharRnn, batch: &PaddedBatch) -> Result<f32> {
        check_batch(model, batch)?;
        masked_cross_entropy(model, batch, Reduction::Mean)
    }

    /// 在一个（mini-）batch 上做一次前向、反向和参数更新，返回更新前的平均损失
    pub fn train_step(&mut self, model: &mut CharRnn, batch: &PaddedBatch) -> Result<f32> {
        let (loss, mut grads) = loss_and_gradients(model, batch)?;
        if let Some(max_norm) = self.config.clip_norm {
            let norm = grads.global_norm();
            if norm > max_norm {
                grads.scale(max_norm / norm);
            }
        }
        self.optimizer.step(model.parameters_mut(), &grads);
        Ok(loss)
    }

    /// 训练`epochs`轮，返回每轮的平均损失
    pub fn fit(&mut self, model: &mut CharRnn, batch: &PaddedBatch) -> Result<TrainReport> {
        check_batch(model, batch)?;
        let epochs = self.config.epochs;
        let loader = BatchLoader::new(batch, self.config.batch_size.unwrap_or(0))
            .shuffle(self.config.batch_size.is_some())
            .seed(self.config.seed);

        tracing::info!(
            samples = batch.len(),
            seq_len = batch.seq_len(),
            vocab_size = batch.vocab_size(),
            hidden_size = model.hidden_size(),
            epochs,
            batches_per_epoch = loader.num_batches(),
            learning_rate = self.optimizer.learning_rate(),
            "开始训练"
        );

        let mut report = TrainReport::default();
        for epoch in 0..epochs {
            let mut weighted_loss = 0.0f32;
            let mut steps = 0usize;
            for (i, mini) in loader.iter_epoch(epoch as u64).enumerate() {
                let loss = self.train_step(model, &mini)?;
                tracing::debug!(epoch = epoch + 1, batch = i, loss, "mini-batch");
                weighted_loss += loss * mini.valid_steps() as f32;
                steps += mini.valid_steps();
            }
            let epoch_loss = if steps == 0 {
                0.0
            } else {
                weighted_loss / steps as f32
            };
            report.epoch_losses.push(epoch_loss);

            let is_last = epoch + 1 == epochs;
            let log_every = self.config.log_every;
            if is_last || (log_every > 0 && (epoch + 1) % log_every == 0) {
                tracing::info!("Epoch {:4}/{}: loss={:.4}", epoch + 1, epochs, epoch_loss);
            }
        }
        Ok(report)
    }
}

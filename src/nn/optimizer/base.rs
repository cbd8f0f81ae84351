/*
 * @Date         : 2026-10-18
 * @Description  : 优化器基础trait
 */

use enum_dispatch::enum_dispatch;

use crate::nn::RnnParameters;

/// 优化器核心 trait
#[enum_dispatch]
pub trait Optimizer {
    /// 参数更新（使用已计算好的梯度）
    ///
    /// 训练循环：
    /// ```ignore
    /// let (loss, grads) = loss_and_gradients(&model, &batch)?;
    /// optimizer.step(model.parameters_mut(), &grads); // ← 只更新参数，不做 forward/backward
    /// ```
    fn step(&mut self, params: &mut RnnParameters, grads: &RnnParameters);

    /// 重置累积状态
    fn reset(&mut self);

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);
}

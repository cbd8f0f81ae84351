/*
 * @Date         : 2026-10-18
 * @Description  : 梯度下降优化器实现
 */

use ndarray::Zip;

use super::base::Optimizer;
use crate::nn::RnnParameters;

/// SGD (随机梯度下降) 优化器
#[derive(Debug, Clone)]
pub struct SGD {
    learning_rate: f32,
}

impl SGD {
    /// 创建新的SGD优化器
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for SGD {
    /// 梯度下降更新：θ = θ - α * ∇θ
    fn step(&mut self, params: &mut RnnParameters, grads: &RnnParameters) {
        let lr = self.learning_rate;
        for (param, grad) in params.tensors_mut().into_iter().zip(grads.tensors()) {
            Zip::from(param)
                .and(grad)
                .for_each(|p, &g| *p -= lr * g);
        }
    }

    fn reset(&mut self) {}

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}

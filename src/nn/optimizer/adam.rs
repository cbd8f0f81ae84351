/*
 * @Date         : 2026-10-18
 * @Description  : Adam优化器实现
 */

use ndarray::Zip;

use super::base::Optimizer;
use crate::nn::RnnParameters;

/// Adam优化器
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// 一阶矩估计
    m: Option<RnnParameters>,
    /// 二阶矩估计
    v: Option<RnnParameters>,
    /// 时间步
    t: i32,
}

impl Adam {
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: None,
            v: None,
            t: 0,
        }
    }

    /// 使用默认参数创建Adam优化器
    pub fn new_default(learning_rate: f32) -> Self {
        Self::new(learning_rate, 0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut RnnParameters, grads: &RnnParameters) {
        // 矩估计的形状须与梯度一致，否则（如换了模型）重新开始
        let stale = self
            .m
            .as_ref()
            .is_some_and(|m| m.vocab_size() != grads.vocab_size() || m.hidden_size() != grads.hidden_size());
        if stale {
            self.reset();
        }
        self.t += 1;

        let (beta1, beta2, eps, lr) = (self.beta1, self.beta2, self.epsilon, self.learning_rate);
        // 偏差修正
        let bias_correction1 = 1.0 - beta1.powi(self.t);
        let bias_correction2 = 1.0 - beta2.powi(self.t);

        let m = self.m.get_or_insert_with(|| grads.zeros_like());
        let v = self.v.get_or_insert_with(|| grads.zeros_like());

        let tensors = params
            .tensors_mut()
            .into_iter()
            .zip(grads.tensors())
            .zip(m.tensors_mut())
            .zip(v.tensors_mut());
        for (((param, grad), m), v) in tensors {
            Zip::from(param)
                .and(grad)
                .and(m)
                .and(v)
                .for_each(|p, &g, m, v| {
                    // m = β1 * m + (1 - β1) * g
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    // v = β2 * v + (1 - β2) * g²
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    let m_hat = *m / bias_correction1;
                    let v_hat = *v / bias_correction2;
                    *p -= lr * m_hat / (v_hat.sqrt() + eps);
                });
        }
    }

    fn reset(&mut self) {
        self.m = None;
        self.v = None;
        self.t = 0;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}

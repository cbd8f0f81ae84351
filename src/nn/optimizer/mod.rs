/*
 * @Date         : 2026-10-18
 * @Description  : 优化器模块：SGD 与 Adam，以及可序列化的优化器配置
 */

mod adam;
mod base;
mod sgd;

pub use adam::Adam;
pub use base::Optimizer;
pub use sgd::SGD;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, RnnError};
use crate::nn::RnnParameters;

/// 运行时的优化器（静态分发到具体实现）
#[enum_dispatch(Optimizer)]
#[derive(Debug, Clone)]
pub enum AnyOptimizer {
    SGD(SGD),
    Adam(Adam),
}

/// 优化器配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Sgd {
        learning_rate: f32,
    },
    Adam {
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam {
            learning_rate: 0.01,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

impl OptimizerConfig {
    pub fn learning_rate(&self) -> f32 {
        match *self {
            Self::Sgd { learning_rate } | Self::Adam { learning_rate, .. } => learning_rate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let lr = self.learning_rate();
        if !(lr.is_finite() && lr > 0.0) {
            return Err(RnnError::InvalidConfig(format!("学习率须为正数，实际为{lr}")));
        }
        if let Self::Adam { beta1, beta2, epsilon, .. } = *self {
            if !(0.0..1.0).contains(&beta1) || !(0.0..1.0).contains(&beta2) {
                return Err(RnnError::InvalidConfig(format!(
                    "Adam 的 beta 须在[0, 1)内，实际为beta1={beta1}，beta2={beta2}"
                )));
            }
            if epsilon <= 0.0 {
                return Err(RnnError::InvalidConfig(format!("epsilon 须为正数，实际为{epsilon}")));
            }
        }
        Ok(())
    }

    /// 按配置创建优化器
    pub fn build(&self) -> AnyOptimizer {
        match *self {
            Self::Sgd { learning_rate } => SGD::new(learning_rate).into(),
            Self::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => Adam::new(learning_rate, beta1, beta2, epsilon).into(),
        }
    }
}

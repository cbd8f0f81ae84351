/*
 * @Date         : 2026-10-18
 * @Description  : 参数初始化策略
 */

use ndarray::{Array1, Array2};
use rand::Rng;

/// 参数初始化方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// 全零
    Zeros,
    /// Xavier/Glorot 初始化（适用于 Sigmoid/Tanh）
    Xavier,
}

impl Init {
    /// 生成`[rows, cols]`矩阵，`rows`视为 fan_in，`cols`视为 fan_out
    pub fn matrix<R: Rng + ?Sized>(&self, rows: usize, cols: usize, rng: &mut R) -> Array2<f32> {
        let data = self.generate(rows * cols, rows, cols, rng);
        Array2::from_shape_vec((rows, cols), data).unwrap_or_else(|_| Array2::zeros((rows, cols)))
    }

    /// 生成长度为`len`的向量（fan_in = `len`，fan_out = 1）
    pub fn vector<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Array1<f32> {
        Array1::from(self.generate(len, len, 1, rng))
    }

    fn generate<R: Rng + ?Sized>(
        &self,
        n: usize,
        fan_in: usize,
        fan_out: usize,
        rng: &mut R,
    ) -> Vec<f32> {
        match *self {
            Self::Zeros => vec![0.0; n],
            Self::Xavier => {
                let std = (2.0 / (fan_in + fan_out).max(1) as f32).sqrt();
                normal(0.0, std, n, rng)
            }
        }
    }
}

/// Box-Muller 变换生成`n`个正态分布样本
fn normal<R: Rng + ?Sized>(mean: f32, std_dev: f32, n: usize, rng: &mut R) -> Vec<f32> {
    let mut data = Vec::with_capacity(n);
    while data.len() < n {
        let u1: f32 = rng.r#gen();
        let u2: f32 = rng.r#gen();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f32::consts::PI * u2;
        let z0 = mean + std_dev * r * theta.cos();
        let z1 = mean + std_dev * r * theta.sin();

        if z0.is_finite() {
            data.push(z0);
        }
        if data.len() < n && z1.is_finite() {
            data.push(z1);
        }
    }
    data
}

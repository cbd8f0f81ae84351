/*
 * @Date         : 2026-10-18
 * @Description  : 自回归生成：随机采样 / 贪心解码
 *
 * 流程：
 * 1. h 从零开始；有前缀时先把前缀逐字符送入网络，保留最后的 h 和输出分布；
 *    没有前缀时用一个全零输入走一步。
 * 2. 从当前输出分布中选出下一个字符（按概率采样或取最大值），追加到结果中，
 *    并把它的 one-hot 作为下一步的输入。
 * 3. 选中 END 或文本长度达到`max_len`时停止。
 */

#[cfg(test)]
mod tests;

use ndarray::{Array1, ArrayView1};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use crate::alphabet::{Alphabet, normalize, one_hot};
use crate::errors::{Result, RnnError};
use crate::nn::CharRnn;
use crate::utils::argmax;

/// 选字策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// 按输出分布随机采样
    #[default]
    Sample,
    /// 每步取概率最大的字符（并列时取索引最小者）
    Greedy,
}

/// 生成配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// 生成文本（含前缀）的最大字符数
    pub max_len: usize,
    pub strategy: Strategy,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            max_len: 20,
            strategy: Strategy::Sample,
        }
    }
}

impl GenerateConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_len == 0 {
            return Err(RnnError::InvalidConfig("max_len 须大于0".to_string()));
        }
        Ok(())
    }
}

/// 一次生成的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// 生成的文本（含前缀，不含 END）
    pub text: String,
    /// 是否因选中 END 而结束；为`false`表示在长度上限处被截断
    pub terminated: bool,
}

/// 名字生成器
///
/// 只持有模型和字母表的不可变借用，每次生成各自维护隐藏状态。
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
    model: &'a CharRnn,
    alphabet: &'a Alphabet,
    config: GenerateConfig,
}

impl<'a> Generator<'a> {
    pub fn new(model: &'a CharRnn, alphabet: &'a Alphabet, config: GenerateConfig) -> Result<Self> {
        config.validate()?;
        if alphabet.len() != model.vocab_size() {
            return Err(RnnError::shape_mismatch(
                &[model.vocab_size()],
                &[alphabet.len()],
                "字母表大小须等于模型的V",
            ));
        }
        Ok(Self {
            model,
            alphabet,
            config,
        })
    }

    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    /// 按配置中的策略生成
    pub fn generate<R: Rng + ?Sized>(&self, prefix: &str, rng: &mut R) -> Result<Generated> {
        match self.config.strategy {
            Strategy::Sample => self.sample(prefix, rng),
            Strategy::Greedy => self.greedy(prefix),
        }
    }

    /// 贪心解码，结果只取决于模型和前缀
    pub fn greedy(&self, prefix: &str) -> Result<Generated> {
        self.run(prefix, |probs| {
            argmax(probs).ok_or_else(|| RnnError::InvalidDistribution(format!("{probs}")))
        })
    }

    /// 按输出分布随机采样
    pub fn sample<R: Rng + ?Sized>(&self, prefix: &str, rng: &mut R) -> Result<Generated> {
        self.run(prefix, |probs| sample_index(probs, rng))
    }

    /// 连续生成`count`个名字
    pub fn generate_many<R: Rng + ?Sized>(
        &self,
        prefix: &str,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Generated>> {
        (0..count).map(|_| self.generate(prefix, rng)).collect()
    }

    fn run<F>(&self, prefix: &str, mut choose: F) -> Result<Generated>
    where
        F: FnMut(ArrayView1<'_, f32>) -> Result<usize>,
    {
        let max_len = self.config.max_len;
        let vocab_size = self.alphabet.len();
        let end_index = self.alphabet.end_index();

        let mut text = normalize(prefix);
        let mut len = text.chars().count();
        if len > max_len {
            return Err(RnnError::InvalidConfig(format!(
                "前缀长度{len}超过了max_len={max_len}"
            )));
        }

        let mut h = self.model.initial_state();
        let mut probs = Array1::zeros(vocab_size);
        if len == 0 {
            (h, probs) = self.model.step(Array1::zeros(vocab_size).view(), h.view())?;
        }
        for index in self.alphabet.encode_str(&text)? {
            if index == end_index {
                return Err(RnnError::UnknownSymbol(self.alphabet.end()));
            }
            (h, probs) = self.model.step(one_hot(index, vocab_size)?.view(), h.view())?;
        }

        loop {
            let next = choose(probs.view())?;
            if next == end_index {
                return Ok(Generated {
                    text,
                    terminated: true,
                });
            }
            if len == max_len {
                tracing::warn!(max_len, text = %text, "生成达到长度上限，结果被截断");
                return Ok(Generated {
                    text,
                    terminated: false,
                });
            }
            text.push(self.alphabet.decode(next)?);
            len += 1;
            (h, probs) = self.model.step(one_hot(next, vocab_size)?.view(), h.view())?;
        }
    }
}

/// 按概率向量采样一个索引；全零、负数或 NaN 的向量返回`InvalidDistribution`
fn sample_index<R: Rng + ?Sized>(probs: ArrayView1<'_, f32>, rng: &mut R) -> Result<usize> {
    let dist = WeightedIndex::<f32>::new(probs.iter())
        .map_err(|e| RnnError::InvalidDistribution(e.to_string()))?;
    Ok(dist.sample(rng))
}

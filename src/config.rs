/*
 * @Date         : 2026-10-18
 * @Description  : 整体配置：隐藏层宽度、最大序列长度、训练与生成参数（JSON）
 */

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::data::PaddedBatch;
use crate::errors::{Result, RnnError};
use crate::generate::GenerateConfig;
use crate::nn::{CharRnn, TrainConfig};

/// 名字生成模型的完整配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameRnnConfig {
    /// 隐藏层宽度`H`
    pub hidden_size: usize,
    /// 最大序列长度`T`；为`None`时取语料中最长名字的长度
    pub max_seq_len: Option<usize>,
    pub train: TrainConfig,
    pub generate: GenerateConfig,
}

impl Default for NameRnnConfig {
    fn default() -> Self {
        Self {
            hidden_size: 64,
            max_seq_len: None,
            train: TrainConfig::default(),
            generate: GenerateConfig::default(),
        }
    }
}

impl NameRnnConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hidden_size == 0 {
            return Err(RnnError::InvalidConfig("hidden_size 须大于0".to_string()));
        }
        if self.max_seq_len == Some(0) {
            return Err(RnnError::InvalidConfig("max_seq_len 须大于0".to_string()));
        }
        self.train.validate()?;
        self.generate.validate()
    }

    /// 按配置和字母表创建模型，初始化种子取自`train.seed`
    pub fn build_model(&self, alphabet: &Alphabet) -> Result<CharRnn> {
        self.validate()?;
        CharRnn::new_with_seed(alphabet.len(), self.hidden_size, self.train.seed)
    }

    /// 按配置的最大序列长度把名字整理成填充批次
    pub fn prepare_batch<S: AsRef<str>>(&self, names: &[S], alphabet: &Alphabet) -> Result<PaddedBatch> {
        match self.max_seq_len {
            Some(width) => PaddedBatch::prepare_with_width(names, alphabet, width),
            None => PaddedBatch::prepare(names, alphabet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_err;
    use crate::generate::Strategy;
    use crate::nn::OptimizerConfig;

    #[test]
    fn test_default_config_is_valid() {
        let config = NameRnnConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generate.max_len, 20);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "hidden_size": 32,
            "train": {"epochs": 5, "optimizer": {"kind": "sgd", "learning_rate": 0.1}},
            "generate": {"strategy": "greedy"}
        }"#;
        let config = NameRnnConfig::from_json_str(json).unwrap();
        assert_eq!(config.hidden_size, 32);
        assert_eq!(config.max_seq_len, None);
        assert_eq!(config.train.epochs, 5);
        assert_eq!(config.train.optimizer, OptimizerConfig::Sgd { learning_rate: 0.1 });
        assert_eq!(config.train.seed, TrainConfig::default().seed);
        assert_eq!(config.generate.strategy, Strategy::Greedy);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = NameRnnConfig::default();
        config.max_seq_len = Some(12);
        config.train.batch_size = Some(16);
        let json = config.to_json().unwrap();
        assert_eq!(NameRnnConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_configs() {
        assert_err!(
            NameRnnConfig::from_json_str(r#"{"hidden_size": 0}"#),
            RnnError::InvalidConfig(_)
        );
        assert_err!(
            NameRnnConfig::from_json_str(r#"{"generate": {"max_len": 0}}"#),
            RnnError::InvalidConfig(_)
        );
        assert_err!(
            NameRnnConfig::from_json_str(r#"{"train": {"optimizer": {"kind": "sgd", "learning_rate": -1.0}}}"#),
            RnnError::InvalidConfig(_)
        );
        assert_err!(NameRnnConfig::from_json_str("{oops"), RnnError::Serialization(_));
    }

    #[test]
    fn test_build_model_and_batch() {
        let alphabet = Alphabet::new(['a', 'b'], '$').unwrap();
        let config = NameRnnConfig {
            hidden_size: 5,
            max_seq_len: Some(4),
            ..NameRnnConfig::default()
        };
        let model = config.build_model(&alphabet).unwrap();
        assert_eq!((model.vocab_size(), model.hidden_size()), (3, 5));
        assert_eq!(model, config.build_model(&alphabet).unwrap());

        let batch = config.prepare_batch(&["ab", "b"], &alphabet).unwrap();
        assert_eq!(batch.seq_len(), 4);
        assert_err!(
            config.prepare_batch(&["ababa"], &alphabet),
            RnnError::ShapeMismatch([4, 3], [5, 3], "名字长度超过了最大序列长度")
        );
    }
}

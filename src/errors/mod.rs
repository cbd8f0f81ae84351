/*
 * @Date         : 2026-10-18
 * @Description  : 全库统一的错误类型
 */

use thiserror::Error;

/// 本库所有可失败操作的返回类型
pub type Result<T> = std::result::Result<T, RnnError>;

#[derive(Error, Debug)]
pub enum RnnError {
    // 字母表编解码
    #[error("字符{0:?}不在字母表中")]
    UnknownSymbol(char),
    #[error("索引{index}超出字母表范围[0, {size})")]
    UnknownIndex { index: usize, size: usize },
    #[error("构造one-hot向量失败：索引{index}须<宽度{width}")]
    IndexOutOfRange { index: usize, width: usize },
    #[error("字母表中存在重复字符{0:?}")]
    DuplicateSymbol(char),

    // 形状
    #[error("形状不一致（{message}）：期望{expected:?}，实际{got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    // 退化输入
    #[error("批次为空")]
    EmptyBatch,
    #[error("名字为空（第{0}个）")]
    EmptyName(usize),

    #[error("配置无效：{0}")]
    InvalidConfig(String),
    #[error("无法从该概率分布中采样：{0}")]
    InvalidDistribution(String),

    // 语料/模型文件
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("格式错误（第{line}行）: {message}")]
    Format { line: usize, message: String },
    #[error("（反）序列化失败: {0}")]
    Serialization(String),
}

impl RnnError {
    /// 便捷构造形状错误
    pub(crate) fn shape_mismatch(expected: &[usize], got: &[usize], message: &str) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
            message: message.to_string(),
        }
    }
}

impl From<bincode::Error> for RnnError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for RnnError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

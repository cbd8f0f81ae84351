//! 数据模块
//!
//! 负责把名字语料变成可训练的张量。
//!
//! # 主要组件
//!
//! - [`load_names`] / [`parse_names`]: 从分隔文本读取名字（规范化、频数过滤、去重）
//! - [`PaddedBatch`]: 右侧补零的 one-hot 输入/目标张量 `[N, T, V]`
//! - [`BatchLoader`]: 把 [`PaddedBatch`] 切成 mini-batch 的迭代器
//!
//! # 使用示例
//!
//! ```ignore
//! use name_rnn::alphabet::Alphabet;
//! use name_rnn::data::{BatchLoader, PaddedBatch};
//!
//! let alphabet = Alphabet::male_names();
//! let batch = PaddedBatch::prepare(&["jan", "petr"], &alphabet)?;
//! for mini in BatchLoader::new(&batch, 32).shuffle(true).seed(42).iter() {
//!     // ...
//! }
//! ```

pub mod corpus;
mod dataloader;
mod prepare;


// Re-exports
pub use corpus::{CorpusOptions, load_names, parse_names};
pub use dataloader::{BatchLoader, BatchLoaderIterator};
pub use prepare::{EncodedName, PaddedBatch, encode_name};

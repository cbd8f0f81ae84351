//! # Name RNN
//!
//! `name_rnn`用纯rust实现一个字符级的[Elman循环网络](https://en.wikipedia.org/wiki/Recurrent_neural_network#Elman_networks_and_Jordan_networks)，
//! 从名字语料中学习“给定前面的字符，预测下一个字符”，再以随机采样或贪心解码的方式生成新的（男性）名字。
//!
//! 数据流：原始名字 → 字母表编码 → 填充批次 → 训练 → 生成 → 字母表解码。
//!

pub mod alphabet;
pub mod config;
pub mod data;
pub mod errors;
pub mod generate;
pub mod nn;
pub mod utils;

pub use alphabet::Alphabet;
pub use config::NameRnnConfig;
pub use errors::{Result, RnnError};
pub use generate::{GenerateConfig, Generated, Generator, Strategy};

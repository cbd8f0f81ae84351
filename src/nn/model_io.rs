/*
 * @Date         : 2026-10-18
 * @Description  : 模型保存/加载（字母表 + V + H + 五个参数张量，bincode 格式）
 *
 * 字母表与参数一起保存：V 改变会让模型失效，因此加载时一并校验。
 */

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::rnn::{CharRnn, RnnParameters};
use crate::alphabet::Alphabet;
use crate::errors::{Result, RnnError};

/// 模型文件魔数
const MODEL_MAGIC: [u8; 4] = *b"NRNN";
/// 模型文件版本
const MODEL_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    magic: [u8; 4],
    version: u32,
    vocab_size: usize,
    hidden_size: usize,
    alphabet: &'a Alphabet,
    params: &'a RnnParameters,
}

#[derive(Deserialize)]
struct Snapshot {
    magic: [u8; 4],
    version: u32,
    vocab_size: usize,
    hidden_size: usize,
    alphabet: Alphabet,
    params: RnnParameters,
}

impl CharRnn {
    /// 序列化为字节
    pub fn to_bytes(&self, alphabet: &Alphabet) -> Result<Vec<u8>> {
        if alphabet.len() != self.vocab_size() {
            return Err(RnnError::shape_mismatch(
                &[self.vocab_size()],
                &[alphabet.len()],
                "字母表大小须等于模型的V",
            ));
        }
        let snapshot = SnapshotRef {
            magic: MODEL_MAGIC,
            version: MODEL_VERSION,
            vocab_size: self.vocab_size(),
            hidden_size: self.hidden_size(),
            alphabet,
            params: self.parameters(),
        };
        Ok(bincode::serialize(&snapshot)?)
    }

    /// 从字节反序列化，返回模型及其字母表
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, Alphabet)> {
        let snapshot: Snapshot = bincode::deserialize(bytes)?;
        if snapshot.magic != MODEL_MAGIC {
            return Err(RnnError::Serialization("不是模型文件（魔数不匹配）".to_string()));
        }
        if snapshot.version != MODEL_VERSION {
            return Err(RnnError::Serialization(format!(
                "不支持的模型文件版本{}（当前为{MODEL_VERSION}）",
                snapshot.version
            )));
        }
        let model = Self::from_parameters(snapshot.params)?;
        let declared = [snapshot.vocab_size, snapshot.hidden_size];
        let actual = [model.vocab_size(), model.hidden_size()];
        if declared != actual {
            return Err(RnnError::shape_mismatch(&declared, &actual, "文件头声明的V/H与参数不符"));
        }
        if snapshot.alphabet.len() != model.vocab_size() {
            return Err(RnnError::shape_mismatch(
                &[model.vocab_size()],
                &[snapshot.alphabet.len()],
                "字母表大小须等于模型的V",
            ));
        }
        Ok((model, snapshot.alphabet))
    }

    /// 保存模型到文件
    pub fn save<P: AsRef<Path>>(&self, path: P, alphabet: &Alphabet) -> Result<()> {
        let bytes = self.to_bytes(alphabet)?;
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writer.write_all(&bytes)?;
        writer.flush()?;
        tracing::info!(path = %path.as_ref().display(), bytes = bytes.len(), "模型已保存");
        Ok(())
    }

    /// 从文件加载模型及其字母表
    pub fn load<P: AsRef<Path>>(path: P) -> Result<(Self, Alphabet)> {
        let mut bytes = Vec::new();
        BufReader::new(File::open(path.as_ref())?).read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }
}

/*
 * @Date         : 2026-10-18
 * @Description  : 字母表编解码器：字符 <-> 稠密索引，以及 one-hot 编解码
 *
 * 字母表一经构造便不可变，由调用方显式传给需要它的组件（不存在进程级全局表）。
 * END（结束符）总是占据最后一个索引 V-1。
 */

use std::collections::{BTreeSet, HashMap};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, RnnError};
use crate::utils::{argmax, is_zero_row};


/// 默认结束符。名字按行存放，换行天然不会出现在名字内部
pub const DEFAULT_END: char = '\n';

/// 默认字母表中的常规字符：英文字母、捷克/斯洛伐克变音字母、空格和撇号
const MALE_NAME_SYMBOLS: &str = "abcdefghijklmnopqrstuvwxyzáäčďéěíĺľňóôŕřšťúůýž '";

/// 字母表
///
/// 共`V`个互不相同的字符，其中最后一个为 END。
/// 字符与`[0, V)`内的索引一一对应。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AlphabetRepr", into = "AlphabetRepr")]
pub struct Alphabet {
    symbols: Vec<char>,
    index: HashMap<char, usize>,
}

impl Alphabet {
    /// 由常规字符和结束符构造字母表，END 被放在最后
    ///
    /// 常规字符中若有重复（或包含 END 本身），返回`DuplicateSymbol`
    pub fn new<I: IntoIterator<Item = char>>(symbols: I, end: char) -> Result<Self> {
        let mut seen = BTreeSet::new();
        seen.insert(end);
        let mut ordered = Vec::new();
        for c in symbols {
            if !seen.insert(c) {
                return Err(RnnError::DuplicateSymbol(c));
            }
            ordered.push(c);
        }
        ordered.push(end);
        Ok(Self::build(ordered))
    }

    /// 生成男性名字所用的默认字母表（END 为换行符）
    pub fn male_names() -> Self {
        let mut symbols: Vec<char> = MALE_NAME_SYMBOLS.chars().collect();
        symbols.push(DEFAULT_END);
        Self::build(symbols)
    }

    /// 由语料中实际出现过的字符（规范化后、排序）构造字母表
    pub fn from_corpus<S: AsRef<str>>(names: &[S], end: char) -> Result<Self> {
        let chars: BTreeSet<char> = names
            .iter()
            .flat_map(|name| normalize(name.as_ref()).chars().collect::<Vec<_>>())
            .collect();
        if chars.contains(&end) {
            return Err(RnnError::DuplicateSymbol(end));
        }
        Self::new(chars, end)
    }

    fn build(symbols: Vec<char>) -> Self {
        let index = symbols.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self { symbols, index }
    }

    /// 字母表大小`V`（含 END）
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// 字母表至少含 END，因此永远不为空
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// 结束符
    pub fn end(&self) -> char {
        self.symbols[self.end_index()]
    }

    /// 结束符的索引，恒为`V-1`
    pub fn end_index(&self) -> usize {
        self.symbols.len() - 1
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.index.contains_key(&symbol)
    }

    /// 字符 -> 索引
    pub fn encode(&self, symbol: char) -> Result<usize> {
        self.index
            .get(&symbol)
            .copied()
            .ok_or(RnnError::UnknownSymbol(symbol))
    }

    /// 索引 -> 字符
    pub fn decode(&self, index: usize) -> Result<char> {
        self.symbols
            .get(index)
            .copied()
            .ok_or(RnnError::UnknownIndex {
                index,
                size: self.len(),
            })
    }

    /// 逐字符编码整个字符串
    pub fn encode_str(&self, text: &str) -> Result<Vec<usize>> {
        text.chars().map(|c| self.encode(c)).collect()
    }

    /// 逐个解码索引序列
    pub fn decode_indices(&self, indices: &[usize]) -> Result<String> {
        indices.iter().map(|&i| self.decode(i)).collect()
    }

    /// 单个字符的 one-hot 向量，长度为`V`
    pub fn one_hot_symbol(&self, symbol: char) -> Result<Array1<f32>> {
        one_hot(self.encode(symbol)?, self.len())
    }

    /// 整个字符串的 one-hot 矩阵，形状`[k, V]`
    pub fn one_hot_str(&self, text: &str) -> Result<Array2<f32>> {
        let indices = self.encode_str(text)?;
        Ok(self.one_hot_indices(&indices))
    }

    /// 索引序列的 one-hot 矩阵，形状`[k, V]`（索引须已校验）
    pub(crate) fn one_hot_indices(&self, indices: &[usize]) -> Array2<f32> {
        let mut matrix = Array2::zeros((indices.len(), self.len()));
        for (row, &i) in indices.iter().enumerate() {
            matrix[[row, i]] = 1.0;
        }
        matrix
    }

    /// 把 one-hot 矩阵逐行解码为字符串；遇到首个全零行（填充）即停止
    pub fn decode_one_hot_rows(&self, rows: ArrayView2<'_, f32>) -> Result<String> {
        if rows.ncols() != self.len() {
            return Err(RnnError::shape_mismatch(
                &[rows.nrows(), self.len()],
                rows.shape(),
                "one-hot 矩阵的列数须等于字母表大小",
            ));
        }
        let mut text = String::with_capacity(rows.nrows());
        for row in rows.rows() {
            if is_zero_row(row) {
                break;
            }
            text.push(self.decode(one_hot_decode(row)?)?);
        }
        Ok(text)
    }
}

/// 构造 one-hot 向量：除`index`处为 1 外全为 0
pub fn one_hot(index: usize, width: usize) -> Result<Array1<f32>> {
    if index >= width {
        return Err(RnnError::IndexOutOfRange { index, width });
    }
    let mut v = Array1::zeros(width);
    v[index] = 1.0;
    Ok(v)
}

/// one-hot 解码：返回最大值的位置，并列时取最小索引
pub fn one_hot_decode(vector: ArrayView1<'_, f32>) -> Result<usize> {
    argmax(vector).ok_or_else(|| RnnError::shape_mismatch(&[1], &[0], "不能解码空向量"))
}

/// 名字规范化：去掉首尾空白并转为小写
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// 序列化用的中间表示：只保存有序字符表（END 在最后）
#[derive(Serialize, Deserialize)]
struct AlphabetRepr {
    symbols: Vec<char>,
}

impl From<Alphabet> for AlphabetRepr {
    fn from(alphabet: Alphabet) -> Self {
        Self {
            symbols: alphabet.symbols,
        }
    }
}

impl TryFrom<AlphabetRepr> for Alphabet {
    type Error = RnnError;

    fn try_from(repr: AlphabetRepr) -> Result<Self> {
        let mut symbols = repr.symbols;
        let end = symbols
            .pop()
            .ok_or_else(|| RnnError::Serialization("字母表不能为空".to_string()))?;
        Self::new(symbols, end)
    }
}

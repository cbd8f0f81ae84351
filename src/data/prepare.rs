/*
 * @Date         : 2026-10-18
 * @Description  : 序列预处理：名字 -> 右侧补零的 one-hot 输入/目标张量
 *
 * 输入/目标张量形状均为 [N, T, V]：
 * - 第 n 个名字长度为 k 时，前 k 行为 one-hot，其余行全零（填充）；
 * - 目标 = 输入左移一位并在末尾追加 END。
 * 全零的目标行表示“此处无字符”，损失计算时必须跳过。
 */

use ndarray::{Array2, Array3, ArrayView2, Axis, s};

use crate::alphabet::Alphabet;
use crate::errors::{Result, RnnError};
use crate::utils::is_zero_row;

/// 单个名字的索引形式：输入序列和左移一位的目标序列（长度相同）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedName {
    pub input: Vec<usize>,
    pub target: Vec<usize>,
}

/// 编码单个名字
///
/// `position`只用于报错时指明是第几个名字
pub fn encode_name(name: &str, alphabet: &Alphabet, position: usize) -> Result<EncodedName> {
    if name.is_empty() {
        return Err(RnnError::EmptyName(position));
    }
    let input = alphabet.encode_str(name)?;
    let end = alphabet.end_index();
    // 名字内部不允许出现 END
    if input.contains(&end) {
        return Err(RnnError::UnknownSymbol(alphabet.end()));
    }
    let mut target = input[1..].to_vec();
    target.push(end);
    Ok(EncodedName { input, target })
}

/// 补齐后的整批训练数据
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedBatch {
    inputs: Array3<f32>,
    targets: Array3<f32>,
    lengths: Vec<usize>,
}

impl PaddedBatch {
    /// 由名字列表构造批次，`T`取最长名字的长度
    pub fn prepare<S: AsRef<str>>(names: &[S], alphabet: &Alphabet) -> Result<Self> {
        let width = names
            .iter()
            .map(|n| n.as_ref().chars().count())
            .max()
            .ok_or(RnnError::EmptyBatch)?;
        Self::prepare_with_width(names, alphabet, width)
    }

    /// 由名字列表构造批次，并补齐到指定的`width`（即最大序列长度`T`）
    ///
    /// 若某个名字比`width`长，返回`ShapeMismatch`
    pub fn prepare_with_width<S: AsRef<str>>(
        names: &[S],
        alphabet: &Alphabet,
        width: usize,
    ) -> Result<Self> {
        if names.is_empty() {
            return Err(RnnError::EmptyBatch);
        }
        let encoded = names
            .iter()
            .enumerate()
            .map(|(i, name)| encode_name(name.as_ref(), alphabet, i))
            .collect::<Result<Vec<_>>>()?;

        let vocab = alphabet.len();
        let mut inputs = Array3::zeros((encoded.len(), width, vocab));
        let mut targets = Array3::zeros((encoded.len(), width, vocab));
        let mut lengths = Vec::with_capacity(encoded.len());
        for (n, example) in encoded.iter().enumerate() {
            let len = example.input.len();
            if len > width {
                return Err(RnnError::shape_mismatch(
                    &[width, vocab],
                    &[len, vocab],
                    "名字长度超过了最大序列长度",
                ));
            }
            for (t, (&x, &y)) in example.input.iter().zip(&example.target).enumerate() {
                inputs[[n, t, x]] = 1.0;
                targets[[n, t, y]] = 1.0;
            }
            lengths.push(len);
        }

        Ok(Self {
            inputs,
            targets,
            lengths,
        })
    }

    /// 由逐个样本的`(输入, 目标)`矩阵构造批次，右侧补零到最长样本
    ///
    /// 每对矩阵的形状须完全一致，且所有样本的特征宽度须相同
    pub fn from_sequences(pairs: &[(Array2<f32>, Array2<f32>)]) -> Result<Self> {
        let (first, _) = pairs.first().ok_or(RnnError::EmptyBatch)?;
        let vocab = first.ncols();
        let width = pairs.iter().map(|(x, _)| x.nrows()).max().unwrap_or(0);

        let mut inputs = Array3::zeros((pairs.len(), width, vocab));
        let mut targets = Array3::zeros((pairs.len(), width, vocab));
        for (n, (x, y)) in pairs.iter().enumerate() {
            if x.shape() != y.shape() {
                return Err(RnnError::shape_mismatch(
                    x.shape(),
                    y.shape(),
                    "输入与目标形状须一致",
                ));
            }
            if x.ncols() != vocab {
                return Err(RnnError::shape_mismatch(
                    &[x.nrows(), vocab],
                    x.shape(),
                    "所有样本的特征宽度须一致",
                ));
            }
            let len = x.nrows();
            inputs.slice_mut(s![n, ..len, ..]).assign(x);
            targets.slice_mut(s![n, ..len, ..]).assign(y);
        }
        Self::from_tensors(inputs, targets)
    }

    /// 由已补齐的`[N, T, V]`张量构造批次
    ///
    /// 每个样本的有效长度取目标张量中非零行的个数
    pub fn from_tensors(inputs: Array3<f32>, targets: Array3<f32>) -> Result<Self> {
        if inputs.shape() != targets.shape() {
            return Err(RnnError::shape_mismatch(
                inputs.shape(),
                targets.shape(),
                "输入与目标形状须一致",
            ));
        }
        if inputs.len_of(Axis(0)) == 0 {
            return Err(RnnError::EmptyBatch);
        }
        let lengths = targets
            .outer_iter()
            .map(|example| example.rows().into_iter().filter(|r| !is_zero_row(*r)).count())
            .collect();
        Ok(Self {
            inputs,
            targets,
            lengths,
        })
    }

    /// 样本数`N`
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// 补齐后的序列长度`T`
    pub fn seq_len(&self) -> usize {
        self.inputs.len_of(Axis(1))
    }

    /// 特征宽度`V`
    pub fn vocab_size(&self) -> usize {
        self.inputs.len_of(Axis(2))
    }

    pub fn inputs(&self) -> &Array3<f32> {
        &self.inputs
    }

    pub fn targets(&self) -> &Array3<f32> {
        &self.targets
    }

    /// 各样本的有效长度
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// 第`t`个时间步上全部样本的输入，形状`[N, V]`
    pub fn input_at(&self, t: usize) -> ArrayView2<'_, f32> {
        self.inputs.index_axis(Axis(1), t)
    }

    /// 第`t`个时间步上全部样本的目标，形状`[N, V]`
    pub fn target_at(&self, t: usize) -> ArrayView2<'_, f32> {
        self.targets.index_axis(Axis(1), t)
    }

    /// 第`n`个样本的`(输入, 目标)`，形状均为`[T, V]`
    pub fn example(&self, n: usize) -> (ArrayView2<'_, f32>, ArrayView2<'_, f32>) {
        (
            self.inputs.index_axis(Axis(0), n),
            self.targets.index_axis(Axis(0), n),
        )
    }

    /// 有效位置掩码`[N, T]`：目标行非全零即为有效
    pub fn mask(&self) -> Array2<bool> {
        let (n, t) = (self.len(), self.seq_len());
        Array2::from_shape_fn((n, t), |(i, j)| {
            !is_zero_row(self.targets.slice(s![i, j, ..]))
        })
    }

    /// 有效时间步总数（参与损失计算的位置数）
    pub fn valid_steps(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// 按索引抽取子批次（用于 mini-batch）
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            inputs: self.inputs.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
            lengths: indices.iter().map(|&i| self.lengths[i]).collect(),
        }
    }
}

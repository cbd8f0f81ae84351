/*
 * @Date         : 2026-10-18
 * @Description  : 字符级 Elman 循环网络
 *
 * 公式（行向量约定）:
 *   h_t = tanh(x_t @ W_ih + h_{t-1} @ W_hh + b_h)
 *   o_t = softmax(h_t @ W_ho + b_o)
 *
 * 形状：
 * - W_ih: [V, H]
 * - W_hh: [H, H]
 * - b_h:  [H]
 * - W_ho: [H, V]
 * - b_o:  [V]
 *
 * 每条序列的隐藏状态都从零向量开始，批内各序列互不干扰。
 */

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayView3, ArrayViewD, ArrayViewMutD, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::init::Init;
use super::loss::stable_softmax_batch;
use crate::errors::{Result, RnnError};

/// 循环网络的五个参数张量（梯度与优化器状态也复用此结构）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RnnParameters {
    /// 输入到隐藏权重 W_ih: [V, H]
    pub w_ih: Array2<f32>,
    /// 隐藏到隐藏权重 W_hh: [H, H]
    pub w_hh: Array2<f32>,
    /// 隐藏层偏置 b_h: [H]
    pub b_h: Array1<f32>,
    /// 隐藏到输出权重 W_ho: [H, V]
    pub w_ho: Array2<f32>,
    /// 输出层偏置 b_o: [V]
    pub b_o: Array1<f32>,
}

impl RnnParameters {
    /// 全零参数
    pub fn zeros(vocab_size: usize, hidden_size: usize) -> Self {
        Self {
            w_ih: Array2::zeros((vocab_size, hidden_size)),
            w_hh: Array2::zeros((hidden_size, hidden_size)),
            b_h: Array1::zeros(hidden_size),
            w_ho: Array2::zeros((hidden_size, vocab_size)),
            b_o: Array1::zeros(vocab_size),
        }
    }

    /// 与自身同形状的全零参数
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.vocab_size(), self.hidden_size())
    }

    pub fn vocab_size(&self) -> usize {
        self.w_ih.nrows()
    }

    pub fn hidden_size(&self) -> usize {
        self.w_ih.ncols()
    }

    /// 校验五个张量的形状是否彼此一致
    pub fn validate(&self) -> Result<()> {
        let (v, h) = (self.vocab_size(), self.hidden_size());
        if v == 0 || h == 0 {
            return Err(RnnError::InvalidConfig(format!(
                "字母表大小和隐藏层宽度须大于0，实际为V={v}，H={h}"
            )));
        }
        let checks: [(&[usize], Vec<usize>, &str); 4] = [
            (self.w_hh.shape(), vec![h, h], "W_hh"),
            (self.b_h.shape(), vec![h], "b_h"),
            (self.w_ho.shape(), vec![h, v], "W_ho"),
            (self.b_o.shape(), vec![v], "b_o"),
        ];
        for (got, expected, name) in checks {
            if got != expected.as_slice() {
                return Err(RnnError::shape_mismatch(&expected, got, name));
            }
        }
        Ok(())
    }

    /// 五个张量的只读视图（固定顺序：W_ih, W_hh, b_h, W_ho, b_o）
    pub fn tensors(&self) -> [ArrayViewD<'_, f32>; 5] {
        [
            self.w_ih.view().into_dyn(),
            self.w_hh.view().into_dyn(),
            self.b_h.view().into_dyn(),
            self.w_ho.view().into_dyn(),
            self.b_o.view().into_dyn(),
        ]
    }

    /// 五个张量的可变视图（顺序同 [`Self::tensors`]）
    pub fn tensors_mut(&mut self) -> [ArrayViewMutD<'_, f32>; 5] {
        [
            self.w_ih.view_mut().into_dyn(),
            self.w_hh.view_mut().into_dyn(),
            self.b_h.view_mut().into_dyn(),
            self.w_ho.view_mut().into_dyn(),
            self.b_o.view_mut().into_dyn(),
        ]
    }

    /// 所有元素的 L2 范数
    pub fn global_norm(&self) -> f32 {
        self.tensors()
            .iter()
            .map(|t| t.iter().map(|v| v * v).sum::<f32>())
            .sum::<f32>()
            .sqrt()
    }

    /// 所有元素乘以`factor`
    pub fn scale(&mut self, factor: f32) {
        for mut t in self.tensors_mut() {
            t *= factor;
        }
    }

    /// 参数总个数
    pub fn num_elements(&self) -> usize {
        self.tensors().iter().map(|t| t.len()).sum()
    }
}

/// 单条序列的前向结果
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// 各时间步的隐藏状态 h_t: [T, H]
    pub hidden: Array2<f32>,
    /// 各时间步的输出分布 o_t: [T, V]
    pub probs: Array2<f32>,
}

/// 整批序列的前向结果（反向传播时需要全部中间量）
#[derive(Debug, Clone)]
pub struct BatchTrace {
    /// `states[0]`为初始零状态，`states[t + 1]`为 h_t，形状均为 [N, H]
    states: Vec<Array2<f32>>,
    /// 各时间步 softmax 之前的分数 [N, V]
    logits: Vec<Array2<f32>>,
    /// 各时间步的输出分布 [N, V]
    probs: Vec<Array2<f32>>,
}

impl BatchTrace {
    pub fn seq_len(&self) -> usize {
        self.probs.len()
    }

    /// 第`t`步之后的隐藏状态 h_t
    pub fn hidden_at(&self, t: usize) -> ArrayView2<'_, f32> {
        self.states[t + 1].view()
    }

    /// 第`t`步之前的隐藏状态 h_{t-1}（t = 0 时为零状态）
    pub fn hidden_before(&self, t: usize) -> ArrayView2<'_, f32> {
        self.states[t].view()
    }

    pub fn logits_at(&self, t: usize) -> ArrayView2<'_, f32> {
        self.logits[t].view()
    }

    pub fn probs_at(&self, t: usize) -> ArrayView2<'_, f32> {
        self.probs[t].view()
    }
}

/// 字符级 Elman 循环网络
///
/// 参数只由训练器修改；生成时以不可变借用方式使用，因此多个生成过程可并发运行。
#[derive(Debug, Clone, PartialEq)]
pub struct CharRnn {
    params: RnnParameters,
}

impl CharRnn {
    /// 用给定的随机数生成器初始化（权重 Xavier，偏置为零）
    pub fn new(vocab_size: usize, hidden_size: usize, rng: &mut StdRng) -> Result<Self> {
        let params = RnnParameters {
            w_ih: Init::Xavier.matrix(vocab_size, hidden_size, rng),
            w_hh: Init::Xavier.matrix(hidden_size, hidden_size, rng),
            b_h: Init::Zeros.vector(hidden_size, rng),
            w_ho: Init::Xavier.matrix(hidden_size, vocab_size, rng),
            b_o: Init::Zeros.vector(vocab_size, rng),
        };
        Self::from_parameters(params)
    }

    /// 用固定种子初始化，结果可复现
    pub fn new_with_seed(vocab_size: usize, hidden_size: usize, seed: u64) -> Result<Self> {
        Self::new(vocab_size, hidden_size, &mut StdRng::seed_from_u64(seed))
    }

    /// 由外部提供的五个张量构造（如从磁盘加载），形状不一致时返回`ShapeMismatch`
    pub fn from_parameters(params: RnnParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn parameters(&self) -> &RnnParameters {
        &self.params
    }

    pub fn into_parameters(self) -> RnnParameters {
        self.params
    }

    pub(crate) fn parameters_mut(&mut self) -> &mut RnnParameters {
        &mut self.params
    }

    /// 字母表大小`V`
    pub fn vocab_size(&self) -> usize {
        self.params.vocab_size()
    }

    /// 隐藏层宽度`H`
    pub fn hidden_size(&self) -> usize {
        self.params.hidden_size()
    }

    /// 新序列的初始隐藏状态（零向量）
    pub fn initial_state(&self) -> Array1<f32> {
        Array1::zeros(self.hidden_size())
    }

    /// 单步前向传播：返回`(h_t, o_t)`
    pub fn step(
        &self,
        x: ArrayView1<'_, f32>,
        h_prev: ArrayView1<'_, f32>,
    ) -> Result<(Array1<f32>, Array1<f32>)> {
        if x.len() != self.vocab_size() {
            return Err(RnnError::shape_mismatch(
                &[self.vocab_size()],
                x.shape(),
                "输入向量宽度须等于字母表大小",
            ));
        }
        if h_prev.len() != self.hidden_size() {
            return Err(RnnError::shape_mismatch(
                &[self.hidden_size()],
                h_prev.shape(),
                "隐藏状态宽度须等于隐藏层宽度",
            ));
        }
        let (h, logits) = self.step_rows(x.insert_axis(Axis(0)), h_prev.insert_axis(Axis(0)));
        let probs = stable_softmax_batch(&logits);
        Ok((h.row(0).to_owned(), probs.row(0).to_owned()))
    }

    /// 对单条序列`[T, V]`做前向传播
    pub fn forward(&self, sequence: ArrayView2<'_, f32>) -> Result<Trace> {
        let trace = self.forward_batch(sequence.insert_axis(Axis(0)))?;
        let t_len = trace.seq_len();
        let mut hidden = Array2::zeros((t_len, self.hidden_size()));
        let mut probs = Array2::zeros((t_len, self.vocab_size()));
        for t in 0..t_len {
            hidden.row_mut(t).assign(&trace.hidden_at(t).row(0));
            probs.row_mut(t).assign(&trace.probs_at(t).row(0));
        }
        Ok(Trace { hidden, probs })
    }

    /// 对整批序列`[N, T, V]`做前向传播，每条序列各自从零状态开始
    pub fn forward_batch(&self, inputs: ArrayView3<'_, f32>) -> Result<BatchTrace> {
        let (n, t_len, v) = inputs.dim();
        if v != self.vocab_size() {
            return Err(RnnError::shape_mismatch(
                &[n, t_len, self.vocab_size()],
                inputs.shape(),
                "输入特征宽度须等于字母表大小",
            ));
        }

        let mut states = Vec::with_capacity(t_len + 1);
        let mut logits = Vec::with_capacity(t_len);
        let mut probs = Vec::with_capacity(t_len);
        states.push(Array2::zeros((n, self.hidden_size())));
        for t in 0..t_len {
            let x_t = inputs.index_axis(Axis(1), t);
            let (h, z) = self.step_rows(x_t, states[t].view());
            probs.push(stable_softmax_batch(&z));
            logits.push(z);
            states.push(h);
        }

        Ok(BatchTrace {
            states,
            logits,
            probs,
        })
    }

    /// 一个时间步的矩阵形式：x: [N, V], h_prev: [N, H] -> (h: [N, H], logits: [N, V])
    fn step_rows(
        &self,
        x: ArrayView2<'_, f32>,
        h_prev: ArrayView2<'_, f32>,
    ) -> (Array2<f32>, Array2<f32>) {
        let p = &self.params;
        let pre_hidden = x.dot(&p.w_ih) + h_prev.dot(&p.w_hh) + &p.b_h;
        let h = pre_hidden.mapv_into(f32::tanh);
        let logits = h.dot(&p.w_ho) + &p.b_o;
        (h, logits)
    }
}

/*
 * @Date         : 2026-10-18
 * @Description  : BatchLoader - 把整批补齐数据切成 mini-batch 的迭代器
 *
 * 支持：
 * - 自动分批 (batch_size)
 * - 随机打乱 (shuffle，可指定种子)
 */

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::PaddedBatch;

/// BatchLoader - 按样本切分 [`PaddedBatch`]
///
/// # 示例
/// ```ignore
/// let loader = BatchLoader::new(&batch, 32).shuffle(true).seed(42);
/// for mini in loader.iter() {
///     trainer.train_step(&mut model, &mini)?;
/// }
/// ```
pub struct BatchLoader<'a> {
    batch: &'a PaddedBatch,
    batch_size: usize,
    shuffle: bool,
    seed: Option<u64>,
}

impl<'a> BatchLoader<'a> {
    /// 创建新的 BatchLoader；`batch_size`为 0 时按整批处理
    pub fn new(batch: &'a PaddedBatch, batch_size: usize) -> Self {
        let batch_size = if batch_size == 0 {
            batch.len().max(1)
        } else {
            batch_size
        };
        Self {
            batch,
            batch_size,
            shuffle: false,
            seed: None,
        }
    }

    /// 设置是否打乱数据
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// 设置随机种子（用于 shuffle）
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 获取批次数量
    pub fn num_batches(&self) -> usize {
        self.batch.len().div_ceil(self.batch_size)
    }

    /// 按当前设置生成一轮的样本顺序
    fn epoch_indices(&self, epoch: u64) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.batch.len()).collect();
        if self.shuffle {
            match self.seed {
                // 每轮使用不同但可复现的顺序
                Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed.wrapping_add(epoch))),
                None => indices.shuffle(&mut rand::thread_rng()),
            }
        }
        indices
    }

    /// 创建第 0 轮的迭代器
    pub fn iter(&self) -> BatchLoaderIterator<'_> {
        self.iter_epoch(0)
    }

    /// 创建第`epoch`轮的迭代器（打乱顺序随轮次变化）
    pub fn iter_epoch(&self, epoch: u64) -> BatchLoaderIterator<'_> {
        BatchLoaderIterator {
            batch: self.batch,
            batch_size: self.batch_size,
            indices: self.epoch_indices(epoch),
            current_batch: 0,
        }
    }
}

/// BatchLoader 迭代器
pub struct BatchLoaderIterator<'a> {
    batch: &'a PaddedBatch,
    batch_size: usize,
    indices: Vec<usize>,
    current_batch: usize,
}

impl Iterator for BatchLoaderIterator<'_> {
    type Item = PaddedBatch;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.current_batch * self.batch_size;
        if start >= self.indices.len() {
            return None;
        }
        let end = (start + self.batch_size).min(self.indices.len());
        self.current_batch += 1;
        Some(self.batch.select(&self.indices[start..end]))
    }
}

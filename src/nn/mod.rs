/*
 * @Date         : 2026-10-18
 * @Description  : 负责循环神经网络（recurrent neural network）的构建、训练与持久化
 */

mod init;
mod loss;
mod model_io;
pub mod optimizer;
mod rnn;
mod trainer;

pub use init::Init;
pub use loss::{Reduction, cross_entropy_rows, masked_cross_entropy, row_mask, stable_softmax_batch};
pub use optimizer::{Adam, AnyOptimizer, Optimizer, OptimizerConfig, SGD};
pub use rnn::{BatchTrace, CharRnn, RnnParameters, Trace};
pub use trainer::{TrainConfig, TrainReport, Trainer, loss_and_gradients};

#[cfg(test)]
mod tests;


use crate::alphabet::Alphabet;
use crate::data::PaddedBatch;

/// 测试用的小字母表 {a, b, c, END='$'}
fn abc() -> Alphabet {
    Alphabet::new(['a', 'b', 'c'], '$').unwrap()
}

fn abc_batch(names: &[&str]) -> PaddedBatch {
    PaddedBatch::prepare(names, &abc()).unwrap()
}

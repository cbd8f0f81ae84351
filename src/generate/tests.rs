use ndarray::{Array1, Array2, array};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{GenerateConfig, Generated, Generator, Strategy, sample_index};
use crate::alphabet::Alphabet;
use crate::assert_err;
use crate::errors::RnnError;
use crate::nn::{CharRnn, RnnParameters};

fn abc() -> Alphabet {
    Alphabet::new(['a', 'b', 'c'], '$').unwrap()
}

/// 手工设定的模型：a 之后必为 b，b 之后必为 END，c 之后必为 c
///
/// H = V = 4，隐藏状态近似等于上一个字符的 one-hot；零输入时输出均匀分布。
fn scripted_model() -> CharRnn {
    let mut w_ho = Array2::zeros((4, 4));
    w_ho[[0, 1]] = 20.0; // a -> b
    w_ho[[1, 3]] = 20.0; // b -> $
    w_ho[[2, 2]] = 20.0; // c -> c
    w_ho[[3, 0]] = 20.0;
    CharRnn::from_parameters(RnnParameters {
        w_ih: Array2::eye(4) * 3.0,
        w_hh: Array2::zeros((4, 4)),
        b_h: Array1::zeros(4),
        w_ho,
        b_o: Array1::zeros(4),
    })
    .unwrap()
}

fn greedy_config(max_len: usize) -> GenerateConfig {
    GenerateConfig {
        max_len,
        strategy: Strategy::Greedy,
    }
}

#[test]
fn test_greedy_follows_most_likely_path() {
    let (model, alphabet) = (scripted_model(), abc());
    let generator = Generator::new(&model, &alphabet, greedy_config(10)).unwrap();

    let expected = Generated {
        text: "ab".to_string(),
        terminated: true,
    };
    assert_eq!(generator.greedy("a").unwrap(), expected);
    // 前缀会被规范化
    assert_eq!(generator.greedy(" A").unwrap(), expected);
    // 空前缀：零输入得到均匀分布，并列时取索引最小的 a
    assert_eq!(generator.greedy("").unwrap(), expected);
    assert_eq!(generator.greedy("ab").unwrap().text, "ab");
}

#[test]
fn test_greedy_truncates_at_max_len() {
    let (model, alphabet) = (scripted_model(), abc());
    let generator = Generator::new(&model, &alphabet, greedy_config(5)).unwrap();

    let result = generator.greedy("c").unwrap();
    assert_eq!(result.text, "ccccc");
    assert!(!result.terminated);

    // 前缀恰好占满上限时仍可以选中 END
    let generator = Generator::new(&model, &alphabet, greedy_config(2)).unwrap();
    let result = generator.greedy("ab").unwrap();
    assert_eq!(result.text, "ab");
    assert!(result.terminated);
}

#[test]
fn test_greedy_is_deterministic() {
    let alphabet = Alphabet::male_names();
    let model = CharRnn::new_with_seed(alphabet.len(), 16, 3).unwrap();
    let generator = Generator::new(&model, &alphabet, greedy_config(12)).unwrap();
    let first = generator.greedy("ja").unwrap();
    for _ in 0..3 {
        assert_eq!(generator.greedy("ja").unwrap(), first);
    }
    assert!(first.text.starts_with("ja"));
}

#[test]
fn test_seeded_sampling_is_reproducible() {
    let alphabet = Alphabet::male_names();
    let model = CharRnn::new_with_seed(alphabet.len(), 16, 5).unwrap();
    let generator = Generator::new(&model, &alphabet, GenerateConfig::default()).unwrap();

    let a = generator.generate_many("", 10, &mut StdRng::seed_from_u64(7)).unwrap();
    let b = generator.generate_many("", 10, &mut StdRng::seed_from_u64(7)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 10);
}

/// 未经训练的模型也总能在上限内结束
#[test]
fn test_generation_always_within_bound() {
    let alphabet = Alphabet::male_names();
    let model = CharRnn::new_with_seed(alphabet.len(), 8, 9).unwrap();
    let config = GenerateConfig {
        max_len: 4,
        strategy: Strategy::Sample,
    };
    let generator = Generator::new(&model, &alphabet, config).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    for result in generator.generate_many("", 50, &mut rng).unwrap() {
        let len = result.text.chars().count();
        assert!(len <= 4);
        assert!(result.terminated || len == 4);
        assert!(result.text.chars().all(|c| alphabet.contains(c) && c != alphabet.end()));
    }
}

#[test]
fn test_sampling_the_scripted_model() {
    let (model, alphabet) = (scripted_model(), abc());
    let generator = Generator::new(&model, &alphabet, GenerateConfig::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    // 概率几乎全部集中在 b 上
    let result = generator.sample("a", &mut rng).unwrap();
    assert_eq!(result.text, "ab");
}

#[test]
fn test_generator_runs_concurrently() {
    let (model, alphabet) = (scripted_model(), abc());
    let generator = Generator::new(&model, &alphabet, greedy_config(6)).unwrap();
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = ["a", "c", ""]
            .into_iter()
            .map(|prefix| s.spawn(move || generator.greedy(prefix).unwrap().text))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results, ["ab", "cccccc", "ab"]);
}

#[test]
fn test_prefix_errors() {
    let (model, alphabet) = (scripted_model(), abc());
    let generator = Generator::new(&model, &alphabet, greedy_config(3)).unwrap();

    assert_err!(generator.greedy("ax"), RnnError::UnknownSymbol('x'));
    assert_err!(generator.greedy("a$"), RnnError::UnknownSymbol('$'));
    assert_err!(generator.greedy("abca"), RnnError::InvalidConfig(_));
}

#[test]
fn test_generator_construction_errors() {
    let (model, alphabet) = (scripted_model(), abc());
    assert_err!(
        Generator::new(&model, &alphabet, greedy_config(0)),
        RnnError::InvalidConfig(_)
    );

    let other = Alphabet::male_names();
    assert_err!(
        Generator::new(&model, &other, greedy_config(5)),
        RnnError::ShapeMismatch([4], [other.len()], "字母表大小须等于模型的V")
    );
}

#[test]
fn test_sample_index_rejects_invalid_distribution() {
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(sample_index(array![0.0f32, 1.0, 0.0].view(), &mut rng).unwrap(), 1);
    assert_err!(
        sample_index(array![0.0f32, 0.0].view(), &mut rng),
        RnnError::InvalidDistribution(_)
    );
    assert_err!(
        sample_index(array![f32::NAN, 1.0].view(), &mut rng),
        RnnError::InvalidDistribution(_)
    );
}

#[test]
fn test_generate_config_serde() {
    let config: GenerateConfig = serde_json::from_str(r#"{"strategy": "greedy"}"#).unwrap();
    assert_eq!(config, greedy_config(20));
}

/*
 * @Date         : 2026-10-18
 * @Description  : 名字生成端到端测试：语料 → 填充批次 → 训练 → 保存/加载 → 生成
 */

use std::io::Cursor;

use name_rnn::data::{CorpusOptions, PaddedBatch, parse_names};
use name_rnn::nn::{CharRnn, OptimizerConfig, TrainConfig, Trainer};
use name_rnn::{Alphabet, GenerateConfig, Generator, NameRnnConfig, Strategy};
use rand::SeedableRng;
use rand::rngs::StdRng;

const CORPUS: &str = "\
jméno,četnost
Jan,1200
Petr,950
Pavel,800
Tomáš,760
Jiří,700
Lukáš,20
Ondřej,650
Jan,3
";

fn corpus_names() -> Vec<String> {
    let options = CorpusOptions {
        count_column: Some(1),
        min_count: 100,
        has_header: true,
        ..CorpusOptions::default()
    };
    parse_names(Cursor::new(CORPUS), &options).unwrap()
}

#[test]
fn test_corpus_to_batch() {
    let names = corpus_names();
    assert_eq!(names, ["jan", "petr", "pavel", "tomáš", "jiří", "ondřej"]);

    let alphabet = Alphabet::male_names();
    let batch = PaddedBatch::prepare(&names, &alphabet).unwrap();
    assert_eq!(batch.len(), 6);
    assert_eq!(batch.seq_len(), 6);
    assert_eq!(batch.vocab_size(), alphabet.len());
    assert_eq!(batch.lengths(), &[3, 4, 5, 5, 4, 6]);
    assert_eq!(batch.valid_steps(), 27);
}

#[test]
fn test_train_save_load_generate() {
    let names = corpus_names();
    let alphabet = Alphabet::male_names();
    let config = NameRnnConfig {
        hidden_size: 24,
        train: TrainConfig {
            epochs: 150,
            log_every: 50,
            ..TrainConfig::default()
        },
        generate: GenerateConfig {
            max_len: 12,
            strategy: Strategy::Sample,
        },
        ..NameRnnConfig::default()
    };

    let batch = config.prepare_batch(&names, &alphabet).unwrap();
    let mut model = config.build_model(&alphabet).unwrap();
    let mut trainer = Trainer::new(config.train.clone()).unwrap();
    let before = trainer.evaluate(&model, &batch).unwrap();
    let report = trainer.fit(&mut model, &batch).unwrap();
    let after = trainer.evaluate(&model, &batch).unwrap();
    assert_eq!(report.epoch_losses.len(), 150);
    assert!(after < before * 0.7, "训练前{before}，训练后{after}");

    let path = std::env::temp_dir().join(format!("name_rnn_it_{}.bin", std::process::id()));
    model.save(&path, &alphabet).unwrap();
    let (loaded, loaded_alphabet) = CharRnn::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, model);

    let generator = Generator::new(&model, &alphabet, config.generate).unwrap();
    let reloaded = Generator::new(&loaded, &loaded_alphabet, config.generate).unwrap();
    assert_eq!(generator.greedy("p").unwrap(), reloaded.greedy("p").unwrap());

    let samples = generator
        .generate_many("", 20, &mut StdRng::seed_from_u64(2026))
        .unwrap();
    for sample in &samples {
        assert!(sample.text.chars().count() <= 12);
        assert!(sample.text.chars().all(|c| alphabet.contains(c) && c != alphabet.end()));
    }
}

/// 只学一个名字时，贪心解码应能从首字母复原它
#[test]
fn test_memorized_name_is_regenerated() {
    let alphabet = Alphabet::male_names();
    let batch = PaddedBatch::prepare(&["jan"], &alphabet).unwrap();
    let mut model = CharRnn::new_with_seed(alphabet.len(), 16, 42).unwrap();
    let config = TrainConfig {
        epochs: 300,
        optimizer: OptimizerConfig::Adam {
            learning_rate: 0.05,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        },
        ..TrainConfig::default()
    };
    let report = Trainer::new(config).unwrap().fit(&mut model, &batch).unwrap();
    assert!(report.final_loss().unwrap() < 0.05);

    let generate = GenerateConfig {
        max_len: 10,
        strategy: Strategy::Greedy,
    };
    let generator = Generator::new(&model, &alphabet, generate).unwrap();
    let result = generator.greedy("j").unwrap();
    assert_eq!(result.text, "jan");
    assert!(result.terminated);
}

//! # 男性名字生成示例
//!
//! 在一小批捷克/斯洛伐克男性名字上训练字符级 RNN，然后：
//! - 用贪心解码从几个首字母补全名字
//! - 用随机采样生成一批新名字
//!
//! ## 运行
//! ```bash
//! cargo run --example male_names
//! # 使用自己的语料（CSV：名字,频数）和配置
//! cargo run --example male_names -- names.csv config.json
//! ```

use name_rnn::data::{CorpusOptions, load_names};
use name_rnn::nn::Trainer;
use name_rnn::{Alphabet, Generator, NameRnnConfig, Strategy};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;

const BUILTIN_NAMES: &[&str] = &[
    "adam", "aleš", "alois", "antonín", "bohumil", "bohuslav", "dalibor", "daniel", "david",
    "dušan", "eduard", "emil", "filip", "františek", "ivan", "ivo", "jakub", "jan", "jaromír",
    "jaroslav", "jindřich", "jiří", "josef", "kamil", "karel", "ladislav", "libor", "lubomír",
    "luboš", "lukáš", "marek", "martin", "matěj", "michal", "milan", "miloslav", "miroslav",
    "oldřich", "ondřej", "patrik", "pavel", "petr", "radek", "richard", "robert", "roman",
    "rostislav", "stanislav", "šimon", "štěpán", "tomáš", "vladimír", "vlastimil", "václav",
    "vít", "vojtěch", "zbyněk", "zdeněk",
];

fn main() -> name_rnn::Result<()> {
    tracing_subscriber::fmt::init();
    println!("=== 男性名字生成（字符级 RNN）===\n");
    let start_time = Instant::now();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // ========== 1. 配置与语料 ==========
    let mut config = match args.get(1) {
        Some(path) => NameRnnConfig::from_json_file(path)?,
        None => NameRnnConfig::default(),
    };
    if args.get(1).is_none() {
        config.train.epochs = 300;
        config.train.log_every = 50;
    }

    let names: Vec<String> = match args.first() {
        Some(path) => {
            let options = CorpusOptions {
                count_column: Some(1),
                min_count: 1,
                has_header: true,
                ..CorpusOptions::default()
            };
            load_names(path, &options)?
        }
        None => BUILTIN_NAMES.iter().map(|s| s.to_string()).collect(),
    };
    let alphabet = Alphabet::male_names();
    println!("[1/3] 语料: {} 个名字, 字母表大小 V = {}", names.len(), alphabet.len());

    // ========== 2. 训练 ==========
    let batch = config.prepare_batch(&names, &alphabet)?;
    let mut model = config.build_model(&alphabet)?;
    let mut trainer = Trainer::new(config.train.clone())?;
    println!(
        "\n[2/3] 训练: H = {}, T = {}, 轮数 = {}",
        model.hidden_size(),
        batch.seq_len(),
        config.train.epochs
    );
    let report = trainer.fit(&mut model, &batch)?;
    if let Some(loss) = report.final_loss() {
        println!("  最终损失: {loss:.4}");
    }

    // ========== 3. 生成 ==========
    println!("\n[3/3] 生成");
    let greedy_config = name_rnn::GenerateConfig {
        strategy: Strategy::Greedy,
        ..config.generate
    };
    let greedy = Generator::new(&model, &alphabet, greedy_config)?;
    for prefix in ["j", "m", "p", "v", "to"] {
        let result = greedy.greedy(prefix)?;
        println!("  贪心 {prefix:>3} -> {}", result.text);
    }

    let sampler = Generator::new(&model, &alphabet, config.generate)?;
    let mut rng = StdRng::seed_from_u64(config.train.seed);
    for result in sampler.generate_many("", 10, &mut rng)? {
        let mark = if result.terminated { "" } else { " (截断)" };
        println!("  采样 {}{mark}", result.text);
    }

    println!("\n总耗时: {:.2}s", start_time.elapsed().as_secs_f32());
    Ok(())
}

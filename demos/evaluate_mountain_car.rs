use std::error::Error;

use gym_rs::utils::renderer::RenderMode;
use tabular_q::{eval::Evaluator, gym::MountainCar};

const MODEL_PATH: &str = "models/q_table_trained.json";
const NUM_EPISODES: u32 = 5;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .init();

    let mut env = MountainCar::new(RenderMode::Human);
    let metrics = Evaluator::default().evaluate_file(MODEL_PATH, &mut env, NUM_EPISODES)?;

    println!(
        "Success rate: {}/{} ({:.1}%)",
        metrics.success_count(),
        metrics.n_episodes(),
        metrics.success_rate() * 100.0
    );

    Ok(())
}

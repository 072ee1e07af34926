use std::error::Error;

use gym_rs::utils::renderer::RenderMode;
use tabular_q::{env::Environment, eval::GOAL_POSITION, gym::MountainCar};

const NUM_EPISODES: u32 = 3;

/// Baseline for comparison: a uniformly random policy rarely reaches the flag
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let mut env = MountainCar::new(RenderMode::Human);
    let result = (1..=NUM_EPISODES).try_for_each(|episode| random_episode(&mut env, episode));
    env.close();

    Ok(result?)
}

fn random_episode(env: &mut MountainCar, episode: u32) -> tabular_q::Result<()> {
    let (state, _) = env.reset()?;
    let mut max_position = state[0];
    let mut total_reward = 0.0;
    let mut steps = 0;

    loop {
        let step = env.step(env.random_action())?;
        max_position = max_position.max(step.observation[0]);
        total_reward += step.reward;
        steps += 1;
        if step.is_done() {
            break;
        }
    }

    if max_position >= GOAL_POSITION {
        println!("Episode {episode}: reached goal in {steps} steps (lucky!)");
    } else {
        println!("Episode {episode}: failed, max position {max_position:.3}, steps {steps}");
    }
    println!("Total reward: {total_reward:.1}");
    Ok(())
}

use std::error::Error;

use gym_rs::utils::renderer::RenderMode;
use tabular_q::{
    algo::{QTableAgent, QTableAgentConfig},
    gym::MountainCar,
    train::{Trainer, TrainerConfig},
};

const NUM_EPISODES: u32 = 5000;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let mut env = MountainCar::new(RenderMode::None);
    let mut agent = QTableAgent::new(QTableAgentConfig::default())?;
    let trainer = Trainer::new(TrainerConfig {
        episodes: NUM_EPISODES,
        ..Default::default()
    });

    trainer.train(&mut agent, &mut env)?;

    Ok(())
}

//! Example: Random agent playing wikicat
//!
//! Usage: `wikicat_random [dataset.csv] [episodes] [min_occurrences]`.
//! Without arguments the bundled sample dataset is used.

use std::path::PathBuf;
use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;
use wikicat_agent::RandomAgent;
use wikicat_env::{Dataset, SessionBatch, WikicatEnv, WikicatSession, DEFAULT_MIN_OCCURRENCES};
use wikicat_rl_core::{
    Agent, DiscreteSpace, Environment, EnvironmentConfig, TrackedEnvironment, Trajectory,
    Transition, VectorObservation,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let (path, default_min) = match args.next() {
        Some(path) => (PathBuf::from(path), DEFAULT_MIN_OCCURRENCES),
        None => (
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/musicians_sample.csv"),
            0,
        ),
    };
    let num_episodes: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(10);
    let min_occurrences: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(default_min);

    let dataset = Arc::new(Dataset::load(&path, min_occurrences).await?);
    println!(
        "Loaded {} musicians, {} attributes, {} categories",
        dataset.len(),
        dataset.attribute_names().len(),
        dataset.category_names().len()
    );
    let action_names = dataset.action_names();

    // Interactive sessions, one musician at a time
    let config = EnvironmentConfig {
        seed: Some(7),
        max_steps: Some(12),
        ..EnvironmentConfig::default()
    };
    let session = WikicatSession::new(Arc::clone(&dataset), &config)?;
    let mut env = TrackedEnvironment::new(session);

    let agent: RandomAgent<VectorObservation> = RandomAgent::new(DiscreteSpace::new(action_names.len()));
    let gamma = agent.config().gamma;
    let mut episode_rewards = Vec::new();

    for episode in 0..num_episodes {
        let (mut observation, info) = env.reset().await?;
        let mut trajectory = Trajectory::new(format!("episode-{episode}"));

        loop {
            let action = agent.act(&observation).await?;
            let step = env.step(action).await?;

            trajectory.push(Transition {
                observation: observation.clone(),
                action,
                reward: step.reward,
                next_observation: step.observation.clone(),
                done: step.done,
                next_state: step.state.clone(),
            });

            if step.done || step.truncated {
                break;
            }
            observation = step.observation;
        }

        let asked: Vec<&str> = trajectory
            .transitions
            .iter()
            .map(|t| action_names[t.action.0].as_str())
            .collect();
        println!(
            "Episode {}: {} | Total Reward = {:.2}, Return = {:.2}, Steps = {}",
            episode + 1,
            info.fields.get("musician").and_then(|v| v.as_str()).unwrap_or("?"),
            trajectory.total_reward,
            trajectory.returns(gamma).first().copied().unwrap_or(0.0),
            trajectory.len()
        );
        println!("  asked: {}", asked.join(", "));
        episode_rewards.push(trajectory.total_reward);
    }

    #[allow(clippy::cast_precision_loss)]
    let avg_reward: f64 = episode_rewards.iter().sum::<f64>() / episode_rewards.len().max(1) as f64;
    println!("\nAverage Reward over {num_episodes} episodes: {avg_reward:.2}");
    env.close().await?;

    // Batched rollout over a random batch of musicians
    let mut batched = WikicatEnv::from_config(&config)?;
    let mut rng = StdRng::seed_from_u64(7);
    batched.load_random_batch(&dataset, 8, &mut rng)?;

    let space = DiscreteSpace::new(batched.n_actions());
    let batch = SessionBatch::record(&batched, 12, |_, state| {
        (0..state.nrows()).map(|_| space.sample_with(&mut rng).0).collect()
    })?;
    println!(
        "Batched rollout: mean session reward = {:.2}",
        batch.total_rewards().mean().unwrap_or(0.0)
    );

    Ok(())
}


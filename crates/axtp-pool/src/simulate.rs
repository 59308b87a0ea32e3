//! Concurrent agent simulation used by `axtp simulate`.
//!
//! Spawns one tokio task per agent against a [`SharedPool`]. Each agent
//! queries the pool before every task, confirms the best peer record it
//! finds, and deposits its own result.

use axtp_core::{OutcomeStatus, RecordBuilder, ValidationType};

use crate::shared::SharedPool;
use crate::types::{PoolStats, RetrieveQuery};

const TASK_TYPES: [&str; 4] = [
    "api.integration.stripe.subscriptions",
    "api.integration.github.webhooks",
    "data.etl.csv",
    "infra.deploy.kubernetes",
];

/// Simulation size.
#[derive(Debug, Clone, Copy)]
pub struct SimulationPlan {
    pub agents: usize,
    pub records_per_agent: usize,
}

/// Run the plan to completion, refresh all scores, and return pool stats.
pub async fn run_simulation(pool: &SharedPool, plan: SimulationPlan) -> PoolStats {
    let mut handles = Vec::with_capacity(plan.agents);

    for agent in 0..plan.agents {
        let pool = pool.clone();
        let handle = tokio::spawn(async move {
            run_agent(pool, agent, plan.records_per_agent).await;
        });
        handles.push(handle);
    }

    tracing::info!(agents = handles.len(), "Simulation started");

    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Simulated agent task panicked");
        }
    }

    pool.refresh_scores("simulator").await;
    pool.inspect().await
}

/// One agent's loop: retrieve, confirm a peer, deposit.
async fn run_agent(pool: SharedPool, agent: usize, records: usize) {
    let agent_id = format!("agent-{agent:02}");

    for i in 0..records {
        let task_type = TASK_TYPES[(agent + i) % TASK_TYPES.len()];
        let outcome = simulated_outcome(agent, i);

        let prior = pool
            .retrieve(&RetrieveQuery {
                max_results: 3,
                ..RetrieveQuery::for_task(task_type, &agent_id)
            })
            .await;

        let mut builder = RecordBuilder::new(&agent_id, task_type, outcome);
        builder.set_objective(&format!("Simulated {task_type} run #{i}"));
        let duration_ms = 100 + (i as u64 % 5) * 50;
        builder.add_step(
            "execute",
            "simulated work",
            None,
            duration_ms,
            outcome == OutcomeStatus::Success,
        );

        if let Some(best) = prior.first() {
            builder.set_parent(best.record_id);
            let verdict = if outcome == best.outcome_status {
                ValidationType::Confirm
            } else {
                ValidationType::Dispute
            };
            // Own records come back too and are refused as self-validation.
            if let Err(e) = pool
                .validate(best.record_id, &agent_id, verdict, "simulated reproduction")
                .await
            {
                tracing::debug!(agent_id = %agent_id, error = %e, "Validation skipped");
            }
        }

        if let Err(e) = pool.deposit(builder.finish()).await {
            tracing::warn!(agent_id = %agent_id, error = %e, "Simulated deposit failed");
        }
    }

    tracing::debug!(agent_id = %agent_id, records, "Simulated agent finished");
}

/// Deterministic outcome mix: mostly successes, some partials and failures.
fn simulated_outcome(agent: usize, i: usize) -> OutcomeStatus {
    match (agent * 7 + i * 3) % 10 {
        0 | 1 => OutcomeStatus::Failure,
        2 => OutcomeStatus::PartialSuccess,
        _ => OutcomeStatus::Success,
    }
}

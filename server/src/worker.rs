use crate::api::AppState;

/// Runs a parse job to completion and records the outcome on the job store.
pub async fn process(state: std::sync::Arc<AppState>, demo_id: String) {
    match run(&state, &demo_id).await {
        Ok(()) => {
            state.jobs.mark_ready(&demo_id);
        }
        Err(err) => {
            tracing::error!("Parsing demo {}: {}", demo_id, err);
            state.jobs.mark_error(&demo_id, err);
        }
    }
}

async fn run(state: &std::sync::Arc<AppState>, demo_id: &str) -> Result<(), String> {
    let data = state.storage.load(demo_id.to_string()).await?;

    let progress_state = state.clone();
    let config = state.collect.clone();
    let job_id = demo_id.to_string();
    let mut parsed = tokio::task::spawn_blocking(move || {
        let engine = collector::replay::ReplayEngine::new(data.data());
        collector::collect(engine, job_id.clone(), config, |progress| {
            progress_state.jobs.set_progress(&job_id, progress)
        })
        .map_err(|err| err.to_string())
    })
    .await
    .map_err(|err| format!("Collect task died: {}", err))??;

    parsed.map_config = state.maps.get(&parsed.map).cloned();

    let content = serde_json::to_vec(&parsed).map_err(|err| format!("Encoding match: {}", err))?;
    let target = state.match_dir.join(format!("{}.json", demo_id));
    tokio::fs::write(&target, content)
        .await
        .map_err(|err| format!("Writing {}: {}", target.display(), err))?;

    // The raw upload is only needed for parsing, the match document is the
    // artifact we keep.
    if let Err(err) = state.storage.remove(demo_id.to_string()).await {
        tracing::warn!("Keeping uploaded demo {}: {}", demo_id, err);
    }

    tracing::info!(demo_id, rounds = parsed.rounds.len(), "demo parsed");

    Ok(())
}

//! Turns a demo engine's event stream into the match document served to the
//! replay viewer: per-round snapshots, kills and correlated grenades.

pub mod assemble;
pub mod engine;
pub mod grenades;
pub mod replay;
pub mod round;
pub mod trajectory;

pub use engine::{DemoEngine, DemoEvent, EngineError, EngineState};
pub use round::{Config, RoundCollector};

/// Drives an engine to the end of its stream and assembles the match.
///
/// Progress is reported after every world frame. A stream that breaks off
/// mid write is not an error, the rounds collected up to that point are
/// kept.
#[tracing::instrument(skip(engine, config, on_progress))]
pub fn collect<E>(
    mut engine: E,
    id: String,
    config: Config,
    mut on_progress: impl FnMut(f32),
) -> Result<model::Match, EngineError>
where
    E: DemoEngine,
{
    let mut collector = RoundCollector::new(config);
    loop {
        match engine.next_event() {
            Ok(Some(event)) => {
                let is_frame = matches!(event, DemoEvent::FrameAdvance);
                collector.handle(&event, engine.state());
                if is_frame {
                    on_progress(engine.progress());
                }
            }
            Ok(None) => break,
            Err(EngineError::UnexpectedEndOfStream) => {
                tracing::warn!("stream cut off early, keeping the partial result");
                break;
            }
            Err(err) => return Err(err),
        }
    }

    let rounds = collector.finish();
    tracing::debug!(rounds = rounds.len(), "collection done");
    Ok(assemble::build_match(
        id,
        engine.map_name(),
        rounds,
        engine.state(),
    ))
}

use std::process::ExitCode;

use fregg_engine::{HintView, Session, TickOutcome, WorldEvent};
use tracing::{debug, error, info};

use super::bootstrap::AppWiring;
use super::input_tape::InputTape;
use super::AppError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) frames: u64,
    pub(crate) levels_completed: u32,
    pub(crate) resets: u32,
    pub(crate) final_level: usize,
    pub(crate) events: u64,
}

pub(crate) fn run(mut app: AppWiring) -> ExitCode {
    match drive(&mut app.session, &app.tape, app.config.frames) {
        Ok(summary) => {
            info!(
                frames = summary.frames,
                levels_completed = summary.levels_completed,
                resets = summary.resets,
                final_level = summary.final_level,
                events = summary.events,
                "run_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run_failed");
            ExitCode::FAILURE
        }
    }
}

/// Fixed-step headless loop: one session tick per tape frame.
pub(crate) fn drive(
    session: &mut Session,
    tape: &InputTape,
    frames: u64,
) -> Result<RunSummary, AppError> {
    let mut summary = RunSummary::default();
    let mut last_hint: Option<HintView> = None;

    for frame in 0..frames {
        let (buttons, click) = tape.at(frame);
        match session.tick(buttons, click)? {
            TickOutcome::Running => {}
            TickOutcome::Reset => summary.resets += 1,
            TickOutcome::Completed => {
                summary.levels_completed += 1;
                let is_last = session.level_index() + 1 >= session.level_count();
                info!(level = session.level_index(), frame, is_last, "level_finished");
            }
            TickOutcome::Advanced(level) => info!(level, frame, "level_started"),
        }

        for event in session.drain_events() {
            summary.events += 1;
            log_event(frame, &event);
        }

        let hint = &session.world().overlay().hint;
        if let Some(view) = hint.as_ref().filter(|view| view.complete) {
            if last_hint.as_ref() != Some(view) {
                debug!(frame, text = view.text.as_str(), prompt = view.prompt, "hint");
            }
        }
        last_hint = hint.clone();
        summary.frames += 1;
    }

    summary.final_level = session.level_index();
    Ok(summary)
}

fn log_event(frame: u64, event: &WorldEvent) {
    match event {
        WorldEvent::Sound(cue) => debug!(frame, cue = ?cue, "sound_cue"),
        WorldEvent::Focus { x, y } => debug!(frame, x, y, "camera_focus"),
        WorldEvent::Unfocus => debug!(frame, "camera_unfocus"),
        WorldEvent::LevelCompleted => debug!(frame, "level_completed_cue"),
    }
}

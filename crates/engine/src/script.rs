//! Frame-driven tutorial scripts.
//!
//! A script is a flat function replayed from the top on every frame. The
//! cursor numbers each gating call in order of appearance and lets exactly one
//! of them, the live step, evaluate its condition. Steps before it replay as
//! satisfied, steps after it report unsatisfied without evaluating anything.
//! There is no suspension: restarting a script means building a new cursor.

use std::cmp::Ordering;

use crate::input::{Button, InputState};
use crate::world::World;

/// Frames per revealed hint character.
pub const FRAMES_PER_CHARACTER: u32 = 5;
/// Frames a fully revealed hint stays up before it may be dismissed or expire.
pub const CONTINUE_TIMEOUT: u32 = 35;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptCursor {
    current_step: u32,
    elapsed_time: u32,
    step_offset: u32,
    next_step: u32,
    advanced_slot: Option<u32>,
}

impl ScriptCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn elapsed_time(&self) -> u32 {
        self.elapsed_time
    }

    pub fn begin_frame(&mut self) {
        self.step_offset = 0;
        self.next_step = self.current_step;
        self.advanced_slot = None;
    }

    pub fn end_frame(&mut self) {
        self.current_step = self.next_step;
        self.elapsed_time = self.elapsed_time.saturating_add(1);
    }

    /// The one real primitive. `condition` runs only when this call is the
    /// live step.
    pub fn wait_until(&mut self, condition: impl FnOnce() -> bool) -> bool {
        let slot = self.step_offset;
        self.step_offset += 1;
        match slot.cmp(&self.current_step) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => {
                if !condition() {
                    return false;
                }
                self.next_step = self.current_step + 1;
                self.elapsed_time = 0;
                self.advanced_slot = Some(slot);
                true
            }
        }
    }

    pub fn next(&mut self) -> bool {
        self.wait_until(|| true)
    }

    pub fn wait(&mut self, duration: u32) -> bool {
        let elapsed = self.elapsed_time;
        self.wait_until(|| elapsed >= duration)
    }

    /// Makes the next gating call share the slot of the previous one.
    pub fn or(&mut self) {
        debug_assert!(self.step_offset > 0, "or() before any gating call");
        self.step_offset = self.step_offset.saturating_sub(1);
    }

    /// True while the step following the last gating call is live, or for any
    /// later step too when `forever` is set.
    pub fn effect(&self, forever: bool) -> bool {
        self.current_step == self.step_offset
            || (forever && self.current_step > self.step_offset)
    }

    /// True only on the frame the last consumed slot advanced the cursor.
    ///
    /// Completed steps replay as satisfied on every later frame; one-shot side
    /// effects gate on this instead of the replayed result.
    pub fn arrived(&self) -> bool {
        match self.step_offset.checked_sub(1) {
            Some(slot) => self.advanced_slot == Some(slot),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintView {
    pub text: String,
    pub complete: bool,
    pub prompt: bool,
    pub dim: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintStyle {
    /// Wait for button 1 or a click instead of expiring.
    pub wait_for_key: bool,
    /// Extra frames before an expiring hint moves on.
    pub extra_frames: u32,
    pub dim: bool,
}

impl HintStyle {
    pub const PROMPT: HintStyle = HintStyle {
        wait_for_key: true,
        extra_frames: 0,
        dim: false,
    };

    pub const fn timed(extra_frames: u32) -> Self {
        Self {
            wait_for_key: false,
            extra_frames,
            dim: false,
        }
    }

    pub const fn dimmed(self) -> Self {
        Self { dim: true, ..self }
    }
}

impl Default for HintStyle {
    fn default() -> Self {
        Self::PROMPT
    }
}

/// One frame of script evaluation: the cursor plus this frame's input.
pub struct ScriptFrame<'a> {
    cursor: &'a mut ScriptCursor,
    input: &'a InputState,
    hint: Option<HintView>,
}

impl<'a> ScriptFrame<'a> {
    pub fn new(cursor: &'a mut ScriptCursor, input: &'a InputState) -> Self {
        Self {
            cursor,
            input,
            hint: None,
        }
    }

    pub fn elapsed_time(&self) -> u32 {
        self.cursor.elapsed_time()
    }

    pub fn wait_until(&mut self, condition: impl FnOnce() -> bool) -> bool {
        self.cursor.wait_until(condition)
    }

    pub fn next(&mut self) -> bool {
        self.cursor.next()
    }

    pub fn wait(&mut self, duration: u32) -> bool {
        self.cursor.wait(duration)
    }

    pub fn or(&mut self) {
        self.cursor.or();
    }

    pub fn effect(&self, forever: bool) -> bool {
        self.cursor.effect(forever)
    }

    pub fn arrived(&self) -> bool {
        self.cursor.arrived()
    }

    pub fn wait_for_button(&mut self, button: Button) -> bool {
        let input = self.input;
        self.cursor.wait_until(|| input.pressed(button))
    }

    pub fn wait_for_click(&mut self) -> bool {
        let input = self.input;
        self.cursor.wait_until(|| input.clicked())
    }

    /// Typewriter hint. Reveals `text` one character per
    /// `FRAMES_PER_CHARACTER` frames, then either waits for button 1 or a
    /// click or expires on its own. Occupies four steps with a key, three
    /// without; the result is that of the final step.
    pub fn show_hint(&mut self, text: &str, style: HintStyle) -> bool {
        let length = text.chars().count() as u32;

        self.next();
        if self.effect(false) {
            let shown = (self.elapsed_time() / FRAMES_PER_CHARACTER) as usize;
            self.publish(HintView {
                text: text.chars().take(shown).collect(),
                complete: false,
                prompt: false,
                dim: style.dim,
            });
        }

        let reveal = length * FRAMES_PER_CHARACTER + CONTINUE_TIMEOUT;
        if style.wait_for_key {
            self.wait(reveal);
            self.or();
            self.wait_for_button(Button::Primary);
            self.or();
            self.wait_for_click();
        } else {
            self.wait(reveal + style.extra_frames);
        }
        if self.effect(false) {
            self.publish(HintView {
                text: text.to_string(),
                complete: true,
                prompt: style.wait_for_key,
                dim: style.dim,
            });
        }

        if style.wait_for_key {
            self.wait_for_button(Button::Primary);
            self.or();
            self.wait_for_click();
        }
        self.next()
    }

    fn publish(&mut self, hint: HintView) {
        self.hint = Some(hint);
    }

    pub fn into_hint(self) -> Option<HintView> {
        self.hint
    }
}

/// A level's tutorial body, replayed in full every frame.
pub trait LevelScript {
    fn run(&mut self, frame: &mut ScriptFrame<'_>, world: &mut World);
}

pub struct ScriptRunner {
    cursor: ScriptCursor,
    script: Box<dyn LevelScript>,
    enabled: bool,
}

impl ScriptRunner {
    pub fn new(script: Box<dyn LevelScript>, enabled: bool) -> Self {
        Self {
            cursor: ScriptCursor::new(),
            script,
            enabled,
        }
    }

    pub fn cursor(&self) -> &ScriptCursor {
        &self.cursor
    }

    pub fn update(&mut self, world: &mut World, input: &InputState) {
        self.cursor.begin_frame();
        world.clear_overlay();
        let hint = if self.enabled {
            let mut frame = ScriptFrame::new(&mut self.cursor, input);
            self.script.run(&mut frame, world);
            frame.into_hint()
        } else {
            None
        };
        world.set_hint(hint);
        self.cursor.end_frame();
    }
}

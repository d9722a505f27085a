use thiserror::Error;
use tracing::info;

use crate::input::{Button, ButtonSet, InputState};
use crate::level::{Level, LevelPack};
use crate::script::{LevelScript, ScriptRunner};
use crate::world::{World, WorldEvent, WorldState};

/// Builds the tutorial script a level names.
pub trait ScriptFactory {
    fn create(&self, id: &str) -> Option<Box<dyn LevelScript>>;
}

impl<F> ScriptFactory for F
where
    F: Fn(&str) -> Option<Box<dyn LevelScript>>,
{
    fn create(&self, id: &str) -> Option<Box<dyn LevelScript>> {
        self(id)
    }
}

/// Factory for packs without tutorial scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScripts;

impl ScriptFactory for NoScripts {
    fn create(&self, _id: &str) -> Option<Box<dyn LevelScript>> {
        None
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("level index {index} is out of range for a pack of {count}")]
    UnknownLevel { index: usize, count: usize },
    #[error("level {level} names unknown script {script:?}")]
    UnknownScript { level: String, script: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// The level was reloaded after a held reset.
    Reset,
    /// The level finished on this tick.
    Completed,
    /// A continue press on a finished level loaded the level at this index.
    Advanced(usize),
}

/// Drives one level pack: owns the world, the active script and input edges.
pub struct Session {
    pack: LevelPack,
    scripts: Box<dyn ScriptFactory>,
    world: World,
    runner: Option<ScriptRunner>,
    input: InputState,
    level_index: usize,
    tutorials_enabled: bool,
    completed: bool,
}

impl Session {
    /// Creates a session positioned on `start_level`.
    pub fn new(
        pack: LevelPack,
        scripts: impl ScriptFactory + 'static,
        tutorials_enabled: bool,
        start_level: usize,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            pack,
            scripts: Box::new(scripts),
            world: World::new(),
            runner: None,
            input: InputState::new(),
            level_index: start_level,
            tutorials_enabled,
            completed: false,
        };
        session.load_level(start_level)?;
        Ok(session)
    }

    /// Rebuilds the world and a fresh script cursor from level data.
    pub fn load_level(&mut self, index: usize) -> Result<(), SessionError> {
        let level = self.pack.get(index).ok_or(SessionError::UnknownLevel {
            index,
            count: self.pack.len(),
        })?;
        let runner = self.build_runner(level)?;
        self.world.load(level);
        self.runner = runner;
        self.level_index = index;
        self.completed = false;
        Ok(())
    }

    fn build_runner(&self, level: &Level) -> Result<Option<ScriptRunner>, SessionError> {
        let Some(id) = level.script.as_deref() else {
            return Ok(None);
        };
        let script = self
            .scripts
            .create(id)
            .ok_or_else(|| SessionError::UnknownScript {
                level: level.name.clone(),
                script: id.to_string(),
            })?;
        Ok(Some(ScriptRunner::new(script, self.tutorials_enabled)))
    }

    /// Loads the following level. Returns `false` on the last level.
    pub fn next_level(&mut self) -> Result<bool, SessionError> {
        let next = self.level_index + 1;
        if next >= self.pack.len() {
            return Ok(false);
        }
        self.load_level(next)?;
        Ok(true)
    }

    /// One fixed-rate frame: input edges, then the level script, then bodies.
    /// Once a level is finished, button 1 or a click moves on to the next one.
    /// World cues accumulate until [`Session::drain_events`] is called.
    pub fn tick(&mut self, buttons: ButtonSet, click: bool) -> Result<TickOutcome, SessionError> {
        self.input.advance(buttons, click);
        let continue_pressed = self.input.pressed(Button::Primary) || self.input.clicked();
        match &mut self.runner {
            Some(runner) => runner.update(&mut self.world, &self.input),
            None => self.world.clear_overlay(),
        }
        self.world.update(&self.input);

        if self.world.take_reset_request() {
            let name = self.level().map(|level| level.name.clone()).unwrap_or_default();
            info!(level = %name, frame = self.world.frame(), "level_reset");
            self.load_level(self.level_index)?;
            return Ok(TickOutcome::Reset);
        }
        if !self.completed && self.world.state() == WorldState::LevelCompleted {
            self.completed = true;
            return Ok(TickOutcome::Completed);
        }
        if self.completed && continue_pressed && self.next_level()? {
            return Ok(TickOutcome::Advanced(self.level_index));
        }
        Ok(TickOutcome::Running)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn runner(&self) -> Option<&ScriptRunner> {
        self.runner.as_ref()
    }

    pub fn level(&self) -> Option<&Level> {
        self.pack.get(self.level_index)
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_count(&self) -> usize {
        self.pack.len()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        self.world.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{HintStyle, ScriptCursor, ScriptFrame};
    use crate::world::CharacterState;

    fn pack(levels: &[(&str, u32, &str, Option<&str>)]) -> LevelPack {
        let levels = levels
            .iter()
            .map(|(name, eggs, layout, script)| {
                let level = Level::parse(*name, *eggs, layout).expect("layout");
                match script {
                    Some(id) => level.with_script(*id),
                    None => level,
                }
            })
            .collect();
        LevelPack::new(levels).expect("pack")
    }

    /// Sleeps and pauses, shows a timed hint, then wakes and resumes.
    struct Nap;

    impl LevelScript for Nap {
        fn run(&mut self, frame: &mut ScriptFrame<'_>, world: &mut World) {
            if frame.next() && frame.arrived() {
                world.pause();
                world.sleep_primary();
            }
            frame.show_hint("Zz", HintStyle::timed(0));
            if frame.next() && frame.arrived() {
                world.wake_primary();
                world.resume();
            }
        }
    }

    fn nap_factory(id: &str) -> Option<Box<dyn LevelScript>> {
        (id == "nap").then(|| Box::new(Nap) as Box<dyn LevelScript>)
    }

    fn buttons(list: &[Button]) -> ButtonSet {
        list.iter().copied().collect()
    }

    #[test]
    fn script_runs_before_bodies_and_drives_the_world() {
        let levels = pack(&[("nap", 0, "*...\n####", Some("nap"))]);
        let mut session = Session::new(levels, nap_factory, true, 0).expect("session");

        session.tick(ButtonSet::empty(), false).expect("tick");
        assert_eq!(session.world().state(), WorldState::Paused);
        assert_eq!(
            session.world().primary().expect("primary").state(),
            CharacterState::Sleeping
        );
        assert!(session.world().overlay().hint.is_none());

        session.tick(ButtonSet::empty(), false).expect("tick");
        session.tick(ButtonSet::empty(), false).expect("tick");
        let hint = session.world().overlay().hint.clone().expect("hint");
        assert_eq!(hint.text, "");
        assert!(!hint.complete);

        for _ in 0..60 {
            session.tick(ButtonSet::empty(), false).expect("tick");
        }
        assert_eq!(session.world().state(), WorldState::Playing);
        assert!(session.world().overlay().hint.is_none());
        assert_eq!(
            session.world().primary().expect("primary").state(),
            CharacterState::Idle
        );
    }

    #[test]
    fn disabled_tutorials_leave_the_world_alone() {
        let levels = pack(&[("nap", 0, "*...\n####", Some("nap"))]);
        let mut session = Session::new(levels, nap_factory, false, 0).expect("session");
        session.tick(ButtonSet::empty(), false).expect("tick");
        assert_eq!(session.world().state(), WorldState::Playing);
        assert!(session.world().overlay().hint.is_none());
        assert_eq!(session.runner().expect("runner").cursor().elapsed_time(), 1);
    }

    #[test]
    fn unknown_script_and_level_are_errors() {
        let levels = pack(&[("odd", 0, "*.\n##", Some("missing"))]);
        assert_eq!(
            Session::new(levels, NoScripts, true, 0).err(),
            Some(SessionError::UnknownScript {
                level: "odd".to_string(),
                script: "missing".to_string()
            })
        );

        let levels = pack(&[("one", 0, "*.\n##", None)]);
        assert_eq!(
            Session::new(levels, NoScripts, true, 3).err(),
            Some(SessionError::UnknownLevel { index: 3, count: 1 })
        );
    }

    #[test]
    fn reloading_matches_a_fresh_load() {
        let layout = "....\n*...\n&###";
        let levels = pack(&[("nest", 1, layout, Some("nap"))]);
        let fresh = Session::new(levels.clone(), nap_factory, true, 0).expect("fresh");

        let mut played = Session::new(levels, nap_factory, true, 0).expect("played");
        for frame in 0..200 {
            let down = if frame % 2 == 0 { buttons(&[Button::Primary]) } else { buttons(&[]) };
            played.tick(down, false).expect("tick");
        }
        played.load_level(0).expect("reload");

        let summary = |session: &Session| {
            let world = session.world();
            let bodies: Vec<_> = world
                .characters()
                .iter()
                .map(|character| (character.body.x, character.body.y, character.state()))
                .collect();
            (bodies, world.eggs_left(), world.placed_egg(), world.state())
        };
        assert_eq!(summary(&played), summary(&fresh));
        assert_eq!(
            played.runner().expect("runner").cursor(),
            &ScriptCursor::new()
        );
        assert!(!played.is_completed());
    }

    #[test]
    fn held_reset_reloads_the_level() {
        let levels = pack(&[("hold", 0, "*...\n####", None)]);
        let mut session = Session::new(levels, NoScripts, true, 0).expect("session");
        session.tick(ButtonSet::empty(), false).expect("idle");
        session.tick(buttons(&[Button::Right]), false).expect("walk");
        assert!(session.world().primary().expect("primary").body.x > 8.0);

        let mut outcome = TickOutcome::Running;
        for _ in 0..=crate::world::RESET_HOLD_FRAMES {
            outcome = session.tick(buttons(&[Button::Primary]), false).expect("hold");
        }
        assert_eq!(outcome, TickOutcome::Reset);
        assert_eq!(session.world().primary().expect("primary").body.x, 8.0);
    }

    #[test]
    fn completion_is_reported_once_and_next_level_advances() {
        let levels = pack(&[("a", 0, "*@\n##", None), ("b", 0, "*.@\n###", None)]);
        let mut session = Session::new(levels, NoScripts, true, 0).expect("session");

        let mut completions = 0;
        for _ in 0..40 {
            let outcome = session.tick(buttons(&[Button::Right]), false).expect("tick");
            if outcome == TickOutcome::Completed {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert!(session.is_completed());

        assert_eq!(
            session.tick(buttons(&[Button::Primary]), false).expect("continue"),
            TickOutcome::Advanced(1)
        );
        assert_eq!(session.level_index(), 1);
        assert!(!session.is_completed());
        assert_eq!(session.world().state(), WorldState::Playing);
        assert!(!session.next_level().expect("last"));
        assert_eq!(session.level_count(), 2);
    }
}

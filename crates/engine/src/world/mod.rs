//! The simulation owner: tile grid, characters, the egg, camera focus and the
//! world state machine. Everything the core wants the outside to do (sounds,
//! camera moves) is queued as a [`WorldEvent`] and drained by the host.

mod camera;
mod character;
mod egg;

use tracing::{debug, info};

use crate::body::{PhysicsEnv, WorldBorder};
use crate::fsm::{StateHook, StateMachine, TransitionTable};
use crate::input::{Button, InputState};
use crate::level::Level;
use crate::script::HintView;
use crate::tiles::{TileGrid, TileKind, TILE_SIZE};

pub use camera::{Camera, Focus, CAMERA_FOLLOW_THRESHOLD, SCREEN_SIZE};
pub use character::{Character, CharacterState, JUMP_POWER, SPEED};
pub use egg::Egg;

/// Frames button 1 must stay held before a level resets.
pub const RESET_HOLD_FRAMES: u32 = 180;
/// Headroom above the grid, in tiles, that bodies may jump into.
pub const WORLD_TOP_MARGIN_TILES: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldState {
    Playing,
    Paused,
    LevelCompleted,
}

static WORLD_TRANSITIONS: TransitionTable<WorldState> = TransitionTable::new(&[
    (
        WorldState::Playing,
        &[WorldState::Paused, WorldState::LevelCompleted],
    ),
    (WorldState::Paused, &[WorldState::Playing]),
    (WorldState::LevelCompleted, &[WorldState::Playing]),
]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Jump,
    Land,
    Step,
    LayEgg,
    Hatch,
    LevelCompleted,
    Chime,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    Sound(SoundCue),
    Focus { x: f32, y: f32 },
    Unfocus,
    LevelCompleted,
}

/// Full-screen cover a script can draw over the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curtain {
    Light,
    Dark,
    TitleCard { thanks: bool },
}

/// Per-frame presentation state published by scripts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub hint: Option<HintView>,
    pub curtain: Option<Curtain>,
}

struct WorldCues<'a> {
    events: &'a mut Vec<WorldEvent>,
    frame: u64,
    state_changed_at: &'a mut u64,
}

impl StateHook<WorldState> for WorldCues<'_> {
    fn on_state_changed(&mut self, new_state: WorldState, old_state: WorldState) {
        *self.state_changed_at = self.frame;
        debug!(from = ?old_state, to = ?new_state, "world_state_changed");
        if new_state == WorldState::LevelCompleted {
            self.events.push(WorldEvent::Sound(SoundCue::LevelCompleted));
            self.events.push(WorldEvent::LevelCompleted);
        }
    }
}

pub struct World {
    machine: StateMachine<WorldState>,
    grid: TileGrid,
    border: WorldBorder,
    doors: Vec<(i32, i32)>,
    characters: Vec<Character>,
    primary: Option<usize>,
    egg: Option<Egg>,
    eggs: u32,
    max_eggs: u32,
    follow_character: usize,
    camera: Camera,
    frame: u64,
    state_changed_at: u64,
    reset_timeout: Option<u32>,
    reset_requested: bool,
    events: Vec<WorldEvent>,
    overlay: Overlay,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            machine: StateMachine::new(WorldState::Playing, &WORLD_TRANSITIONS),
            grid: TileGrid::default(),
            border: WorldBorder::default(),
            doors: Vec::new(),
            characters: Vec::new(),
            primary: None,
            egg: None,
            eggs: 0,
            max_eggs: 0,
            follow_character: 0,
            camera: Camera::default(),
            frame: 0,
            state_changed_at: 0,
            reset_timeout: None,
            reset_requested: false,
            events: Vec::new(),
            overlay: Overlay::default(),
        }
    }

    /// Replaces every level-derived piece of state. The frame counter and
    /// pending events survive.
    pub fn load(&mut self, level: &Level) {
        self.grid = level.grid.clone();
        self.border = WorldBorder {
            left: 0.0,
            right: self.grid.width() as f32 * TILE_SIZE,
            top: -WORLD_TOP_MARGIN_TILES * TILE_SIZE,
            bottom: self.grid.height() as f32 * TILE_SIZE,
        };
        self.eggs = level.eggs;
        self.max_eggs = level.eggs;
        self.egg = None;
        self.follow_character = 0;
        self.reset_timeout = None;
        self.reset_requested = false;
        self.overlay = Overlay::default();
        self.camera.set_focus(None);

        self.characters.clear();
        self.doors.clear();
        for (x, y, kind) in self.grid.cells() {
            match kind {
                TileKind::SpawnPoint => self.characters.push(Character::new(
                    (x as f32 + 0.5) * TILE_SIZE,
                    (y as f32 + 0.5) * TILE_SIZE,
                    true,
                )),
                TileKind::Door => self.doors.push((x, y)),
                _ => {}
            }
        }
        self.primary = (!self.characters.is_empty()).then_some(0);
        if let Some(primary) = self.primary() {
            let (x, y) = (primary.body.x, primary.body.y);
            self.camera.snap_to(x, y);
        }

        self.transition(WorldState::Playing);
        info!(
            level = %level.name,
            characters = self.characters.len(),
            doors = self.doors.len(),
            eggs = self.eggs,
            "level_loaded"
        );
    }

    pub fn state(&self) -> WorldState {
        self.machine.state()
    }

    pub fn physics_enabled(&self) -> bool {
        matches!(self.state(), WorldState::Playing | WorldState::Paused)
    }

    pub fn accepts_input(&self) -> bool {
        self.state() == WorldState::Playing
    }

    pub fn physics_env(&self) -> PhysicsEnv {
        PhysicsEnv {
            enabled: self.physics_enabled(),
            border: self.border,
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn border(&self) -> WorldBorder {
        self.border
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn state_changed_at(&self) -> u64 {
        self.state_changed_at
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn primary(&self) -> Option<&Character> {
        self.primary.and_then(|index| self.characters.get(index))
    }

    pub fn egg(&self) -> Option<&Egg> {
        self.egg.as_ref()
    }

    pub fn placed_egg(&self) -> bool {
        self.egg.is_some()
    }

    pub fn eggs_left(&self) -> u32 {
        self.eggs
    }

    pub fn max_eggs(&self) -> u32 {
        self.max_eggs
    }

    pub fn followed_character(&self) -> usize {
        self.follow_character
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn set_hint(&mut self, hint: Option<HintView>) {
        self.overlay.hint = hint;
    }

    pub fn set_curtain(&mut self, curtain: Curtain) {
        self.overlay.curtain = Some(curtain);
    }

    pub(crate) fn clear_overlay(&mut self) {
        self.overlay = Overlay::default();
    }

    pub fn reset_countdown(&self) -> Option<u32> {
        self.reset_timeout
    }

    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn take_reset_request(&mut self) -> bool {
        std::mem::take(&mut self.reset_requested)
    }

    fn transition(&mut self, target: WorldState) -> bool {
        let mut cues = WorldCues {
            events: &mut self.events,
            frame: self.frame,
            state_changed_at: &mut self.state_changed_at,
        };
        self.machine.set_state(target, &mut cues)
    }

    pub fn pause(&mut self) {
        let paused = self.transition(WorldState::Paused);
        assert!(paused, "world cannot pause from {:?}", self.state());
    }

    pub fn resume(&mut self) {
        let resumed = self.transition(WorldState::Playing);
        assert!(resumed, "world cannot resume from {:?}", self.state());
    }

    pub fn focus(&mut self, x: f32, y: f32) {
        self.camera.set_focus(Some(Focus {
            x,
            y,
            since_frame: self.frame,
        }));
        self.events.push(WorldEvent::Focus { x, y });
    }

    pub fn focus_on_tile(&mut self, tile_x: i32, tile_y: i32) {
        self.focus(
            (tile_x as f32 + 0.5) * TILE_SIZE,
            (tile_y as f32 + 0.5) * TILE_SIZE,
        );
    }

    pub fn focus_on_character(&mut self) {
        let (x, y) = {
            let primary = self
                .primary()
                .expect("focus_on_character needs a primary character");
            (primary.body.x, primary.body.y)
        };
        self.focus(x, y);
    }

    pub fn unfocus(&mut self) {
        self.camera.set_focus(None);
        self.events.push(WorldEvent::Unfocus);
    }

    pub fn play(&mut self, cue: SoundCue) {
        self.events.push(WorldEvent::Sound(cue));
    }

    pub fn sleep_primary(&mut self) {
        let index = self.primary.expect("sleep_primary needs a primary character");
        self.characters[index].sleep(&mut self.events);
    }

    pub fn wake_primary(&mut self) {
        let index = self.primary.expect("wake_primary needs a primary character");
        self.characters[index].wake_up(&mut self.events);
    }

    /// One simulation step for every body, after the level script has run.
    ///
    /// Cues pile up in the event queue until [`World::drain_events`] is called,
    /// so hosts drain it once per tick.
    pub fn update(&mut self, input: &InputState) {
        if self.accepts_input() {
            self.process_input(input);
        }

        let env = self.physics_env();
        if let Some(egg) = &mut self.egg {
            egg.update(&self.grid, &env);
        }
        let character_input = self.accepts_input().then_some(input);
        for character in &mut self.characters {
            character.update(character_input, &self.grid, &env, self.frame, &mut self.events);
        }

        let follow = self
            .characters
            .get(self.follow_character)
            .map(|character| (character.body.x, character.body.y));
        self.camera.step(follow);

        self.frame += 1;

        if self.state() == WorldState::Playing && self.all_doors_occupied() {
            self.transition(WorldState::LevelCompleted);
            info!(frame = self.frame, characters = self.characters.len(), "level_completed");
        }
    }

    fn process_input(&mut self, input: &InputState) {
        if input.pressed(Button::Secondary) && self.characters.len() > 1 {
            let count = self.characters.len();
            self.follow_character = (self.follow_character + count - 1) % count;
            let character = &self.characters[self.follow_character];
            let (x, y) = (character.body.x, character.body.y);
            self.camera.snap_to(x, y);
        }

        let Some(primary_index) = self.primary else {
            return;
        };
        let primary = &self.characters[primary_index];
        let on_nest = primary.tile_below(&self.grid) == TileKind::EggableBlock;
        let can_lay = self.eggs > 0 && on_nest;
        let (primary_x, primary_y) = (primary.body.x, primary.body.y);

        let holding_reset = input.is_down(Button::Primary) && self.egg.is_none() && !can_lay;
        self.reset_timeout = match self.reset_timeout {
            Some(remaining) if holding_reset => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.reset_requested = true;
                    None
                } else {
                    Some(remaining)
                }
            }
            _ => None,
        };

        if !input.pressed(Button::Primary) {
            return;
        }
        match self.egg.take() {
            None if can_lay => {
                self.eggs -= 1;
                self.egg = Some(Egg::new(primary_x, primary_y));
                self.events.push(WorldEvent::Sound(SoundCue::LayEgg));
                debug!(x = primary_x, y = primary_y, eggs_left = self.eggs, "egg_laid");
            }
            None => {
                self.reset_timeout = Some(RESET_HOLD_FRAMES);
            }
            Some(egg) => {
                self.characters
                    .insert(0, Character::new(egg.body.x, egg.body.y, false));
                self.primary = Some(primary_index + 1);
                self.events.push(WorldEvent::Sound(SoundCue::Hatch));
                debug!(
                    x = egg.body.x,
                    y = egg.body.y,
                    characters = self.characters.len(),
                    "egg_hatched"
                );
            }
        }
    }

    fn all_doors_occupied(&self) -> bool {
        if self.characters.is_empty() {
            return false;
        }
        let all_on_doors = self
            .characters
            .iter()
            .all(|character| character.tile_at_center(&self.grid) == TileKind::Door);
        all_on_doors
            && self.doors.iter().all(|door| {
                self.characters
                    .iter()
                    .any(|character| character.body.tile_coords() == *door)
            })
    }
}

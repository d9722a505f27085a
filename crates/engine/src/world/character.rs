use crate::body::{Body, PhysicsEnv};
use crate::fsm::{StateHook, TransitionTable};
use crate::input::{Button, InputState};
use crate::tiles::{BodyKind, TileGrid, TileKind};

use super::{SoundCue, WorldEvent};

pub const SPEED: f32 = 1.1;
pub const JUMP_POWER: f32 = 2.2;
const STEP_CUE_INTERVAL: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterState {
    Idle,
    Walking,
    Jumping,
    Falling,
    Sleeping,
    WokenUp,
}

static CHARACTER_TRANSITIONS: TransitionTable<CharacterState> = TransitionTable::new(&[
    (
        CharacterState::Idle,
        &[
            CharacterState::Sleeping,
            CharacterState::Walking,
            CharacterState::Jumping,
            CharacterState::Falling,
        ],
    ),
    (
        CharacterState::Walking,
        &[
            CharacterState::Idle,
            CharacterState::Jumping,
            CharacterState::Falling,
        ],
    ),
    (
        CharacterState::Jumping,
        &[CharacterState::Idle, CharacterState::Falling],
    ),
    (
        CharacterState::Falling,
        &[CharacterState::Idle, CharacterState::Walking],
    ),
    (CharacterState::Sleeping, &[CharacterState::WokenUp]),
    (CharacterState::WokenUp, &[CharacterState::Idle]),
]);

/// Jump and landing cues.
struct CharacterCues<'a> {
    events: &'a mut Vec<WorldEvent>,
}

impl StateHook<CharacterState> for CharacterCues<'_> {
    fn on_state_changed(&mut self, new_state: CharacterState, old_state: CharacterState) {
        if new_state == CharacterState::Jumping {
            self.events.push(WorldEvent::Sound(SoundCue::Jump));
        }
        if old_state == CharacterState::Falling {
            self.events.push(WorldEvent::Sound(SoundCue::Land));
        }
    }
}

#[derive(Debug)]
pub struct Character {
    pub body: Body<CharacterState>,
    prev_vy: f32,
}

impl Character {
    pub fn new(x: f32, y: f32, primary: bool) -> Self {
        let kind = if primary {
            BodyKind::PrimaryCharacter
        } else {
            BodyKind::SecondaryCharacter
        };
        Self {
            body: Body::new(kind, x, y, CharacterState::Idle, &CHARACTER_TRANSITIONS),
            prev_vy: 0.0,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.body.kind() == BodyKind::PrimaryCharacter
    }

    pub fn state(&self) -> CharacterState {
        self.body.state()
    }

    pub fn tile_at_center(&self, grid: &TileGrid) -> TileKind {
        self.body.tile_at_center(grid)
    }

    pub fn tile_below(&self, grid: &TileGrid) -> TileKind {
        self.body.tile_below(grid)
    }

    pub(crate) fn sleep(&mut self, events: &mut Vec<WorldEvent>) {
        let slept = self
            .body
            .set_state(CharacterState::Sleeping, &mut CharacterCues { events });
        assert!(slept, "character cannot fall asleep from {:?}", self.state());
    }

    pub(crate) fn wake_up(&mut self, events: &mut Vec<WorldEvent>) {
        assert_eq!(
            self.state(),
            CharacterState::Sleeping,
            "only a sleeping character can wake up"
        );
        let woke = self
            .body
            .set_state(CharacterState::WokenUp, &mut CharacterCues { events });
        assert!(woke, "sleeping character failed to wake up");
    }

    /// `input` is `None` while the world ignores player input.
    pub(crate) fn update(
        &mut self,
        input: Option<&InputState>,
        grid: &TileGrid,
        env: &PhysicsEnv,
        frame: u64,
        events: &mut Vec<WorldEvent>,
    ) {
        let mut cues = CharacterCues { events };

        self.body.vx = 0.0;
        if let Some(input) = input {
            if input.is_down(Button::Left) {
                self.body.vx = -SPEED;
            }
            if input.is_down(Button::Right) {
                self.body.vx = SPEED;
            }
            if input.is_down(Button::Up) && self.body.set_state(CharacterState::Jumping, &mut cues)
            {
                self.body.vy -= JUMP_POWER;
            }
        }

        self.body.update_physics(grid, env);

        if self.body.vy > 0.0 {
            self.body.set_state(CharacterState::Falling, &mut cues);
        } else if self.body.vy == 0.0 && self.prev_vy == 0.0 {
            let settled = if self.body.vx == 0.0 {
                CharacterState::Idle
            } else {
                CharacterState::Walking
            };
            self.body.set_state(settled, &mut cues);
        }
        self.prev_vy = self.body.vy;

        if self.state() == CharacterState::Walking && frame % STEP_CUE_INTERVAL == 0 {
            cues.events.push(WorldEvent::Sound(SoundCue::Step));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::WorldBorder;
    use crate::input::ButtonSet;
    use crate::tiles::{parse_layout, TILE_SIZE};

    fn floor_env(grid: &TileGrid) -> PhysicsEnv {
        PhysicsEnv {
            enabled: true,
            border: WorldBorder {
                left: 0.0,
                right: grid.width() as f32 * TILE_SIZE,
                top: -5.0 * TILE_SIZE,
                bottom: grid.height() as f32 * TILE_SIZE,
            },
        }
    }

    fn held(buttons: &[Button]) -> InputState {
        let mut input = InputState::new();
        input.advance(buttons.iter().copied().collect::<ButtonSet>(), false);
        input
    }

    #[test]
    fn jump_fires_cue_and_lands_again() {
        let grid = parse_layout("......\n......\n......\n######").expect("layout");
        let env = floor_env(&grid);
        let mut character = Character::new(40.0, 40.0, true);
        let mut events = Vec::new();

        character.update(Some(&held(&[])), &grid, &env, 1, &mut events);
        character.update(Some(&held(&[Button::Up])), &grid, &env, 2, &mut events);
        assert_eq!(character.state(), CharacterState::Jumping);
        assert!(character.body.vy < 0.0);
        assert_eq!(events, vec![WorldEvent::Sound(SoundCue::Jump)]);

        for frame in 3..200 {
            character.update(Some(&held(&[])), &grid, &env, frame, &mut events);
        }
        assert_eq!(character.state(), CharacterState::Idle);
        assert_eq!(character.body.y, 40.0);
        assert_eq!(events.last(), Some(&WorldEvent::Sound(SoundCue::Land)));
    }

    #[test]
    fn walking_sets_speed_and_state() {
        let grid = parse_layout("......\n......\n######").expect("layout");
        let env = floor_env(&grid);
        let mut character = Character::new(24.0, 24.0, true);
        let mut events = Vec::new();
        for frame in 1..4 {
            character.update(Some(&held(&[Button::Right])), &grid, &env, frame, &mut events);
        }
        assert_eq!(character.state(), CharacterState::Walking);
        assert_eq!(character.body.vx, SPEED);
        assert!(character.body.x > 24.0);
    }

    #[test]
    fn ignored_input_leaves_character_still() {
        let grid = parse_layout("....\n####").expect("layout");
        let env = floor_env(&grid);
        let mut character = Character::new(24.0, 8.0, false);
        let mut events = Vec::new();
        character.update(None, &grid, &env, 1, &mut events);
        assert_eq!(character.body.vx, 0.0);
        assert_eq!(character.body.x, 24.0);
        assert!(!character.is_primary());
    }

    #[test]
    fn sleeping_character_cannot_jump_and_wakes_to_idle() {
        let grid = parse_layout("....\n####").expect("layout");
        let env = floor_env(&grid);
        let mut character = Character::new(24.0, 8.0, true);
        let mut events = Vec::new();
        character.sleep(&mut events);
        character.update(Some(&held(&[Button::Up])), &grid, &env, 1, &mut events);
        assert_eq!(character.state(), CharacterState::Sleeping);

        character.wake_up(&mut events);
        assert_eq!(character.state(), CharacterState::WokenUp);
        character.update(Some(&held(&[])), &grid, &env, 2, &mut events);
        assert_eq!(character.state(), CharacterState::Idle);
    }

    #[test]
    #[should_panic(expected = "only a sleeping character can wake up")]
    fn waking_an_awake_character_is_a_bug() {
        let mut character = Character::new(0.0, 0.0, true);
        character.wake_up(&mut Vec::new());
    }
}

//! Simulation core for Fregg, a tile puzzle-platformer: a table-driven state
//! machine, tile collision, point-mass physics, frame-replayed tutorial
//! scripts and the world that ties them together. Rendering and audio live
//! with the host; the core only reports cues.

pub mod body;
pub mod fsm;
pub mod input;
pub mod level;
pub mod script;
pub mod session;
pub mod tiles;
pub mod world;

pub use body::{Body, PhysicsEnv, WorldBorder, GRAVITY};
pub use fsm::{NoHook, StateHook, StateMachine, TransitionTable};
pub use input::{Button, ButtonSet, InputState};
pub use level::{Level, LevelDef, LevelPack, LevelPackError};
pub use script::{
    HintStyle, HintView, LevelScript, ScriptCursor, ScriptFrame, ScriptRunner,
    CONTINUE_TIMEOUT, FRAMES_PER_CHARACTER,
};
pub use session::{NoScripts, ScriptFactory, Session, SessionError, TickOutcome};
pub use tiles::{
    parse_layout, BodyKind, CollisionProbe, LayoutError, TileGrid, TileKind, TileOracle,
    TILE_SIZE,
};
pub use world::{
    Camera, Character, CharacterState, Curtain, Egg, Focus, Overlay, SoundCue, World,
    WorldEvent, WorldState, CAMERA_FOLLOW_THRESHOLD, JUMP_POWER, RESET_HOLD_FRAMES,
    SCREEN_SIZE, SPEED, WORLD_TOP_MARGIN_TILES,
};

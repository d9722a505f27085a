use crate::fsm::{StateHook, StateMachine, TransitionTable};
use crate::tiles::{BodyKind, CollisionProbe, TileGrid, TileKind, TileOracle, TILE_SIZE};

/// Added to `vy` on every simulated frame. There is no terminal velocity.
pub const GRAVITY: f32 = 0.05;

/// Corner offsets probed each frame, in resolution order.
const CORNERS: [(f32, f32); 4] = [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldBorder {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Per-tick view of the world that physics needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsEnv {
    pub enabled: bool,
    pub border: WorldBorder,
}

/// A point mass with an embedded state machine over its own state kind.
#[derive(Debug)]
pub struct Body<S: 'static> {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    kind: BodyKind,
    machine: StateMachine<S>,
}

impl<S: Copy + PartialEq> Body<S> {
    pub fn new(
        kind: BodyKind,
        x: f32,
        y: f32,
        initial: S,
        transitions: &'static TransitionTable<S>,
    ) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            kind,
            machine: StateMachine::new(initial, transitions),
        }
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn state(&self) -> S {
        self.machine.state()
    }

    pub fn set_state(&mut self, target: S, hook: &mut impl StateHook<S>) -> bool {
        self.machine.set_state(target, hook)
    }

    pub fn probe(&self) -> CollisionProbe {
        CollisionProbe {
            kind: self.kind,
            vy: self.vy,
        }
    }

    /// Integrates one frame and resolves tile overlap.
    ///
    /// Each corner sees the position left by the corners before it, so
    /// simultaneous contacts on both axes resolve in `CORNERS` order.
    pub fn update_physics(&mut self, oracle: &impl TileOracle, env: &PhysicsEnv) {
        if !env.enabled {
            return;
        }

        self.x += self.vx;
        self.y += self.vy;
        self.vy += GRAVITY;

        for (ox, oy) in CORNERS {
            self.resolve_corner(oracle, ox, oy);
        }

        self.clamp_to_border(&env.border);
    }

    fn resolve_corner(&mut self, oracle: &impl TileOracle, ox: f32, oy: f32) {
        let tile_x = (self.x / TILE_SIZE + ox / 2.0).floor() as i32;
        let tile_y = (self.y / TILE_SIZE + oy / 2.0).floor() as i32;
        if !oracle.is_collidable(tile_x, tile_y, self.probe()) {
            return;
        }

        let x_edge = (tile_x as f32 - ox + 0.5) * TILE_SIZE;
        let y_edge = (tile_y as f32 - oy + 0.5) * TILE_SIZE;
        let x_overlap = (self.x - x_edge).abs();
        let y_overlap = (self.y - y_edge).abs();

        if x_overlap < y_overlap {
            self.x = x_edge;
            self.vx = 0.0;
        } else {
            self.y = y_edge;
            self.vy = 0.0;
        }
    }

    fn clamp_to_border(&mut self, border: &WorldBorder) {
        let half = TILE_SIZE / 2.0;

        // max/min rather than clamp: a border narrower than a tile must not panic.
        let x = self.x.max(border.left + half).min(border.right - half);
        if x != self.x {
            self.x = x;
            self.vx = 0.0;
        }
        let y = self.y.max(border.top + half).min(border.bottom - half);
        if y != self.y {
            self.y = y;
            self.vy = 0.0;
        }
    }

    /// Tile nearest to the body centre.
    pub fn tile_coords(&self) -> (i32, i32) {
        (
            (self.x / TILE_SIZE - 0.5).round_ties_even() as i32,
            (self.y / TILE_SIZE - 0.5).round_ties_even() as i32,
        )
    }

    pub fn tile_at_center(&self, grid: &TileGrid) -> TileKind {
        let (tx, ty) = self.tile_coords();
        grid.tile_at(tx, ty)
    }

    pub fn tile_below(&self, grid: &TileGrid) -> TileKind {
        let (tx, ty) = self.tile_coords();
        grid.tile_at(tx, ty + 1)
    }
}

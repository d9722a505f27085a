use crate::body::{Body, PhysicsEnv};
use crate::fsm::TransitionTable;
use crate::tiles::{BodyKind, TileGrid};

static EGG_TRANSITIONS: TransitionTable<()> = TransitionTable::empty();

/// A laid egg: inert, blocked by both gate kinds.
#[derive(Debug)]
pub struct Egg {
    pub body: Body<()>,
}

impl Egg {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            body: Body::new(BodyKind::Inert, x, y, (), &EGG_TRANSITIONS),
        }
    }

    pub(crate) fn update(&mut self, grid: &TileGrid, env: &PhysicsEnv) {
        self.body.update_physics(grid, env);
    }
}

//! Tutorial scripts bundled with the built-in level pack, looked up by the id a
//! level names in its `script` field.

mod finale;
mod wake_up;

use fregg_engine::LevelScript;

pub(crate) use finale::Finale;
pub(crate) use wake_up::WakeUp;

pub(crate) const WAKE_UP: &str = "wake_up";
pub(crate) const FINALE: &str = "finale";

pub(crate) fn script_for(id: &str) -> Option<Box<dyn LevelScript>> {
    match id {
        WAKE_UP => Some(Box::new(WakeUp)),
        FINALE => Some(Box::new(Finale::default())),
        _ => None,
    }
}

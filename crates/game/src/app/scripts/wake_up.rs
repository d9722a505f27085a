use fregg_engine::{Button, HintStyle, LevelScript, ScriptFrame, World, TILE_SIZE};

const PROMPT: HintStyle = HintStyle::PROMPT;
const NEST_TILE: (i32, i32) = (8, 3);

/// First level: the frog oversleeps, gets yelled at, and is walked through
/// laying and hatching an egg.
pub(crate) struct WakeUp;

fn primary_x_at_least(world: &World, x: f32) -> bool {
    world
        .primary()
        .is_some_and(|character| character.body.x >= x)
}

impl LevelScript for WakeUp {
    fn run(&mut self, frame: &mut ScriptFrame<'_>, world: &mut World) {
        if frame.next() && frame.arrived() {
            world.pause();
            world.sleep_primary();
        }

        if frame.wait(120) && frame.arrived() {
            world.focus_on_character();
        }

        frame.show_hint("This is you.", PROMPT);
        if frame.show_hint("You can move\nyourself using\nthe arrows.", PROMPT) && frame.arrived() {
            world.unfocus();
        }

        frame.wait_for_button(Button::Left);
        frame.or();
        frame.wait_for_button(Button::Right);
        frame.or();
        frame.wait_for_button(Button::Up);

        frame.wait(180);

        frame.show_hint("...", PROMPT);
        frame.show_hint("Why are you\nsleeping?", PROMPT);

        frame.wait(60);

        if frame.show_hint("WAAAKEEE UUUUPPPP!!!\n!!!!!!!!!!!!!!!!!!!!", PROMPT) && frame.arrived()
        {
            world.wake_primary();
        }

        frame.wait(120);

        frame.show_hint("That's better.", PROMPT);
        frame.show_hint("Have you completed\nthe order yet?", PROMPT);

        frame.wait(180);

        frame.show_hint(
            "What do you mean you\ndidn't? That's just\noutrageous!",
            PROMPT,
        );
        frame.show_hint("You need to get the\njob done ASAP!", PROMPT);

        frame.wait(60);

        frame.show_hint("So...", PROMPT);
        frame.show_hint("You better get going", PROMPT);
        if frame.show_hint("NOOOWWWWWWW!!!", PROMPT) && frame.arrived() {
            world.resume();
        }

        let walked_up = frame.wait_until(|| primary_x_at_least(world, TILE_SIZE * 6.5));
        if walked_up && frame.arrived() {
            world.pause();
        }

        if frame.wait(20) && frame.arrived() {
            world.focus_on_tile(NEST_TILE.0, NEST_TILE.1);
        }

        frame.show_hint("This is a nest.", PROMPT);
        if frame.show_hint("You can lay an egg\nthere by pressing X.", PROMPT) && frame.arrived() {
            world.resume();
        }

        let on_nest = frame.wait_until(|| primary_x_at_least(world, TILE_SIZE * 8.0));
        if on_nest && frame.arrived() {
            world.unfocus();
        }

        let laid = frame.wait_until(|| world.placed_egg());
        if laid && frame.arrived() {
            world.pause();
        }

        frame.show_hint(
            "Great! Now all you\nhave to do is hatch\nthe egg and walk the\nfrogs to the exits.",
            PROMPT,
        );
        if frame.show_hint(
            "Keep in mind that\nfrogs need to be\nproperly aligned in\norder to fit.",
            PROMPT,
        ) && frame.arrived()
        {
            world.resume();
        }
    }
}

#[cfg(test)]
mod tests {
    use fregg_engine::{
        ButtonSet, CharacterState, Level, LevelPack, Session, WorldEvent, WorldState,
    };

    use super::*;
    use crate::app::scripts::{script_for, WAKE_UP};

    const LAYOUT: &str = "...............\n...............\n*.........@..@.\n########&######";

    fn session() -> Session {
        let level = Level::parse("wake-up", 1, LAYOUT)
            .expect("layout")
            .with_script(WAKE_UP);
        let pack = LevelPack::new(vec![level]).expect("pack");
        Session::new(pack, script_for, true, 0).expect("session")
    }

    /// Taps button 1 every other frame so prompts are dismissed as soon as they
    /// accept input.
    fn tap(frame: u32) -> ButtonSet {
        if frame % 2 == 0 {
            ButtonSet::empty().with(Button::Primary)
        } else {
            ButtonSet::empty()
        }
    }

    #[test]
    fn opens_paused_with_the_frog_asleep() {
        let mut session = session();
        session.tick(ButtonSet::empty(), false).expect("tick");
        assert_eq!(session.world().state(), WorldState::Paused);
        assert_eq!(
            session.world().primary().expect("primary").state(),
            CharacterState::Sleeping
        );

        for _ in 0..120 {
            session.tick(ButtonSet::empty(), false).expect("tick");
        }
        let events = session.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, WorldEvent::Focus { .. }))
                .count(),
            1,
            "focus fires once"
        );
        assert!(session.world().camera().focus().is_some());
    }

    #[test]
    fn frog_wakes_and_play_resumes_after_the_pep_talk() {
        let mut session = session();
        let mut resumed_at = None;
        for frame in 0..6000 {
            let buttons = if frame == 500 {
                ButtonSet::empty().with(Button::Right)
            } else {
                tap(frame)
            };
            session.tick(buttons, false).expect("tick");
            if session.world().state() == WorldState::Playing && frame > 0 {
                resumed_at = Some(frame);
                break;
            }
        }
        assert!(resumed_at.is_some(), "script never resumed play");
        assert_ne!(
            session.world().primary().expect("primary").state(),
            CharacterState::Sleeping
        );
    }
}

use fregg_engine::{Curtain, HintStyle, LevelScript, ScriptFrame, SoundCue, World};

const PROMPT: HintStyle = HintStyle::PROMPT;
const DIM: HintStyle = HintStyle::PROMPT.dimmed();

/// Closing sequence played on the first level's layout. Never completes.
#[derive(Debug, Default)]
pub(crate) struct Finale {
    show_level: bool,
}

impl LevelScript for Finale {
    fn run(&mut self, frame: &mut ScriptFrame<'_>, world: &mut World) {
        if frame.next() && frame.arrived() {
            world.pause();
            world.sleep_primary();
        }

        frame.next();
        if frame.effect(true) && !self.show_level {
            world.set_curtain(Curtain::Light);
        }

        frame.show_hint("Good job!", PROMPT);
        frame.show_hint("You did it!", PROMPT);

        if frame.wait(120) && frame.arrived() {
            world.play(SoundCue::Chime);
        }

        frame.next();
        if frame.effect(true) && !self.show_level {
            world.set_curtain(Curtain::Dark);
        }

        frame.wait(45);

        frame.show_hint("But do you know...", DIM);
        frame.show_hint("Why were you doing\nthis?", DIM);
        frame.show_hint("What was the purpose\nof all this?", DIM);
        frame.wait(60);
        frame.show_hint("...", DIM);
        frame.wait(60);
        frame.show_hint("Everything you\ndid...", DIM);
        frame.show_hint("Every level you\ncompleted...", DIM);
        frame.show_hint("All of this just to", HintStyle::timed(300).dimmed());

        if frame.next() && frame.arrived() {
            world.play(SoundCue::Chime);
            self.show_level = true;
        }

        frame.show_hint("get started again?..", HintStyle::timed(600));
        frame.wait(300);

        frame.next();
        if frame.effect(true) {
            world.set_curtain(Curtain::TitleCard { thanks: false });
        }

        frame.wait(120);
        if frame.effect(true) {
            world.set_curtain(Curtain::TitleCard { thanks: true });
        }
    }
}

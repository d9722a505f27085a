use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Primary,
    Secondary,
    Left,
    Right,
    Up,
    Down,
}

impl Button {
    pub const ALL: [Button; 6] = [
        Button::Primary,
        Button::Secondary,
        Button::Left,
        Button::Right,
        Button::Up,
        Button::Down,
    ];

    const fn mask(self) -> u8 {
        match self {
            Button::Primary => 1 << 0,
            Button::Secondary => 1 << 1,
            Button::Left => 1 << 4,
            Button::Right => 1 << 5,
            Button::Up => 1 << 6,
            Button::Down => 1 << 7,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonSet {
    bits: u8,
}

impl ButtonSet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub fn all() -> Self {
        Button::ALL
            .iter()
            .fold(Self::empty(), |set, button| set.with(*button))
    }

    pub const fn with(self, button: Button) -> Self {
        Self {
            bits: self.bits | button.mask(),
        }
    }

    pub const fn contains(self, button: Button) -> bool {
        self.bits & button.mask() != 0
    }

    /// Buttons down now that were up in `previous`.
    pub const fn pressed_since(self, previous: ButtonSet) -> ButtonSet {
        ButtonSet {
            bits: self.bits & (self.bits ^ previous.bits),
        }
    }
}

impl FromIterator<Button> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ButtonSet::empty(), |set, button| set.with(button))
    }
}

/// Current and previous button/pointer snapshots for edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    current: ButtonSet,
    previous: ButtonSet,
    click_current: bool,
    click_previous: bool,
}

impl Default for InputState {
    /// Everything starts out as held, so input that is already down when a
    /// session starts never reads as a fresh press.
    fn default() -> Self {
        Self {
            current: ButtonSet::all(),
            previous: ButtonSet::all(),
            click_current: true,
            click_previous: true,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, buttons: ButtonSet, click: bool) {
        self.previous = self.current;
        self.current = buttons;
        self.click_previous = self.click_current;
        self.click_current = click;
    }

    pub fn is_down(&self, button: Button) -> bool {
        self.current.contains(button)
    }

    pub fn pressed(&self, button: Button) -> bool {
        self.current.pressed_since(self.previous).contains(button)
    }

    pub fn clicked(&self) -> bool {
        self.click_current && !self.click_previous
    }
}

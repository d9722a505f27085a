/// Width and height of the visible area in world units.
pub const SCREEN_SIZE: f32 = 160.0;
/// Fraction of the screen the target may drift from the view centre before
/// the camera starts to follow.
pub const CAMERA_FOLLOW_THRESHOLD: f32 = 0.2;
const EASE_FACTOR: f32 = 0.02;
const EASE_GAIN: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Focus {
    pub x: f32,
    pub y: f32,
    pub since_frame: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    target_x: f32,
    target_y: f32,
    focus: Option<Focus>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: SCREEN_SIZE / 2.0,
            y: SCREEN_SIZE / 2.0,
            target_x: SCREEN_SIZE / 2.0,
            target_y: SCREEN_SIZE / 2.0,
            focus: None,
        }
    }
}

impl Camera {
    pub fn snap_to(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.target_x = x;
        self.target_y = y;
    }

    pub fn focus(&self) -> Option<Focus> {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Option<Focus>) {
        self.focus = focus;
    }

    /// Top-left corner of the view.
    pub fn offset(&self) -> (f32, f32) {
        (
            (self.x - SCREEN_SIZE / 2.0).floor(),
            (self.y - SCREEN_SIZE / 2.0).floor(),
        )
    }

    /// Eases toward the current target, then retargets onto the focus point
    /// or, without one, onto `follow`.
    pub fn step(&mut self, follow: Option<(f32, f32)>) {
        self.x = ease_axis(self.x, self.target_x);
        self.y = ease_axis(self.y, self.target_y);

        let target = self.focus.map(|focus| (focus.x, focus.y)).or(follow);
        if let Some((x, y)) = target {
            self.target_x = x;
            self.target_y = y;
        }
    }
}

fn ease_axis(position: f32, target: f32) -> f32 {
    let window = SCREEN_SIZE * CAMERA_FOLLOW_THRESHOLD;
    if target < position - window {
        let goal = target + window;
        (position - ((position - goal) * EASE_FACTOR).powi(2) * EASE_GAIN).max(goal)
    } else if target > position + window {
        let goal = target - window;
        (position + ((goal - position) * EASE_FACTOR).powi(2) * EASE_GAIN).min(goal)
    } else {
        position
    }
}

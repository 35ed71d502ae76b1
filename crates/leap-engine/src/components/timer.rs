use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::components::component::{Updatable, UpdateContext};

/// Fires an action on its entity every `interval` seconds of active time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerComponent {
    pub interval: f32,
    pub action: Action,
    #[serde(skip)]
    elapsed: f32,
}

impl Default for TimerComponent {
    fn default() -> Self {
        Self::new(1.0, Action::Empty)
    }
}

impl TimerComponent {
    pub fn new(interval: f32, action: Action) -> Self {
        Self {
            interval,
            action,
            elapsed: 0.0,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub(crate) fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

impl Updatable for TimerComponent {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if self.interval <= 0.0 {
            return;
        }
        self.elapsed += ctx.dt;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            ctx.fire(&self.action);
        }
    }
}

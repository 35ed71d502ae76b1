use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::components::component::{Updatable, UpdateContext};

/// Key → action binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputBinding {
    pub key: u32,
    /// `true`: fire every tick the key is down. `false`: fire once per press.
    pub held: bool,
    pub action: Action,
}

impl Default for InputBinding {
    fn default() -> Self {
        Self {
            key: 0,
            held: true,
            action: Action::Empty,
        }
    }
}

impl InputBinding {
    pub fn held(key: u32, action: Action) -> Self {
        Self { key, held: true, action }
    }

    pub fn pressed(key: u32, action: Action) -> Self {
        Self { key, held: false, action }
    }
}

/// Triggers actions on its entity from keyboard state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputComponent {
    pub bindings: Vec<InputBinding>,
}

impl InputComponent {
    pub fn new(bindings: Vec<InputBinding>) -> Self {
        Self { bindings }
    }

    pub fn with_binding(mut self, binding: InputBinding) -> Self {
        self.bindings.push(binding);
        self
    }
}

impl Updatable for InputComponent {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        for binding in &self.bindings {
            let triggered = if binding.held {
                ctx.keys.is_held(binding.key)
            } else {
                ctx.keys.is_just_pressed(binding.key)
            };
            if triggered {
                ctx.fire(&binding.action);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use crate::components::physics::PhysicsIntent;
    use crate::input::queue::{InputEvent, KeyboardState};

    const LEFT: u32 = 37;
    const SPACE: u32 = 32;

    fn controls() -> InputComponent {
        InputComponent::default()
            .with_binding(InputBinding::held(LEFT, Action::Physics { intent: PhysicsIntent::GoLeft }))
            .with_binding(InputBinding::pressed(SPACE, Action::Physics { intent: PhysicsIntent::Jump }))
    }

    fn fired(input: &mut InputComponent, keys: &KeyboardState) -> Vec<Action> {
        let mut ctx = UpdateContext::new(EntityId(1), 1.0 / 60.0, keys);
        input.update(&mut ctx);
        ctx.into_fired()
    }

    #[test]
    fn held_binding_fires_every_tick() {
        let mut input = controls();
        let mut keys = KeyboardState::new();
        keys.apply(InputEvent::KeyDown { key_code: LEFT });
        assert_eq!(fired(&mut input, &keys).len(), 1);
        keys.end_tick();
        assert_eq!(fired(&mut input, &keys).len(), 1);
    }

    #[test]
    fn pressed_binding_fires_once() {
        let mut input = controls();
        let mut keys = KeyboardState::new();
        keys.apply(InputEvent::KeyDown { key_code: SPACE });
        assert_eq!(
            fired(&mut input, &keys),
            vec![Action::Physics { intent: PhysicsIntent::Jump }]
        );
        keys.end_tick();
        assert!(fired(&mut input, &keys).is_empty());
    }
}

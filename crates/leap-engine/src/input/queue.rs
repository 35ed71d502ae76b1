use std::collections::HashSet;

/// Input event types the simulation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key was pressed.
    KeyDown { key_code: u32 },
    /// A key was released.
    KeyUp { key_code: u32 },
}

/// A queue of input events.
/// The host pushes events as they arrive; the runner drains them once per frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Keyboard state seen by input components during a tick.
///
/// `just_pressed` only holds keys that went down since the last call to
/// `end_tick`, so "fire once per press" bindings fire on exactly one tick.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<u32>,
    just_pressed: HashSet<u32>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown { key_code } => {
                if self.held.insert(key_code) {
                    self.just_pressed.insert(key_code);
                }
            }
            InputEvent::KeyUp { key_code } => {
                self.held.remove(&key_code);
            }
        }
    }

    pub fn apply_all(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    pub fn is_held(&self, key_code: u32) -> bool {
        self.held.contains(&key_code)
    }

    pub fn is_just_pressed(&self, key_code: u32) -> bool {
        self.just_pressed.contains(&key_code)
    }

    /// Forget which keys were pressed this tick. Held keys stay held.
    pub fn end_tick(&mut self) {
        self.just_pressed.clear();
    }
}

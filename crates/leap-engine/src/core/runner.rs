use crate::api::types::SoundEvent;
use crate::core::level::Level;
use crate::core::time::FixedTimestep;
use crate::input::queue::{InputEvent, InputQueue, KeyboardState};
use crate::renderer::instance::RenderBuffer;
use crate::systems::render::build_render_buffer;

/// Drives a level from variable frame times.
///
/// Input events queue up between frames. Each `frame` applies them to the
/// keyboard state, runs as many fixed ticks as the elapsed time allows, then
/// renders once.
pub struct LevelRunner {
    level: Level,
    input: InputQueue,
    keys: KeyboardState,
    timestep: FixedTimestep,
    render_buffer: RenderBuffer,
    /// Sound triggers of the last frame.
    sounds: Vec<SoundEvent>,
}

impl LevelRunner {
    pub fn new(level: Level) -> Self {
        let config = level.config();
        let timestep = FixedTimestep::new(config.fixed_dt, config.max_steps_per_frame);
        Self {
            level,
            input: InputQueue::new(),
            keys: KeyboardState::new(),
            timestep,
            render_buffer: RenderBuffer::new(),
            sounds: Vec::new(),
        }
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame. Returns the number of fixed ticks simulated.
    pub fn frame(&mut self, frame_dt: f32) -> u32 {
        self.keys.apply_all(self.input.drain());

        let steps = self.timestep.accumulate(frame_dt);
        for step in 0..steps {
            if step > 0 {
                // A press counts once, on the first tick that sees it.
                self.keys.end_tick();
            }
            self.level.update(self.timestep.dt(), &self.keys);
        }
        if steps > 0 {
            self.keys.end_tick();
        }

        build_render_buffer(&self.level, &mut self.render_buffer);
        self.sounds = self.level.drain_sounds();
        steps
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn render_buffer(&self) -> &RenderBuffer {
        &self.render_buffer
    }

    pub fn sounds(&self) -> &[SoundEvent] {
        &self.sounds
    }

    /// Interpolation alpha between the last two ticks.
    pub fn alpha(&self) -> f32 {
        self.timestep.alpha()
    }

    pub fn into_level(self) -> Level {
        self.level
    }
}

use colorcube_engine_interface::FrameTime;

/// Fixed-step frame clock. Simulated time advances by the same delta every frame, however
/// long the frame actually took.
pub struct Timing {
    delta: f32,
    time: FrameTime,
}

impl Timing {
    /// Timing at the given frame rate
    pub fn fixed(fps: f32) -> Self {
        Self {
            delta: 1. / fps,
            time: FrameTime::default(),
        }
    }

    /// Begin the frame, as far as this clock is concerned.
    pub fn frame(&mut self) -> FrameTime {
        self.time = FrameTime {
            delta: self.delta,
            time: self.time.time + self.delta,
        };
        self.time
    }
}

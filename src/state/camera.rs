// Camera controller: a current/target transform pair with drag, inertia and focal zoom.
use crate::config::CameraConfig;
use crate::model::{Point, Transform, Velocity};

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragPhase {
    Idle,
    /// Primary button held, pointer not moved yet.
    Armed { at: Point, time: f64 },
    Dragging {
        start: Point,
        start_transform: Transform,
        last: Point,
        last_time: f64,
    },
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub current: Transform,
    pub target: Transform,
    pub velocity: Velocity,
    drag: DragPhase,
    config: CameraConfig,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            current: Transform::IDENTITY,
            target: Transform::IDENTITY,
            velocity: Velocity::ZERO,
            drag: DragPhase::Idle,
            config,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// True while the primary button is held, moved or not.
    pub fn is_dragging(&self) -> bool {
        !matches!(self.drag, DragPhase::Idle)
    }

    /// Returns false for anything but the primary button.
    pub fn pointer_down(&mut self, button: i16, at: Point, time: f64) -> bool {
        if button != 0 {
            return false;
        }
        self.target = self.current;
        self.velocity = Velocity::ZERO;
        self.drag = DragPhase::Armed { at, time };
        true
    }

    /// Returns true when the move changed the transform.
    pub fn pointer_move(&mut self, at: Point, time: f64) -> bool {
        match self.drag {
            DragPhase::Idle => false,
            DragPhase::Armed {
                at: press,
                time: press_time,
            } => {
                self.drag = DragPhase::Dragging {
                    start: press,
                    start_transform: self.current,
                    last: press,
                    last_time: press_time,
                };
                self.velocity = Velocity::ZERO;
                self.pointer_move(at, time)
            }
            DragPhase::Dragging {
                start,
                start_transform,
                last,
                last_time,
            } => {
                let live = start_transform.translated(at.x - start.x, at.y - start.y);
                self.current = live;
                self.target = live;
                let dt = time - last_time;
                if dt > 0.0 {
                    self.velocity = Velocity {
                        x: (at.x - last.x) / dt,
                        y: (at.y - last.y) / dt,
                    };
                }
                self.drag = DragPhase::Dragging {
                    start,
                    start_transform,
                    last: at,
                    last_time: time,
                };
                true
            }
        }
    }

    /// Ends a drag; projects translation along the last velocity. Scale gets no inertia.
    pub fn pointer_up(&mut self, time: f64) {
        let phase = std::mem::replace(&mut self.drag, DragPhase::Idle);
        let DragPhase::Dragging { last_time, .. } = phase else {
            return;
        };
        if time - last_time > self.config.velocity_stale_ms {
            self.velocity = Velocity::ZERO;
        }
        if self.velocity.is_zero() {
            self.target = self.current;
            return;
        }
        let reach = self.config.inertia_ms;
        self.target = self
            .current
            .translated(self.velocity.x * reach, self.velocity.y * reach);
    }

    /// Wheel zoom about the cursor. `delta_y < 0` zooms in.
    /// Reversed from the older page, which zoomed in on `delta_y > 0`.
    /// Ignored while the button is held.
    pub fn wheel(&mut self, delta_y: f64, cursor: Point) {
        if self.is_dragging() || delta_y == 0.0 {
            return;
        }
        let step = if delta_y < 0.0 {
            self.config.zoom_in_step
        } else {
            self.config.zoom_out_step
        };
        self.zoom_about(step, cursor);
    }

    /// Focal-point zoom of `target` by `step`, clamped to the scale range.
    pub fn zoom_about(&mut self, step: f64, cursor: Point) {
        let base = self.target;
        let k = (base.k * step).clamp(self.config.k_min, self.config.k_max);
        let ratio = k / base.k;
        self.target = Transform {
            x: cursor.x - (cursor.x - base.x) * ratio,
            y: cursor.y - (cursor.y - base.y) * ratio,
            k,
        };
    }

    /// Eases back to the identity transform.
    pub fn recenter(&mut self) {
        if self.is_dragging() {
            return;
        }
        self.target = Transform::IDENTITY;
    }

    /// One interpolation frame. No-op while the button is held.
    pub fn step(&mut self) -> Transform {
        if self.is_dragging() {
            return self.current;
        }
        let dx = self.target.x - self.current.x;
        let dy = self.target.y - self.current.y;
        let dk = self.target.k - self.current.k;
        let c = &self.config;
        if dx.abs() < c.position_epsilon
            && dy.abs() < c.position_epsilon
            && dk.abs() < c.scale_epsilon
        {
            self.current = self.target;
            self.velocity = Velocity::ZERO;
            return self.current;
        }
        let s = if dx.hypot(dy) > c.far_threshold {
            c.smooth_far
        } else {
            c.smooth_near
        };
        self.current = Transform {
            x: self.current.x + dx * s,
            y: self.current.y + dy * s,
            k: self.current.k + dk * s,
        };
        self.current
    }
}

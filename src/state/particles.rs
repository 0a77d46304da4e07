// Particle cycle along a connector: travel while fading in, fade out, pause, repeat.
use crate::config::ParticleConfig;
use crate::model::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSample {
    pub at: Point,
    pub opacity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CyclePhase {
    /// Not started yet, or resting between cycles.
    Hidden,
    Travel,
    FadeOut,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub id: u32,
    /// Delay before the first cycle, staggered by slot.
    pub delay_ms: f64,
    cycle_start: Option<f64>,
}

impl Particle {
    pub fn new(id: u32, slot: usize, cfg: &ParticleConfig) -> Self {
        Self {
            id,
            delay_ms: cfg.stagger_ms() * slot as f64,
            cycle_start: None,
        }
    }

    /// Begins a new cycle at the connector origin.
    pub fn restart(&mut self, now: f64) {
        self.cycle_start = Some(now);
    }

    pub fn stop(&mut self) {
        self.cycle_start = None;
    }

    pub fn is_started(&self) -> bool {
        self.cycle_start.is_some()
    }

    pub fn phase(&self, now: f64, cfg: &ParticleConfig) -> CyclePhase {
        let Some(start) = self.cycle_start else {
            return CyclePhase::Hidden;
        };
        let elapsed = now - start;
        if elapsed < 0.0 {
            CyclePhase::Hidden
        } else if elapsed < cfg.travel_ms {
            CyclePhase::Travel
        } else if elapsed < cfg.travel_ms + cfg.fade_out_ms {
            CyclePhase::FadeOut
        } else {
            CyclePhase::Hidden
        }
    }

    /// Position and opacity at `now`, or `None` while hidden.
    pub fn sample(
        &self,
        now: f64,
        from: Point,
        to: Point,
        cfg: &ParticleConfig,
    ) -> Option<ParticleSample> {
        let start = self.cycle_start?;
        let elapsed = now - start;
        match self.phase(now, cfg) {
            CyclePhase::Hidden => None,
            CyclePhase::Travel => {
                let t = elapsed / cfg.travel_ms;
                Some(ParticleSample {
                    at: from.lerp(to, t),
                    opacity: cfg.max_opacity * t,
                })
            }
            CyclePhase::FadeOut => {
                let t = (elapsed - cfg.travel_ms) / cfg.fade_out_ms;
                Some(ParticleSample {
                    at: to,
                    opacity: cfg.max_opacity * (1.0 - t),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FROM: Point = Point::new(-30.0, -30.0);
    const TO: Point = Point::new(0.0, -10.0);

    #[test]
    fn hidden_until_first_restart() {
        let cfg = ParticleConfig::default();
        let p = Particle::new(1, 2, &cfg);
        assert_eq!(p.delay_ms, 1200.0);
        assert!(!p.is_started());
        assert_eq!(p.sample(5000.0, FROM, TO, &cfg), None);
    }

    #[test]
    fn cycle_starts_transparent_at_origin_and_ends_at_destination() {
        let cfg = ParticleConfig::default();
        let mut p = Particle::new(1, 0, &cfg);
        p.restart(1000.0);
        let s0 = p.sample(1000.0, FROM, TO, &cfg).unwrap();
        assert_eq!(s0.at, FROM);
        assert_eq!(s0.opacity, 0.0);

        let mid = p.sample(1000.0 + cfg.travel_ms / 2.0, FROM, TO, &cfg).unwrap();
        assert!((mid.at.x - -15.0).abs() < 1e-9);
        assert!((mid.at.y - -20.0).abs() < 1e-9);
        assert!((mid.opacity - cfg.max_opacity / 2.0).abs() < 1e-9);

        let arrived = p.sample(1000.0 + cfg.travel_ms, FROM, TO, &cfg).unwrap();
        assert_eq!(arrived.at, TO);
        assert!((arrived.opacity - cfg.max_opacity).abs() < 1e-9);
        assert_eq!(p.phase(1000.0 + cfg.travel_ms, &cfg), CyclePhase::FadeOut);
    }

    #[test]
    fn opacity_falls_during_fade_then_hides_for_pause() {
        let cfg = ParticleConfig::default();
        let mut p = Particle::new(7, 0, &cfg);
        p.restart(0.0);
        let late = p
            .sample(cfg.travel_ms + cfg.fade_out_ms * 0.9, FROM, TO, &cfg)
            .unwrap();
        assert!(late.opacity < cfg.max_opacity * 0.2);
        assert_eq!(p.sample(cfg.travel_ms + cfg.fade_out_ms, FROM, TO, &cfg), None);
        assert_eq!(p.sample(cfg.period_ms() - 1.0, FROM, TO, &cfg), None);

        p.restart(cfg.period_ms());
        let again = p.sample(cfg.period_ms(), FROM, TO, &cfg).unwrap();
        assert_eq!(again.at, FROM);
    }

    #[test]
    fn stop_hides_particle() {
        let cfg = ParticleConfig::default();
        let mut p = Particle::new(3, 1, &cfg);
        p.restart(0.0);
        p.stop();
        assert_eq!(p.phase(10.0, &cfg), CyclePhase::Hidden);
    }
}

//! Camera travel controllers.
//!
//! Both controllers are driven by a session timeline (`now` as a
//! [`Duration`] since start) and only produce a curve parameter; turning it
//! into a pose is the sampler's job.

use std::time::Duration;

use log::debug;
use tw_geometry::travel_param;
use tw_math::{wrap_unit, Easing};

/// Continuous flythrough: one lap per `period`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopTravel {
    period: Duration,
}

impl LoopTravel {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// `(now mod period) / period`; a zero period parks the camera at 0.
    pub fn param(&self, now: Duration) -> f64 {
        if self.period.is_zero() {
            return 0.0;
        }
        wrap_unit(now.as_secs_f64() / self.period.as_secs_f64())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepState {
    Idle,
    Moving {
        from: f64,
        to: f64,
        /// Forward distance in parameter space, `wrap_unit(to - from)`.
        delta: f64,
        started: Duration,
        target_index: usize,
    },
}

/// Step navigation between fixed stops on the curve.
///
/// A request made while a move is in flight is dropped, not queued.
#[derive(Debug, Clone)]
pub struct StepTravel {
    stops: Vec<f64>,
    duration: Duration,
    easing: Easing,
    current_index: usize,
    current_t: f64,
    state: StepState,
}

impl StepTravel {
    /// Start idle at the first stop (or at 0 without stops).
    pub fn new(stops: Vec<f64>, duration: Duration, easing: Easing) -> Self {
        let current_t = stops.first().copied().map(wrap_unit).unwrap_or(0.0);
        Self {
            stops,
            duration,
            easing,
            current_index: 0,
            current_t,
            state: StepState::Idle,
        }
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.state, StepState::Moving { .. })
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Parameter of the last stop reached.
    pub fn current_t(&self) -> f64 {
        self.current_t
    }

    pub fn stops(&self) -> &[f64] {
        &self.stops
    }

    /// Begin moving to the next stop. Returns false when the request is
    /// ignored (a move is in flight or there are no stops).
    pub fn request_next(&mut self, now: Duration) -> bool {
        if self.is_moving() || self.stops.is_empty() {
            return false;
        }
        let target_index = (self.current_index + 1) % self.stops.len();
        let from = self.current_t;
        let to = wrap_unit(self.stops[target_index]);
        self.state = StepState::Moving {
            from,
            to,
            delta: wrap_unit(to - from),
            started: now,
            target_index,
        };
        debug!("step {} -> {}: t {:.3} -> {:.3}", self.current_index, target_index, from, to);
        true
    }

    /// Parameter at `now`. Finishing a move snaps exactly onto its stop and
    /// returns to idle.
    pub fn update(&mut self, now: Duration) -> f64 {
        let StepState::Moving {
            from,
            to,
            started,
            target_index,
            ..
        } = self.state
        else {
            return self.current_t;
        };

        let elapsed = now.saturating_sub(started);
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };

        if progress >= 1.0 {
            self.state = StepState::Idle;
            self.current_t = to;
            self.current_index = target_index;
            return to;
        }
        travel_param(from, to, progress, self.easing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_loop_param() {
        let travel = LoopTravel::new(ms(80_000));
        assert_eq!(travel.param(ms(0)), 0.0);
        assert_abs_diff_eq!(travel.param(ms(20_000)), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(travel.param(ms(100_000)), 0.25, epsilon = 1e-12);
        assert_eq!(LoopTravel::new(Duration::ZERO).param(ms(5)), 0.0);
    }

    #[test]
    fn test_step_cycle_through_stops() {
        let mut travel = StepTravel::new(vec![0.0, 0.33, 0.66], ms(2000), Easing::CubicInOut);
        assert_eq!(travel.update(ms(0)), 0.0);

        assert!(travel.request_next(ms(100)));
        assert!(travel.is_moving());
        let mid = travel.update(ms(1100));
        assert_abs_diff_eq!(mid, 0.165, epsilon = 1e-12);

        assert_eq!(travel.update(ms(2100)), 0.33);
        assert!(!travel.is_moving());
        assert_eq!(travel.current_index(), 1);
        assert_eq!(travel.current_t(), 0.33);
        // stays put while idle
        assert_eq!(travel.update(ms(9000)), 0.33);
    }

    #[test]
    fn test_request_while_moving_is_ignored() {
        let mut travel = StepTravel::new(vec![0.0, 0.5], ms(1000), Easing::Linear);
        assert!(travel.request_next(ms(0)));
        assert!(!travel.request_next(ms(500)));
        assert_eq!(travel.update(ms(1000)), 0.5);
        assert_eq!(travel.current_index(), 1);
    }

    #[test]
    fn test_last_stop_wraps_forward_through_seam() {
        let mut travel = StepTravel::new(vec![0.1, 0.9], ms(1000), Easing::Linear);
        assert!(travel.request_next(ms(0)));
        assert_eq!(travel.update(ms(1000)), 0.9);

        assert!(travel.request_next(ms(1000)));
        match travel.state() {
            StepState::Moving { delta, target_index, .. } => {
                assert_abs_diff_eq!(delta, 0.2, epsilon = 1e-12);
                assert_eq!(target_index, 0);
            }
            StepState::Idle => panic!("expected a move"),
        }
        // quarter of the way: 0.9 + 0.05
        assert_abs_diff_eq!(travel.update(ms(1250)), 0.95, epsilon = 1e-12);
        let past_seam = travel.update(ms(1750));
        assert_abs_diff_eq!(past_seam, 0.05, epsilon = 1e-12);
        assert_eq!(travel.update(ms(2000)), 0.1);
    }

    #[test]
    fn test_no_stops() {
        let mut travel = StepTravel::new(Vec::new(), ms(1000), Easing::Linear);
        assert!(!travel.request_next(ms(0)));
        assert_eq!(travel.update(ms(10)), 0.0);
    }

    #[test]
    fn test_update_before_start_clamps() {
        let mut travel = StepTravel::new(vec![0.2, 0.4], ms(1000), Easing::Linear);
        travel.request_next(ms(500));
        assert_eq!(travel.update(ms(100)), 0.2);
    }
}

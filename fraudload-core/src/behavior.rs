//! Virtual-user behavior declarations
//!
//! A behavior is plain data: how long a user pauses between requests and
//! which tasks it picks from, with what relative weight. [`VirtualUser`]
//! executes it.
//!
//! [`VirtualUser`]: crate::user::VirtualUser

use crate::payload::PayloadKind;
use fraudload_config::UserType;
use rand::Rng;
use std::time::Duration;

pub const AUTH_ENDPOINT: &str = "/v1/evaluate/auth";
pub const MONITORING_ENDPOINT: &str = "/v1/evaluate/monitoring";
pub const RULESET_BULK_LOAD_ENDPOINT: &str = "/v1/evaluate/rulesets/bulk-load";

/// Pause between two consecutive requests of one user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Uniformly random in `[min, max]`
    Between { min: Duration, max: Duration },
    /// Always the same pause
    Constant(Duration),
}

impl Pacing {
    pub fn between_millis(min: u64, max: u64) -> Self {
        Pacing::Between {
            min: Duration::from_millis(min.min(max)),
            max: Duration::from_millis(max.max(min)),
        }
    }

    pub fn constant_millis(millis: u64) -> Self {
        Pacing::Constant(Duration::from_millis(millis))
    }

    /// Draw the next pause
    pub fn next_wait<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        match *self {
            Pacing::Between { min, max } if max > min => {
                let micros = rng.gen_range(min.as_micros() as u64..=max.as_micros() as u64);
                Duration::from_micros(micros)
            }
            Pacing::Between { min, .. } => min,
            Pacing::Constant(wait) => wait,
        }
    }
}

/// One weighted request a user may issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    /// Name requests are grouped under in the statistics
    pub name: &'static str,
    /// Relative frequency among the behavior's tasks
    pub weight: u32,
    /// Path on the target
    pub endpoint: &'static str,
    /// Body generator
    pub generator: PayloadKind,
}

impl TaskSpec {
    pub fn auth(weight: u32) -> Self {
        Self {
            name: AUTH_ENDPOINT,
            weight,
            endpoint: AUTH_ENDPOINT,
            generator: PayloadKind::Auth,
        }
    }

    pub fn monitoring(weight: u32) -> Self {
        Self {
            name: MONITORING_ENDPOINT,
            weight,
            endpoint: MONITORING_ENDPOINT,
            generator: PayloadKind::Monitoring,
        }
    }

    pub fn velocity_burst(weight: u32) -> Self {
        Self {
            name: "/v1/evaluate/auth [velocity]",
            weight,
            endpoint: AUTH_ENDPOINT,
            generator: PayloadKind::VelocityBurst,
        }
    }
}

/// Pacing plus a weighted task set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBehavior {
    pub user_type: UserType,
    pub pacing: Pacing,
    pub tasks: Vec<TaskSpec>,
}

impl UserBehavior {
    pub fn for_type(user_type: UserType) -> Self {
        match user_type {
            UserType::Standard => Self::standard(),
            UserType::HighVolume => Self::high_volume(),
            UserType::Velocity => Self::velocity(),
            UserType::SteadyState => Self::steady_state(),
        }
    }

    /// 70% AUTH, 30% MONITORING, 10-50ms apart
    pub fn standard() -> Self {
        Self {
            user_type: UserType::Standard,
            pacing: Pacing::between_millis(10, 50),
            tasks: standard_tasks(),
        }
    }

    /// Standard mix, 1-5ms apart
    pub fn high_volume() -> Self {
        Self {
            user_type: UserType::HighVolume,
            pacing: Pacing::between_millis(1, 5),
            tasks: standard_tasks(),
        }
    }

    /// Standard mix plus velocity bursts on one card, 100-200ms apart
    pub fn velocity() -> Self {
        let mut tasks = standard_tasks();
        tasks.push(TaskSpec::velocity_burst(1));
        Self {
            user_type: UserType::Velocity,
            pacing: Pacing::between_millis(100, 200),
            tasks,
        }
    }

    /// AUTH only, every 100ms
    pub fn steady_state() -> Self {
        Self {
            user_type: UserType::SteadyState,
            pacing: Pacing::constant_millis(100),
            tasks: vec![TaskSpec::auth(1)],
        }
    }

    pub fn total_weight(&self) -> u64 {
        self.tasks.iter().map(|t| u64::from(t.weight)).sum()
    }

    /// Pick a task with probability proportional to its weight.
    ///
    /// Returns `None` only when no task has a positive weight.
    pub fn pick_task<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&TaskSpec> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }

        let mut roll = rng.gen_range(0..total);
        for task in &self.tasks {
            let weight = u64::from(task.weight);
            if roll < weight {
                return Some(task);
            }
            roll -= weight;
        }
        None
    }
}

fn standard_tasks() -> Vec<TaskSpec> {
    vec![TaskSpec::auth(7), TaskSpec::monitoring(3)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_presets() {
        let standard = UserBehavior::standard();
        assert_eq!(standard.pacing, Pacing::between_millis(10, 50));
        assert_eq!(standard.total_weight(), 10);

        let high = UserBehavior::high_volume();
        assert_eq!(high.tasks, standard.tasks);
        assert_eq!(high.pacing, Pacing::between_millis(1, 5));

        let velocity = UserBehavior::velocity();
        assert_eq!(velocity.tasks.len(), 3);
        assert_eq!(velocity.tasks[2].generator, PayloadKind::VelocityBurst);
        assert_eq!(velocity.tasks[2].endpoint, AUTH_ENDPOINT);

        let steady = UserBehavior::steady_state();
        assert_eq!(steady.pacing, Pacing::Constant(Duration::from_millis(100)));
        assert_eq!(steady.tasks, vec![TaskSpec::auth(1)]);
    }

    #[test]
    fn test_for_type_round_trips() {
        for user_type in UserType::all() {
            assert_eq!(UserBehavior::for_type(*user_type).user_type, *user_type);
        }
    }

    #[test]
    fn test_weighted_selection_follows_weights() {
        let behavior = UserBehavior::standard();
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for _ in 0..10_000 {
            let task = behavior.pick_task(&mut rng).unwrap();
            *counts.entry(task.name).or_default() += 1;
        }

        let auth = counts[AUTH_ENDPOINT] as f64 / 10_000.0;
        assert!((0.66..=0.74).contains(&auth), "auth share {}", auth);
    }

    #[test]
    fn test_zero_weight_tasks_never_picked() {
        let behavior = UserBehavior {
            user_type: UserType::Standard,
            pacing: Pacing::constant_millis(0),
            tasks: vec![TaskSpec::monitoring(0), TaskSpec::auth(1)],
        };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(behavior.pick_task(&mut rng).unwrap().endpoint, AUTH_ENDPOINT);
        }

        let empty = UserBehavior {
            tasks: vec![],
            ..behavior
        };
        assert!(empty.pick_task(&mut rng).is_none());
    }

    #[test]
    fn test_pacing_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let pacing = Pacing::between_millis(10, 50);
        for _ in 0..1_000 {
            let wait = pacing.next_wait(&mut rng);
            assert!(wait >= Duration::from_millis(10) && wait <= Duration::from_millis(50));
        }
        assert_eq!(
            Pacing::constant_millis(100).next_wait(&mut rng),
            Duration::from_millis(100)
        );
        assert_eq!(
            Pacing::between_millis(5, 5).next_wait(&mut rng),
            Duration::from_millis(5)
        );
    }
}

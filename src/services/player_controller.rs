use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Состояние персонажа в текущем кадре
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Moving,
    Jumping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovingState {
    #[default]
    Walking,
    Running,
}

/// Параметры аниматора, выводимые из состояния в конце кадра
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimatorParams {
    pub speed: f32,
    pub jump: bool,
    pub direction: f32,
}

/// Демонстрационный получатель действий: простая ходьба/бег/прыжок.
///
/// Состояние сбрасывается в `Idle` каждый кадр, поэтому движение длится,
/// только пока действие вызывается.
#[derive(Debug, Clone)]
pub struct PlayerController {
    walking_speed: f32,
    running_speed: f32,
    state: PlayerState,
    moving_state: MovingState,
    delta: Duration,
    distance: f32,
}

impl PlayerController {
    pub fn new(walking_speed: f32, running_speed: f32) -> Self {
        Self {
            walking_speed,
            running_speed,
            state: PlayerState::Idle,
            moving_state: MovingState::Walking,
            delta: Duration::ZERO,
            distance: 0.0,
        }
    }

    pub fn begin_frame(&mut self, delta: Duration) {
        self.delta = delta;
    }

    pub fn walk_forward(&mut self) {
        self.translate(self.walking_speed);
        self.state = PlayerState::Moving;
        self.moving_state = MovingState::Walking;
    }

    pub fn run_forward(&mut self) {
        self.translate(self.running_speed);
        self.state = PlayerState::Moving;
        self.moving_state = MovingState::Running;
    }

    pub fn jump(&mut self) {
        self.state = PlayerState::Jumping;
    }

    fn translate(&mut self, speed: f32) {
        self.distance += speed * self.delta.as_secs_f32();
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Вычислить параметры аниматора и сбросить состояние кадра
    pub fn end_frame(&mut self) -> AnimatorParams {
        let params = match (self.state, self.moving_state) {
            (PlayerState::Idle, _) => AnimatorParams::default(),
            (PlayerState::Moving, MovingState::Walking) => AnimatorParams {
                speed: 0.5,
                ..AnimatorParams::default()
            },
            (PlayerState::Moving, MovingState::Running) => AnimatorParams {
                speed: 1.0,
                ..AnimatorParams::default()
            },
            (PlayerState::Jumping, _) => AnimatorParams {
                jump: true,
                ..AnimatorParams::default()
            },
        };

        self.state = PlayerState::Idle;
        params
    }

    /// Обработчик для действия с известным именем
    pub fn handler(
        controller: &Arc<Mutex<Self>>,
        action_name: &str,
    ) -> Option<impl FnMut() -> anyhow::Result<()> + Send + 'static> {
        let apply: fn(&mut Self) = match action_name {
            "walk_forward" => Self::walk_forward,
            "run_forward" => Self::run_forward,
            "jump" => Self::jump,
            _ => return None,
        };

        let controller = Arc::clone(controller);
        Some(move || {
            apply(&mut controller.lock());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_resets_every_frame() {
        let mut player = PlayerController::new(1.0, 3.0);
        player.begin_frame(Duration::from_millis(500));
        player.walk_forward();
        assert_eq!(player.state(), PlayerState::Moving);
        assert_eq!(player.end_frame().speed, 0.5);
        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(player.end_frame(), AnimatorParams::default());
        assert!((player.distance() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_last_call_wins() {
        let mut player = PlayerController::new(1.0, 3.0);
        player.begin_frame(Duration::from_secs(1));
        player.walk_forward();
        player.run_forward();
        assert_eq!(player.end_frame().speed, 1.0);
        assert!((player.distance() - 4.0).abs() < f32::EPSILON);

        player.jump();
        let params = player.end_frame();
        assert!(params.jump);
        assert_eq!(params.speed, 0.0);
    }

    #[test]
    fn test_handler_by_name() {
        let player = Arc::new(Mutex::new(PlayerController::new(1.0, 3.0)));
        let mut jump = PlayerController::handler(&player, "jump").unwrap();
        assert!(PlayerController::handler(&player, "crouch").is_none());

        jump().unwrap();
        assert_eq!(player.lock().state(), PlayerState::Jumping);
    }
}

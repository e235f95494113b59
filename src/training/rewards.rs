use crate::game::{GameOutcome, GameState, Position};

/// Shaped reward from (state before the move, state after it, the move).
/// `action` is `None` when the agent produced no move.
pub type RewardFn = fn(&GameState, &GameState, Option<Position>) -> f32;

/// Which reward function a training run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardScheme {
    Usual,
    Cooperative,
}

impl RewardScheme {
    pub fn function(self) -> RewardFn {
        match self {
            RewardScheme::Usual => reward_usual,
            RewardScheme::Cooperative => reward_cooperative,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RewardScheme::Usual => "usual",
            RewardScheme::Cooperative => "cooperative",
        }
    }
}

impl std::str::FromStr for RewardScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usual" => Ok(RewardScheme::Usual),
            "cooperative" => Ok(RewardScheme::Cooperative),
            other => Err(format!(
                "unknown reward scheme '{other}' (expected 'usual' or 'cooperative')"
            )),
        }
    }
}

impl std::fmt::Display for RewardScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// -5 for losing, +20 for a draw, +2 to keep playing, -20 for no move.
pub fn reward_usual(before: &GameState, after: &GameState, action: Option<Position>) -> f32 {
    if action.is_none() {
        return -20.0;
    }
    match after.outcome() {
        Some(GameOutcome::Loser(p)) if p == before.current_player() => -5.0,
        Some(GameOutcome::Draw) => 20.0,
        _ => 2.0,
    }
}

/// +50 for a draw, -50 for losing, -10 for no move. A move that takes a cell
/// the opponent would have completed a square with earns +4, any other +3.
pub fn reward_cooperative(before: &GameState, after: &GameState, action: Option<Position>) -> f32 {
    let Some(pos) = action else {
        return -10.0;
    };
    match after.outcome() {
        Some(GameOutcome::Draw) => return 50.0,
        Some(GameOutcome::Loser(p)) if p == before.current_player() => return -50.0,
        _ => {}
    }

    // One-ply probe: the opponent's mark on the cell just taken.
    let mut probe = after.board().clone();
    probe.place(pos, after.current_player());
    if probe.find_square_through(pos).is_some() {
        return 4.0;
    }
    3.0
}

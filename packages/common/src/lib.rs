pub mod aggregate;
pub mod completion;
pub mod hackathon_status;
pub mod leaderboard;
pub mod notification;
pub mod role;
pub mod rubric;

pub use aggregate::{ScoreAggregate, aggregate};
pub use hackathon_status::HackathonStatus;
pub use role::Role;
pub use rubric::{Criterion, RubricError, RubricScores, ScoreSheet};

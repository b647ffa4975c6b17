pub mod hackathon;
pub mod judge_assignment;
pub mod notification;
pub mod prize;
pub mod project;
pub mod project_score;
pub mod user;

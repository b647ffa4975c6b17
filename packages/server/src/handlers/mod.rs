pub mod auth;
pub mod dashboard;
pub mod hackathon;
pub mod judge;
pub mod leaderboard;
pub mod notification;
pub mod project;
pub mod score;

// Analytics result types
pub mod forecast;
pub mod indicators;
pub mod leaderboard;

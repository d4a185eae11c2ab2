pub mod config;
pub mod demo_season;
pub mod export;
pub mod fixture_eval;
pub mod form;
pub mod gameweek;
pub mod leaderboard;
pub mod model;
pub mod outcome;
pub mod season;
pub mod standings;
pub mod store;

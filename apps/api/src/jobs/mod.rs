// Job listings: Postgres-backed lookup and candidate/job match ranking.

pub mod handlers;
pub mod matching;
pub mod repository;

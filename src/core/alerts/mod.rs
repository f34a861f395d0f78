// Alert system module: derives HR alerts from source data and keeps the
// alert table in line with them.
//
// Architecture:
// - model.rs: Alert kinds, candidates and stored alerts
// - rules.rs: One generator per managed alert kind
// - reconcile.rs: Identity-keyed diff between candidates and stored rows
// - store/: Transactional alert storage (SQLite and in-memory)
// - engine.rs: Orchestrates one refresh pass

pub mod engine;
pub mod model;
pub mod reconcile;
pub mod rules;
pub mod store;

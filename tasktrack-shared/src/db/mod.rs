/// Database layer for TaskTrack
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
///
/// Models live in the `models` module and queries in `store::postgres`.

pub mod pool;

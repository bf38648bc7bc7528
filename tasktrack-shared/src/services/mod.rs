/// Domain services
///
/// The services tie the pure policy and lifecycle modules to the storage
/// traits and the notification dispatcher. Each inbound action is handled
/// independently; a failing action never corrupts another in-flight one.
///
/// - `registry`: user accounts, authentication, roles, bootstrap rule
/// - `tasks`: task creation, assignment, lifecycle, comments, deletion

pub mod registry;
pub mod tasks;

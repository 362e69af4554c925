/// Router Module Index
///
/// Splits the dashboard's routes by access level. The route guard layered in
/// `create_router` already redirects unauthenticated requests on protected
/// paths; the `AdminSession` extractor in the authenticated handlers is the
/// second check.

/// Routes reachable without a session (health, sign-in, sign-out).
pub mod public;

/// Dashboard pages; every handler requires an `AdminSession`.
pub mod authenticated;

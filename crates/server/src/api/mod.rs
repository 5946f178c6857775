pub mod handlers;
pub mod manifest;
pub mod middleware;
pub mod routes;
pub mod stream;

pub use routes::create_router;

/// Cache policy sent with manifest and stream responses.
pub const CACHE_CONTROL: &str =
    "max-age=7200, stale-while-revalidate=14400, stale-if-error=604800, public";

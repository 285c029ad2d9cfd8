use axum::Router;

/// A business module mounted into a service binary.
///
/// The binary collects every module and merges their routers.
pub trait Module: Send + Sync {
    /// Module name, used in startup logs.
    fn name(&self) -> &str;

    /// The module's routes, already carrying their `/{name}/v1` prefix.
    fn routes(&self) -> Router;
}

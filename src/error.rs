use thiserror::Error;

/// Errors produced by the window core.
///
/// Apart from [`WindowError::InvalidSize`], which is returned synchronously
/// by construction, these never surface as return values: they reach the
/// application as the cause carried by a [`DestroyEvent`](crate::DestroyEvent).
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("window width and height must be larger than 0 (got {width}x{height})")]
    InvalidSize { width: f32, height: f32 },

    #[error("failed to bind native window: {0:#}")]
    Binding(#[source] anyhow::Error),

    #[error("failed to create rendering context: {0:#}")]
    Context(#[source] anyhow::Error),

    #[error("failed to initialize GPU backend: {0:#}")]
    Backend(#[source] anyhow::Error),
}

/// Everything that can go wrong while setting up or driving a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A push was attempted on a closed buffer.
    ///
    /// The coordinator only closes the buffer after every producer has
    /// returned, so hitting this mid-run means dropped work and is treated
    /// as fatal to the whole run.
    #[error("the buffer is closed")]
    Closed,

    /// The run configuration was rejected before any worker was spawned.
    #[error("invalid run configuration: {0}")]
    Config(String),

    /// A worker thread panicked instead of returning.
    #[error("a worker thread panicked")]
    Panicked,

    /// A worker thread could not be spawned.
    #[error(transparent)]
    ThreadStart(#[from] std::io::Error),
}

impl Error {
    #[inline]
    pub(crate) fn config<T: ToString>(reason: T) -> Self {
        Self::Config(reason.to_string())
    }
}

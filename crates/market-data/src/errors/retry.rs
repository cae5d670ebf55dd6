/// Classification for retry policy.
///
/// Used by the chunked fetch client to decide what to do with a failed chunk.
///
/// | Class | Retry the chunk? |
/// |-------|------------------|
/// | `Never` | No, log and skip it |
/// | `WithBackoff` | Once, after a pause |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The request is fundamentally invalid or the payload is unusable.
    /// Retrying the same range won't help.
    Never,

    /// Transient failure such as rate limiting (429) or a timeout.
    /// The same range may succeed after a pause.
    WithBackoff,
}

/// Problems with layout input that are repaired rather than returned as failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutInputError {
    #[error("edge {v} -> {w} references an unknown node: {missing}")]
    MissingEndpoint {
        v: String,
        w: String,
        missing: String,
    },
}

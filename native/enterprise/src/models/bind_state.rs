use std::fmt::Display;

/// Connection state of the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindState {
    #[default]
    Unbound,
    /// Bind requested, waiting for the connector
    Pending,
    Bound,
}

impl BindState {
    pub fn is_bound(self) -> bool {
        self == Self::Bound
    }
}

impl Display for BindState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Unbound => "unbound",
                Self::Pending => "pending",
                Self::Bound => "bound",
            }
        )
    }
}

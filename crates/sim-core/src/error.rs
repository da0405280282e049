use thiserror::Error;
use types::ConfigError;

/// Allocation problems on the device. Fatal: the engine is never built half-way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("{label} needs {size} bytes, device allows {limit}")]
    BufferTooLarge {
        label: &'static str,
        size: u64,
        limit: u64,
    },
    #[error("{label} needs {groups} workgroups per dimension, device allows {limit}")]
    DispatchTooLarge {
        label: &'static str,
        groups: u32,
        limit: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("resource allocation failed: {0}")]
    Resource(#[from] ResourceError),
    #[error("params ask for {requested} agents but the store holds {allocated}; reset required")]
    AgentCountChanged { requested: u32, allocated: u32 },
}

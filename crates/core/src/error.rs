#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("synthesis failed: {0}")]
    Synthesis(String),

    #[error("failed to persist artefact (path: {path}): {source}", path = path.display())]
    Persistence {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input file: {0}")]
    ReadInput(std::io::Error),
    #[error("failed to deserialize JSON input: {0}")]
    JsonDeserialization(serde_json::Error),
    #[error("failed to deserialize YAML input: {0}")]
    YamlDeserialization(serde_yaml::Error),

    #[error("export task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;

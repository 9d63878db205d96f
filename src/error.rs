use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoscoutError {
    #[error("Dataset error: {0}")]
    Data(#[from] crate::data::DataError),
    #[error("Geometry error: {0}")]
    Geometry(#[from] crate::geometry::GeometryError),
    #[error("Search error: {0}")]
    Search(#[from] crate::search::SearchError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Init Logging error: {0}")]
    InitLogging(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GeoscoutError>;

use countries_core::session::SessionError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to fetch {0}")]
    FetchFailure(String),

    #[error("Country not found: {0}")]
    NotFound(String),

    #[error("Not logged in. Run `countries login --email <EMAIL> --password <PASSWORD>` first")]
    NotAuthenticated,

    #[error(transparent)]
    Session(#[from] SessionError),
}

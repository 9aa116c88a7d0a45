use thiserror::Error;

/// Errors raised while building a document or a message.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The customer cannot be reached on the requested channel.
    #[error("invalid destination: {0}")]
    InvalidDestination(String),
    #[error("invalid month: {0}")]
    InvalidMonth(String),
    #[error("pdf rendering failed: {0}")]
    Pdf(String),
    #[error(transparent)]
    Template(#[from] handlebars::TemplateError),
    #[error(transparent)]
    Render(#[from] handlebars::RenderError),
    #[error(transparent)]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

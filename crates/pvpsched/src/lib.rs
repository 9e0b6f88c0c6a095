pub mod fetcher;
pub mod parser;
pub mod presenter;
pub mod repository;
pub mod types;

pub use fetcher::{
    DocumentFetcher, FetchError, FetcherConfig, HttpDocumentFetcher, StaticDocumentFetcher,
};
pub use presenter::{ConsolePresenter, JsonPresenter, Presenter};
pub use repository::Repository;

pub const DEFAULT_SCHEDULE_URL: &str = "https://www.wizard101.com/pvp/schedule";

use crate::fetcher::{DocumentFetcher, FetchError};
use crate::parser::{parse_rankings, parse_tournaments};
use crate::types::{PlayerRanking, Tournament};

/// Fetches a schedule page and turns its table rows into records.
///
/// Every call fetches and parses the page afresh; nothing is cached between
/// calls.
#[derive(Debug, Clone)]
pub struct Repository<F> {
    fetcher: F,
}

impl<F: DocumentFetcher> Repository<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub async fn fetch_rankings(&self, url: &str) -> Result<Vec<PlayerRanking>, FetchError> {
        let document = self.fetcher.fetch(url).await?;
        Ok(parse_rankings(&document))
    }

    pub async fn fetch_tournaments(&self, url: &str) -> Result<Vec<Tournament>, FetchError> {
        let document = self.fetcher.fetch(url).await?;
        Ok(parse_tournaments(&document))
    }
}

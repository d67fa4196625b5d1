mod fetcher;

pub use fetcher::{HeadlineSource, NewsApiClient};

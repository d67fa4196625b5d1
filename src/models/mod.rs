mod article;

pub use article::{
    Article, ArticleChange, Headline, NewArticle, PendingSentiment, PendingSummary, Sentiment,
};

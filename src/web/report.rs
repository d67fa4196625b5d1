use std::fmt::Write;

use crate::models::{Article, Sentiment};

const HEADER: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Today's Top Headlines</title>
    <style>
        body {
            font-family: Arial, sans-serif;
            line-height: 1.6;
            margin: 20px;
        }
        .article {
            border: 1px solid #ddd;
            padding: 15px;
            margin-bottom: 20px;
            border-radius: 8px;
            box-shadow: 2px 2px 8px rgba(0,0,0,0.1);
        }
        .title {
            font-size: 20px;
            font-weight: bold;
        }
        .summary {
            margin: 10px 0;
        }
        .sentiment {
            font-size: 14px;
            color: #555;
        }
        .positive {
            color: green;
        }
        .negative {
            color: red;
        }
    </style>
</head>
<body>
    <h1>Today's Top Headlines</h1>
"#;

const FOOTER: &str = "</body>\n</html>\n";

/// Renders the daily report. Articles are expected to be fully enriched;
/// a missing summary renders empty and a missing label as NEGATIVE.
pub fn render_report(articles: &[Article]) -> String {
    let mut html = String::from(HEADER);

    for article in articles {
        let sentiment = article.sentiment.unwrap_or(Sentiment::Negative);
        // Writing into a String cannot fail.
        let _ = write!(
            html,
            r#"    <div class="article">
        <div class="title">{title}</div>
        <div class="summary">{summary}</div>
        <div class="sentiment {class}">Sentiment: {label}</div>
        <div class="date">Published on: {published}</div>
    </div>
"#,
            title = escape_html(&article.title),
            summary = escape_html(article.summary.as_deref().unwrap_or_default()),
            class = sentiment.css_class(),
            label = sentiment,
            published = article.published_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }

    html.push_str(FOOTER);
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

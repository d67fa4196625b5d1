use std::collections::HashMap;

use crate::error::Result;

use super::text::{content_terms, split_sentences};

/// Produces an extractive summary: a selection of the input's own sentences.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> Result<String>;
}

/// Term frequency floor given to every cell of a non-empty sentence column.
const SMOOTHING: f64 = 0.4;
/// Share of singular dimensions kept when ranking.
const REDUCTION_RATIO: f64 = 1.0;
const MIN_DIMENSIONS: usize = 3;

const MAX_SWEEPS: usize = 64;
const EPSILON: f64 = 1e-12;

/// Latent semantic analysis summarizer.
///
/// Builds a smoothed term/sentence matrix `A`, decomposes `AᵀA` (whose
/// eigenpairs are the squared singular values and right singular vectors of
/// `A`) and ranks each sentence by its weight across the retained concept
/// dimensions. The best `sentences` are returned in document order.
pub struct LsaSummarizer {
    sentences: usize,
}

impl LsaSummarizer {
    pub fn new(sentences: usize) -> Self {
        Self { sentences }
    }

    fn rank_sentences(&self, matrix: &[Vec<f64>]) -> Vec<f64> {
        let n = matrix.first().map(Vec::len).unwrap_or(0);
        let gram: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| matrix.iter().map(|row| row[i] * row[j]).sum())
                    .collect()
            })
            .collect();

        let (eigenvalues, vectors) = symmetric_eigen(gram);

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));
        let dimensions = MIN_DIMENSIONS.max((n as f64 * REDUCTION_RATIO) as usize);
        let kept = &order[..dimensions.min(n)];

        (0..n)
            .map(|j| {
                kept.iter()
                    .map(|&d| eigenvalues[d].max(0.0) * vectors[j][d].powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    }
}

impl Default for LsaSummarizer {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Summarizer for LsaSummarizer {
    fn summarize(&self, text: &str) -> Result<String> {
        let sentences = split_sentences(text);
        let terms: Vec<Vec<String>> = sentences.iter().map(|s| content_terms(s)).collect();

        // No content terms means nothing to rank: the summary is empty.
        if terms.iter().all(Vec::is_empty) {
            return Ok(String::new());
        }
        if sentences.len() <= self.sentences {
            return Ok(sentences.join(" "));
        }

        let matrix = term_sentence_matrix(&terms);
        let ranks = self.rank_sentences(&matrix);

        let mut chosen: Vec<usize> = (0..sentences.len()).collect();
        // Stable sort: equal ranks favour the earlier sentence.
        chosen.sort_by(|&a, &b| ranks[b].total_cmp(&ranks[a]));
        chosen.truncate(self.sentences);
        chosen.sort_unstable();

        Ok(chosen
            .into_iter()
            .map(|i| sentences[i])
            .collect::<Vec<_>>()
            .join(" "))
    }
}

/// Rows are terms, columns are sentences. Counts are normalised by the most
/// frequent term of the sentence and smoothed; all-stop-word sentences stay zero.
fn term_sentence_matrix(sentences: &[Vec<String>]) -> Vec<Vec<f64>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    for term in sentences.iter().flatten() {
        let next = index.len();
        index.entry(term.as_str()).or_insert(next);
    }

    let mut matrix = vec![vec![0.0; sentences.len()]; index.len()];
    for (col, terms) in sentences.iter().enumerate() {
        for term in terms {
            matrix[index[term.as_str()]][col] += 1.0;
        }
    }

    for col in 0..sentences.len() {
        let max = matrix.iter().map(|row| row[col]).fold(0.0, f64::max);
        if max > 0.0 {
            for row in matrix.iter_mut() {
                row[col] = SMOOTHING + (1.0 - SMOOTHING) * row[col] / max;
            }
        }
    }
    matrix
}

/// Cyclic Jacobi eigenvalue algorithm for a symmetric matrix. Returns the
/// eigenvalues and a matrix whose columns are the matching unit eigenvectors.
fn symmetric_eigen(mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = a.len();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for _ in 0..MAX_SWEEPS {
        let off_diagonal: f64 = (0..n)
            .flat_map(|p| (p + 1..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q].powi(2))
            .sum();
        if off_diagonal < EPSILON {
            break;
        }

        for p in 0..n {
            for q in p + 1..n {
                if a[p][q].abs() < f64::EPSILON {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let (akp, akq) = (a[k][p], a[k][q]);
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    ((0..n).map(|i| a[i][i]).collect(), v)
}

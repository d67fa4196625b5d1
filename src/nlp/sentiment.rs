use crate::error::Result;

use super::lexicon::{booster, is_negation, valence};
use super::text::words;

/// Scores the overall valence of a text as a compound value in `[-1, 1]`.
pub trait PolarityAnalyzer: Send + Sync {
    fn compound(&self, text: &str) -> Result<f64>;
}

const NORMALIZATION_ALPHA: f64 = 15.0;
const CAPS_INCREMENT: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const BUT_BEFORE: f64 = 0.5;
const BUT_AFTER: f64 = 1.5;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const QUESTION_INCREMENT: f64 = 0.18;
const LOOKBACK: usize = 3;

/// Rule-based analyzer over a fixed valence lexicon, in the style of VADER:
/// per-word valences adjusted for capitalisation, intensifiers, negation,
/// contrastive "but" and trailing punctuation, then squashed into `[-1, 1]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconAnalyzer;

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl PolarityAnalyzer for LexiconAnalyzer {
    fn compound(&self, text: &str) -> Result<f64> {
        let tokens: Vec<&str> = words(text).collect();
        let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();

        let shouting = tokens.iter().filter(|t| is_shouting(t)).count();
        let mixed_case = shouting > 0 && shouting < tokens.len();

        let mut valences: Vec<f64> = Vec::with_capacity(tokens.len());
        for (i, word) in lower.iter().enumerate() {
            let Some(mut v) = valence(word) else {
                valences.push(0.0);
                continue;
            };

            if mixed_case && is_shouting(tokens[i]) {
                v += CAPS_INCREMENT.copysign(v);
            }

            for distance in 1..=LOOKBACK.min(i) {
                let j = i - distance;
                if let Some(boost) = booster(&lower[j]) {
                    let mut scalar = boost * v.signum();
                    if mixed_case && is_shouting(tokens[j]) {
                        scalar += CAPS_INCREMENT.copysign(v);
                    }
                    let decay = match distance {
                        1 => 1.0,
                        2 => 0.95,
                        _ => 0.9,
                    };
                    v += scalar * decay;
                }
            }

            if (1..=LOOKBACK.min(i)).any(|distance| is_negation(&lower[i - distance])) {
                v *= NEGATION_SCALAR;
            }

            valences.push(v);
        }

        if let Some(pivot) = lower.iter().position(|w| w == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *v *= BUT_BEFORE;
                } else if i > pivot {
                    *v *= BUT_AFTER;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum != 0.0 {
            sum += punctuation_emphasis(text).copysign(sum);
        }

        Ok(normalize(sum))
    }
}

fn is_shouting(token: &str) -> bool {
    token.chars().count() > 1
        && token.chars().any(char::is_alphabetic)
        && !token.chars().any(char::is_lowercase)
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(4) as f64;
    let questions = text.matches('?').count();
    let question_emphasis = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_INCREMENT,
        _ => 0.96,
    };
    exclamations * EXCLAMATION_INCREMENT + question_emphasis
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

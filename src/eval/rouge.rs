use serde::Serialize;
use std::collections::HashMap;

/// Scores a generated summary against a reference.
pub trait Evaluator {
    fn score(&self, prediction: &str, reference: &str) -> RougeScores;
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct Score {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl Score {
    fn from_counts(hits: usize, prediction_len: usize, reference_len: usize) -> Self {
        if hits == 0 || prediction_len == 0 || reference_len == 0 {
            return Self::default();
        }
        let precision = hits as f64 / prediction_len as f64;
        let recall = hits as f64 / reference_len as f64;
        Self {
            precision,
            recall,
            fmeasure: 2.0 * precision * recall / (precision + recall),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct RougeScores {
    pub rouge1: Score,
    pub rouge2: Score,
    pub rouge_l: Score,
    pub rouge_lsum: Score,
}

impl RougeScores {
    /// Mean F-measure of each metric over a set of scores.
    pub fn mean_fmeasure(scores: &[RougeScores]) -> RougeScores {
        if scores.is_empty() {
            return RougeScores::default();
        }
        let n = scores.len() as f64;
        let mean = |pick: fn(&RougeScores) -> f64| Score {
            fmeasure: scores.iter().map(pick).sum::<f64>() / n,
            ..Score::default()
        };
        RougeScores {
            rouge1: mean(|s| s.rouge1.fmeasure),
            rouge2: mean(|s| s.rouge2.fmeasure),
            rouge_l: mean(|s| s.rouge_l.fmeasure),
            rouge_lsum: mean(|s| s.rouge_lsum.fmeasure),
        }
    }
}

/// ROUGE-1/2/L/Lsum without stemming.
#[derive(Debug, Clone, Copy, Default)]
pub struct RougeScorer;

impl Evaluator for RougeScorer {
    fn score(&self, prediction: &str, reference: &str) -> RougeScores {
        let pred = tokenize(prediction);
        let refs = tokenize(reference);

        RougeScores {
            rouge1: ngram_overlap(&pred, &refs, 1),
            rouge2: ngram_overlap(&pred, &refs, 2),
            rouge_l: {
                let hits = lcs_table(&refs, &pred)[refs.len()][pred.len()];
                Score::from_counts(hits, pred.len(), refs.len())
            },
            rouge_lsum: summary_level_lcs(&split_sentences(prediction), &split_sentences(reference)),
        }
    }
}

/// Lowercase, then split on anything that is not ASCII alphanumeric.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// One tokenized sentence per line, after breaking on ". ".
fn split_sentences(text: &str) -> Vec<Vec<String>> {
    text.replace(". ", ".\n")
        .lines()
        .map(tokenize)
        .filter(|s| !s.is_empty())
        .collect()
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for gram in tokens.windows(n) {
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

fn ngram_overlap(pred: &[String], refs: &[String], n: usize) -> Score {
    let pred_counts = ngram_counts(pred, n);
    let ref_counts = ngram_counts(refs, n);

    let hits = ref_counts
        .iter()
        .map(|(gram, &r)| pred_counts.get(gram).map_or(0, |&p| p.min(r)))
        .sum();

    Score::from_counts(
        hits,
        pred_counts.values().sum(),
        ref_counts.values().sum(),
    )
}

fn lcs_table(a: &[String], b: &[String]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0; b.len() + 1]; a.len() + 1];
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            table[i][j] = if a[i - 1] == b[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }
    table
}

/// Indices into `a` that take part in one longest common subsequence with `b`.
fn lcs_indices(a: &[String], b: &[String]) -> Vec<usize> {
    let table = lcs_table(a, b);
    let (mut i, mut j) = (a.len(), b.len());
    let mut indices = Vec::new();
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            indices.push(i - 1);
            i -= 1;
            j -= 1;
        } else if table[i - 1][j] >= table[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    indices.reverse();
    indices
}

fn summary_level_lcs(pred: &[Vec<String>], refs: &[Vec<String>]) -> Score {
    let pred_len: usize = pred.iter().map(Vec::len).sum();
    let ref_len: usize = refs.iter().map(Vec::len).sum();
    if pred_len == 0 || ref_len == 0 {
        return Score::default();
    }

    let mut pred_budget: HashMap<&str, usize> = HashMap::new();
    for token in pred.iter().flatten() {
        *pred_budget.entry(token.as_str()).or_insert(0) += 1;
    }
    let mut ref_budget: HashMap<&str, usize> = HashMap::new();
    for token in refs.iter().flatten() {
        *ref_budget.entry(token.as_str()).or_insert(0) += 1;
    }

    let mut hits = 0;
    for sentence in refs {
        // Union of LCS hits of this reference sentence against every predicted sentence
        let mut union: Vec<usize> = pred
            .iter()
            .flat_map(|candidate| lcs_indices(sentence, candidate))
            .collect();
        union.sort_unstable();
        union.dedup();

        for idx in union {
            let token = sentence[idx].as_str();
            let (Some(p), Some(r)) = (pred_budget.get_mut(token), ref_budget.get_mut(token)) else {
                continue;
            };
            if *p > 0 && *r > 0 {
                *p -= 1;
                *r -= 1;
                hits += 1;
            }
        }
    }

    Score::from_counts(hits, pred_len, ref_len)
}

//! In-memory [`SearchBackend`] built from a document collection.
//!
//! The index is built once and never mutated. Each document's id is its
//! position in the collection, so results can always be traced back to the
//! source document.
//!
//! Scoring is BM25 per field, weighted by the field boost (title ranks above
//! content by default) and the clause boost, summed per document. Ties are
//! broken by ascending id.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;

use crate::models::{Document, SearchResult};
use crate::query::{self, Clause, Field, Presence, QueryParseError};

use super::{BackendError, SearchBackend};

const BM25_K1: f64 = 1.2;
const BM25_B: f64 = 0.75;

/// Per-field weighting applied at query time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeights {
    pub title: f64,
    pub content: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 10.0,
            content: 1.0,
        }
    }
}

impl FieldWeights {
    fn get(&self, field: Field) -> f64 {
        match field {
            Field::Title => self.title,
            Field::Content => self.content,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Posting {
    doc: usize,
    tf: usize,
}

#[derive(Debug, Default)]
struct FieldIndex {
    postings: BTreeMap<String, Vec<Posting>>,
    lengths: Vec<usize>,
    avg_len: f64,
}

impl FieldIndex {
    fn add(&mut self, doc: usize, text: &str) {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut len = 0;
        for token in tokenize(text) {
            *counts.entry(token).or_default() += 1;
            len += 1;
        }
        for (term, tf) in counts {
            self.postings.entry(term).or_default().push(Posting { doc, tf });
        }
        self.lengths.push(len);
    }

    fn finish(&mut self) {
        let total: usize = self.lengths.iter().sum();
        self.avg_len = if self.lengths.is_empty() || total == 0 {
            1.0
        } else {
            total as f64 / self.lengths.len() as f64
        };
        for postings in self.postings.values_mut() {
            postings.sort_by_key(|p| p.doc);
        }
    }

    /// Vocabulary terms a clause expands to.
    fn expand<'a>(&'a self, clause: &'a Clause) -> Vec<&'a str> {
        if clause.has_wildcard() {
            self.postings
                .keys()
                .filter(|t| query::wildcard_match(&clause.term, t))
                .map(String::as_str)
                .collect()
        } else if clause.edit_distance > 0 {
            self.postings
                .keys()
                .filter(|t| strsim::levenshtein(&clause.term, t) <= clause.edit_distance)
                .map(String::as_str)
                .collect()
        } else if self.postings.contains_key(&clause.term) {
            vec![clause.term.as_str()]
        } else {
            Vec::new()
        }
    }

    fn bm25(&self, tf: usize, df: usize, doc: usize, n_docs: usize) -> f64 {
        let n = n_docs as f64;
        let df = df as f64;
        let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
        let tf = tf as f64;
        let len = self.lengths.get(doc).copied().unwrap_or(0) as f64;
        let norm = 1.0 - BM25_B + BM25_B * len / self.avg_len;
        idf * (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * norm)
    }
}

/// Lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Immutable term index over a document collection.
pub struct MemoryIndex {
    documents: Vec<Document>,
    title: FieldIndex,
    content: FieldIndex,
    weights: FieldWeights,
    max_results: usize,
}

impl MemoryIndex {
    /// Build the index, assigning each document its positional id.
    pub fn build(mut documents: Vec<Document>, weights: FieldWeights, max_results: usize) -> Self {
        let mut title = FieldIndex::default();
        let mut content = FieldIndex::default();
        for (i, doc) in documents.iter_mut().enumerate() {
            doc.id = i.to_string();
            title.add(i, doc.title.as_deref().unwrap_or(""));
            content.add(i, &doc.content);
        }
        title.finish();
        content.finish();

        Self {
            documents,
            title,
            content,
            weights,
            max_results,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Look up a document by its positional id.
    pub fn document(&self, id: &str) -> Option<&Document> {
        id.parse::<usize>().ok().and_then(|i| self.documents.get(i))
    }

    fn field(&self, field: Field) -> &FieldIndex {
        match field {
            Field::Title => &self.title,
            Field::Content => &self.content,
        }
    }

    /// Synchronous search; the [`SearchBackend`] impl delegates here.
    pub fn query(&self, query: &str) -> Result<Vec<SearchResult>, QueryParseError> {
        let clauses = query::parse(query)?;
        if clauses.is_empty() || self.documents.is_empty() {
            return Ok(Vec::new());
        }

        let n_docs = self.documents.len();
        let mut scores: HashMap<usize, f64> = HashMap::new();
        let mut required: Vec<HashSet<usize>> = Vec::new();
        let mut prohibited: HashSet<usize> = HashSet::new();
        let mut any_positive = false;

        for clause in &clauses {
            let mut matched: HashSet<usize> = HashSet::new();
            let mut clause_scores: HashMap<usize, f64> = HashMap::new();

            for field in clause.fields() {
                let index = self.field(field);
                let weight = self.weights.get(field) * clause.boost;
                for term in index.expand(clause) {
                    let Some(postings) = index.postings.get(term) else {
                        continue;
                    };
                    for p in postings {
                        matched.insert(p.doc);
                        *clause_scores.entry(p.doc).or_default() +=
                            index.bm25(p.tf, postings.len(), p.doc, n_docs) * weight;
                    }
                }
            }

            match clause.presence {
                Presence::Prohibited => prohibited.extend(matched),
                Presence::Required => {
                    any_positive = true;
                    required.push(matched);
                    merge_scores(&mut scores, clause_scores);
                }
                Presence::Optional => {
                    any_positive = true;
                    merge_scores(&mut scores, clause_scores);
                }
            }
        }

        if !any_positive {
            scores = (0..n_docs).map(|i| (i, 0.0)).collect();
        }

        let mut hits: Vec<(usize, f64)> = scores
            .into_iter()
            .filter(|(doc, _)| !prohibited.contains(doc))
            .filter(|(doc, _)| required.iter().all(|set| set.contains(doc)))
            .collect();

        hits.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        hits.truncate(self.max_results);

        Ok(hits
            .into_iter()
            .map(|(i, score)| {
                let doc = &self.documents[i];
                SearchResult {
                    reference: doc.id.clone(),
                    title: doc.display_title(),
                    link: doc.link(),
                    snippet: doc.content.clone(),
                    score,
                }
            })
            .collect())
    }
}

fn merge_scores(into: &mut HashMap<usize, f64>, from: HashMap<usize, f64>) {
    for (doc, score) in from {
        *into.entry(doc).or_default() += score;
    }
}

#[async_trait]
impl SearchBackend for MemoryIndex {
    fn name(&self) -> &str {
        "memory"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, BackendError> {
        Ok(self.query(query)?)
    }
}

//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, RocchioArgs};
use crate::error::Result;
use crate::expansion::{Expansion, ExpandedTerm};

/// Result structure for a query expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionResult {
    pub index: String,
    pub query: String,
    /// `term^weight` boosted query, heaviest term first.
    pub expanded_query: String,
    /// Expansion terms by descending weight.
    pub terms: Vec<ExpandedTerm>,
    pub feedback_documents: Vec<String>,
    pub duration_ms: u64,
}

impl ExpansionResult {
    pub fn new(index: &str, query: &str, expansion: &Expansion, duration_ms: u64) -> Self {
        ExpansionResult {
            index: index.to_string(),
            query: query.to_string(),
            expanded_query: expansion.vector.to_boosted_query(),
            terms: expansion.vector.ranked(),
            feedback_documents: expansion.feedback_documents.clone(),
            duration_ms,
        }
    }
}

/// Output a result in the specified format.
pub fn output_result(message: &str, result: &ExpansionResult, args: &RocchioArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
                println!();
            }
            print!("{}", format_human(result));
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &RocchioArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

/// Render an expansion as a boosted query followed by a ranked term table.
pub fn format_human(result: &ExpansionResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("Query: {}\n", result.query));
    out.push_str(&format!("Expanded: {}\n", result.expanded_query.trim_end()));
    out.push('\n');

    if result.terms.is_empty() {
        out.push_str("No expansion terms.\n");
    } else {
        let width = result
            .terms
            .iter()
            .map(|t| t.term.chars().count())
            .max()
            .unwrap_or(0)
            .max("Term".len());
        out.push_str(&format!("{:>4}  {:<width$}  {}\n", "#", "Term", "Weight"));
        out.push_str(&format!("{}\n", "─".repeat(width + 16)));
        for (rank, term) in result.terms.iter().enumerate() {
            out.push_str(&format!(
                "{:>4}  {:<width$}  {:.6}\n",
                rank + 1,
                term.term,
                term.weight
            ));
        }
    }

    out.push('\n');
    out.push_str(&format!(
        "Feedback documents: {} ({}ms)\n",
        result.feedback_documents.len(),
        result.duration_ms
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::backend::{MemoryBackend, MemoryIndex};
    use crate::expansion::{RocchioConfig, RocchioExpander};

    fn result() -> ExpansionResult {
        ExpansionResult {
            index: "biocaddie".to_string(),
            query: "brain".to_string(),
            expanded_query: "brain^0.5 lesion^0.25 ".to_string(),
            terms: vec![
                ExpandedTerm {
                    term: "brain".to_string(),
                    weight: 0.5,
                },
                ExpandedTerm {
                    term: "lesion".to_string(),
                    weight: 0.25,
                },
            ],
            feedback_documents: vec!["d1".to_string(), "d2".to_string()],
            duration_ms: 3,
        }
    }

    #[test]
    fn test_format_human() {
        let text = format_human(&result());
        assert!(text.contains("Expanded: brain^0.5 lesion^0.25\n"));
        assert!(text.contains("   1  brain   0.500000"));
        assert!(text.contains("   2  lesion  0.250000"));
        assert!(text.contains("Feedback documents: 2 (3ms)"));
    }

    #[test]
    fn test_format_human_without_terms() {
        let mut empty = result();
        empty.terms.clear();
        empty.expanded_query.clear();
        assert!(format_human(&empty).contains("No expansion terms."));
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(result()).unwrap();
        assert_eq!(value["expanded_query"], "brain^0.5 lesion^0.25 ");
        assert_eq!(value["terms"][1]["term"], "lesion");
        assert_eq!(value["feedback_documents"][0], "d1");
    }

    #[tokio::test]
    async fn test_term_table_is_ranked_when_nothing_is_clipped() {
        let mut index = MemoryIndex::default();
        index
            .add_document("1", [("body", "dog zebra apple zebra")])
            .unwrap();
        index.add_document("2", [("body", "zebra cat apple")]).unwrap();
        index.add_document("3", [("body", "cat dog")]).unwrap();
        let backend = Arc::new(MemoryBackend::new().with_index("zoo", index));

        let config = RocchioConfig::default().with_field("body").with_fb_terms(100);
        let expander = RocchioExpander::with_backend(backend, config).unwrap();
        let expansion = expander.expand_detailed("zoo", "zebra").await.unwrap();
        assert!(expansion.vector.len() < 100);

        let result = ExpansionResult::new("zoo", "zebra", &expansion, 1);
        let weights: Vec<f64> = result.terms.iter().map(|t| t.weight).collect();
        assert_eq!(weights.len(), expansion.vector.len());
        assert!(weights.windows(2).all(|p| p[0] >= p[1]));

        let rendered: Vec<&str> = result
            .expanded_query
            .split_whitespace()
            .filter_map(|pair| pair.split_once('^').map(|(term, _)| term))
            .collect();
        let ranked: Vec<&str> = result.terms.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(rendered, ranked);

        let table = format_human(&result);
        let first_row = format!("   1  {:<5}", result.terms[0].term);
        assert!(table.contains(&first_row));
    }
}

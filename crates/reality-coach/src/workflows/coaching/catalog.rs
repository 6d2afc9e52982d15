use std::io::Read;

use serde::{Deserialize, Serialize};

use super::domain::Bucket;

/// Catalog entry rendered into session questions. Patterns carry named
/// `{placeholder}` slots resolved by the selector's substitution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionTemplate {
    pub bucket: Bucket,
    pub pattern: String,
    pub weight: u8,
    pub is_active: bool,
}

/// Fixed facts about practicing a role in a region, used to enrich template
/// substitution. Never required for scoring correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerFact {
    pub state: String,
    pub role: String,
    pub licensing: String,
    pub training: String,
    pub cost: String,
    pub salary: String,
    pub links: Vec<String>,
}

/// Searchable occupation profile consumed by the alt-career suggestion step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerProfile {
    pub title: String,
    pub personality_tags: Vec<String>,
    pub reality_tags: Vec<String>,
}

/// Tag sets driving an alternative-career search. A profile matches when it
/// shares at least one tag with either set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTags {
    pub personality: Vec<String>,
    pub realities: Vec<String>,
}

/// Error enumeration for catalog and directory lookups. Lookup failures are
/// non-fatal to the core: callers degrade to documented fallbacks.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only question-template source.
pub trait QuestionCatalog: Send + Sync {
    /// Active templates ordered by weight descending, optionally restricted
    /// to one bucket. Catalog order breaks weight ties.
    fn active_templates(
        &self,
        bucket: Option<Bucket>,
    ) -> Result<Vec<QuestionTemplate>, CatalogError>;
}

/// Read-only career knowledge: per-region facts plus the alt-career corpus.
pub trait CareerDirectory: Send + Sync {
    fn fact(&self, state: &str, role: &str) -> Result<Option<CareerFact>, CatalogError>;
    fn search(&self, tags: &SearchTags) -> Result<Vec<CareerProfile>, CatalogError>;
}

/// Error raised while hydrating a template catalog from a CSV export.
#[derive(Debug, thiserror::Error)]
pub enum TemplateCsvError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown bucket '{value}'")]
    UnknownBucket { row: usize, value: String },
    #[error("row {row}: weight {value} outside 1-10")]
    WeightOutOfRange { row: usize, value: u8 },
}

#[derive(Debug, Deserialize)]
struct TemplateRow {
    bucket: String,
    pattern: String,
    weight: u8,
    #[serde(default = "default_active")]
    is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Parse `bucket,pattern,weight[,is_active]` rows into catalog templates.
/// Row numbers in errors are 1-based and exclude the header.
pub fn load_templates_csv<R: Read>(reader: R) -> Result<Vec<QuestionTemplate>, TemplateCsvError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut templates = Vec::new();

    for (index, record) in csv_reader.deserialize::<TemplateRow>().enumerate() {
        let row = index + 1;
        let parsed = record?;

        let bucket = Bucket::parse(&parsed.bucket).ok_or_else(|| {
            TemplateCsvError::UnknownBucket {
                row,
                value: parsed.bucket.clone(),
            }
        })?;

        if parsed.weight < 1 || parsed.weight > 10 {
            return Err(TemplateCsvError::WeightOutOfRange {
                row,
                value: parsed.weight,
            });
        }

        templates.push(QuestionTemplate {
            bucket,
            pattern: parsed.pattern,
            weight: parsed.weight,
            is_active: parsed.is_active,
        });
    }

    Ok(templates)
}

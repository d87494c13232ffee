//! Static matching configuration: domain taxonomy and scoring weights.
//!
//! Loaded once at process start and never mutated afterwards.
//! The engine holds it behind an `Arc` so concurrent matching calls
//! share one read-only copy.

use serde::{Deserialize, Serialize};

// ── Domain taxonomy ───────────────────────────────────────────────

/// One business domain with its representative skill keywords and the
/// department-name substrings considered aligned with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEntry {
    pub domain: String,
    pub keywords: Vec<String>,
    pub departments: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct DomainTaxonomyFile {
    domains: Vec<DomainEntry>,
}

/// Ordered domain taxonomy. Lookups are case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainTaxonomy {
    entries: Vec<DomainEntry>, // ordered, not HashMap
}

impl DomainTaxonomy {
    /// Build a taxonomy, lowercasing every domain, keyword and department.
    pub fn new(entries: Vec<DomainEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| DomainEntry {
                domain: e.domain.trim().to_lowercase(),
                keywords: e.keywords.iter().map(|k| k.to_lowercase()).collect(),
                departments: e.departments.iter().map(|d| d.to_lowercase()).collect(),
            })
            .collect();
        Self { entries }
    }

    pub fn entry(&self, domain: &str) -> Option<&DomainEntry> {
        let key = domain.trim().to_lowercase();
        self.entries.iter().find(|e| e.domain == key)
    }

    /// Keywords for `domain`, or `None` when the domain is not in the taxonomy.
    pub fn keywords_for(&self, domain: &str) -> Option<&[String]> {
        self.entry(domain).map(|e| e.keywords.as_slice())
    }

    /// Aligned department substrings for `domain`.
    pub fn departments_for(&self, domain: &str) -> Option<&[String]> {
        self.entry(domain).map(|e| e.departments.as_slice())
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.entry(domain).is_some()
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.domain.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The taxonomy the matcher ships with.
    pub fn builtin() -> Self {
        fn entry(domain: &str, keywords: &[&str], departments: &[&str]) -> DomainEntry {
            DomainEntry {
                domain: domain.into(),
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
                departments: departments.iter().map(|s| s.to_string()).collect(),
            }
        }

        Self::new(vec![
            entry(
                "frontend",
                &["javascript", "react", "vue", "angular", "html", "css", "ui", "ux"],
                &["engineering", "development", "frontend"],
            ),
            entry(
                "backend",
                &["python", "java", "node.js", "php", "ruby", "api", "database", "sql"],
                &["engineering", "development", "backend"],
            ),
            entry(
                "devops",
                &["docker", "kubernetes", "aws", "azure", "ci/cd", "deployment", "infrastructure"],
                &["engineering", "devops", "infrastructure"],
            ),
            entry(
                "mobile",
                &["ios", "android", "react native", "flutter", "mobile", "app"],
                &["engineering", "development", "mobile"],
            ),
            entry(
                "data",
                &["python", "sql", "machine learning", "ai", "analytics", "data science"],
                &["data", "analytics", "engineering"],
            ),
            entry(
                "security",
                &["security", "authentication", "authorization", "encryption", "penetration testing"],
                &["security", "engineering"],
            ),
            entry(
                "qa",
                &["testing", "qa", "quality assurance", "automation", "selenium", "test"],
                &["qa", "testing", "engineering"],
            ),
            entry(
                "design",
                &["ui", "ux", "design", "figma", "adobe", "photoshop", "illustrator"],
                &["design", "ux", "ui"],
            ),
        ])
    }
}

// ── Scoring weights ───────────────────────────────────────────────

/// Per-factor multipliers and the fixed saturation points of each factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Flat base added for every (pre-filtered, available) candidate.
    pub availability_base: f64,
    pub domain_expertise: f64,
    pub skills_match: f64,
    pub workload_balance: f64,
    pub priority_handling: f64,
    pub task_type_experience: f64,
    pub department_alignment: f64,

    /// Active task count at which the task-count part of workload hits 0.
    pub task_count_saturation: f64,
    /// Active estimated hours at which the hours part of workload hits 0.
    pub hours_saturation: f64,
    pub task_count_share: f64,
    pub hours_share: f64,
    /// Active high-priority tasks at which priority handling hits 0.
    pub high_priority_saturation: f64,
    /// Prior same-type assignments at which experience saturates at 1.0.
    pub experience_saturation: f64,
    /// Neutral value for ambiguous factors (unknown domain, non-high priority).
    pub neutral: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            availability_base: 10.0,
            domain_expertise: 20.0,
            skills_match: 15.0,
            workload_balance: 10.0,
            priority_handling: 8.0,
            task_type_experience: 5.0,
            department_alignment: 3.0,
            task_count_saturation: 5.0,
            hours_saturation: 40.0,
            task_count_share: 0.6,
            hours_share: 0.4,
            high_priority_saturation: 3.0,
            experience_saturation: 10.0,
            neutral: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct WeightsFile {
    weights: ScoringWeights,
    urgency: Vec<(String, f64)>,
    #[serde(default)]
    apply_urgency_multiplier: bool,
    #[serde(default = "default_recommend_limit")]
    default_recommend_limit: usize,
}

fn default_recommend_limit() -> usize {
    5
}

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub taxonomy: DomainTaxonomy,
    pub weights: ScoringWeights,
    /// Task-type urgency multipliers. Unlisted types use 1.0.
    pub urgency: Vec<(String, f64)>, // ordered, not HashMap
    /// When set, the composite score is multiplied by the task type's
    /// urgency. Off by default: legacy scores never applied it.
    pub apply_urgency_multiplier: bool,
    pub default_recommend_limit: usize,
}

impl MatchConfig {
    /// Load from the data/ directory.
    /// In tests, use MatchConfig::builtin().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let taxonomy_path = format!("{data_dir}/taxonomy/domains.json");
        let taxonomy_content = std::fs::read_to_string(&taxonomy_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {taxonomy_path}: {e}"))?;
        let taxonomy_file: DomainTaxonomyFile = serde_json::from_str(&taxonomy_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {taxonomy_path}: {e}"))?;

        let weights_path = format!("{data_dir}/scoring/weights.json");
        let weights_content = std::fs::read_to_string(&weights_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {weights_path}: {e}"))?;
        let weights_file: WeightsFile = serde_json::from_str(&weights_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {weights_path}: {e}"))?;

        if taxonomy_file.domains.is_empty() {
            anyhow::bail!("{taxonomy_path} defines no domains");
        }

        Ok(Self {
            taxonomy: DomainTaxonomy::new(taxonomy_file.domains),
            weights: weights_file.weights,
            urgency: weights_file
                .urgency
                .into_iter()
                .map(|(t, m)| (t.to_lowercase(), m))
                .collect(),
            apply_urgency_multiplier: weights_file.apply_urgency_multiplier,
            default_recommend_limit: weights_file.default_recommend_limit,
        })
    }

    /// Built-in taxonomy and weights. Used by tests and when no data
    /// directory is available.
    pub fn builtin() -> Self {
        Self {
            taxonomy: DomainTaxonomy::builtin(),
            weights: ScoringWeights::default(),
            urgency: vec![
                ("bug".into(), 1.2),
                ("incident".into(), 1.5),
                ("feature".into(), 1.0),
                ("task".into(), 1.0),
                ("story".into(), 1.0),
            ],
            apply_urgency_multiplier: false,
            default_recommend_limit: default_recommend_limit(),
        }
    }

    /// Urgency multiplier for a canonical task-type name.
    pub fn urgency_for(&self, task_type: &str) -> f64 {
        self.urgency
            .iter()
            .find(|(t, _)| t == task_type)
            .map(|(_, m)| *m)
            .unwrap_or(1.0)
    }
}

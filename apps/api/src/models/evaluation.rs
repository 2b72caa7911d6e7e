use serde::{Deserialize, Serialize};

/// The six rated dimensions of an answer, in their canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Relevance,
    TechnicalAccuracy,
    Clarity,
    Completeness,
    Examples,
    Depth,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Relevance,
        Metric::TechnicalAccuracy,
        Metric::Clarity,
        Metric::Completeness,
        Metric::Examples,
        Metric::Depth,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Metric::Relevance => "relevance",
            Metric::TechnicalAccuracy => "technical_accuracy",
            Metric::Clarity => "clarity",
            Metric::Completeness => "completeness",
            Metric::Examples => "examples",
            Metric::Depth => "depth",
        }
    }
}

/// Per-dimension scores, each 1 – 10. A missing field means the rating did not report it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetailedScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completeness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

impl DetailedScores {
    /// Same score on every dimension.
    pub fn uniform(score: f64) -> Self {
        Self {
            relevance: Some(score),
            technical_accuracy: Some(score),
            clarity: Some(score),
            completeness: Some(score),
            examples: Some(score),
            depth: Some(score),
        }
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Relevance => self.relevance,
            Metric::TechnicalAccuracy => self.technical_accuracy,
            Metric::Clarity => self.clarity,
            Metric::Completeness => self.completeness,
            Metric::Examples => self.examples,
            Metric::Depth => self.depth,
        }
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        let slot = match metric {
            Metric::Relevance => &mut self.relevance,
            Metric::TechnicalAccuracy => &mut self.technical_accuracy,
            Metric::Clarity => &mut self.clarity,
            Metric::Completeness => &mut self.completeness,
            Metric::Examples => &mut self.examples,
            Metric::Depth => &mut self.depth,
        };
        *slot = value;
    }

    /// Clamps every reported score into [1, 10].
    pub fn clamped(mut self) -> Self {
        for metric in Metric::ALL {
            let value = self.get(metric).map(|v| v.clamp(1.0, 10.0));
            self.set(metric, value);
        }
        self
    }
}

/// Which path produced the base score and sub-scores of an evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RatingSource {
    /// Structured JSON rating from the semantic rater.
    Structured,
    /// Numbers recovered positionally from an unstructured rater response.
    Heuristic,
    /// Rater unavailable or unparseable; every sub-score equals the length-based score.
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinguisticMetrics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    /// Flesch reading ease.
    pub readability_score: f64,
    /// Flesch–Kincaid grade level.
    pub grade_level: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentMetrics {
    pub sentiment: Sentiment,
    pub compound: f64,
    /// 0 – 1
    pub confidence_score: f64,
    pub positive_score: f64,
    pub negative_score: f64,
    pub neutral_score: f64,
}

/// The deltas applied on top of the base score.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Adjustments {
    pub word_count: f64,
    pub readability: f64,
    pub confidence: f64,
}

/// Composite quality score for one submitted answer. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    /// Base score before local adjustments, 1 – 10.
    pub overall_score: f64,
    /// Composite score after adjustments, 1 – 10.
    pub final_score: f64,
    pub detailed_scores: DetailedScores,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub feedback: String,
    pub confidence: f64,
    pub linguistic_metrics: LinguisticMetrics,
    pub sentiment_metrics: SentimentMetrics,
    pub adjustments: Adjustments,
    pub source: RatingSource,
}

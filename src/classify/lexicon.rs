//! Offline keyword-scoring backend.
//!
//! Each stage counts keyword hits per label and picks the best-scoring one.
//! It needs no network and no model files, which makes it the default for
//! dry runs and the backend used throughout the test suite.
//!
//! Keywords are matched against lowercase word tokens. A keyword ending in
//! `*` matches any token with that prefix (`econom*` matches `economy` and
//! `economic`).
//!
//! # Example
//!
//! ```rust
//! use chatlens::classify::{ClassifierBackend, Lexicon, LexiconBackend, Prediction, Stage, TopicVocabulary};
//!
//! let backend = LexiconBackend::new(Lexicon::builtin());
//! let mut topic = backend.acquire(&Stage::Topic(TopicVocabulary::news()))?;
//! assert_eq!(
//!     topic.classify("Parliament votes on the new election law")?,
//!     Prediction::Topic("Politics".to_string())
//! );
//! # Ok::<(), chatlens::ChatlensError>(())
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    Classifier, ClassifierBackend, Prediction, SensitiveTopicTable, Stage, StageKind,
    TopicVocabulary, argmax,
};
use crate::error::{ChatlensError, Result};
use crate::message::Sentiment;

/// Keyword lists for every stage.
///
/// Topic and sensitive-topic keys are label names, matched
/// case-insensitively against the stage's vocabulary or table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
    #[serde(default)]
    pub topics: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub sensitive: BTreeMap<String, Vec<String>>,
}

impl Lexicon {
    /// Loads a lexicon from JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Small built-in English lexicon covering the `news-v1` and `news-v2`
    /// vocabularies.
    pub fn builtin() -> Self {
        fn words(list: &[&str]) -> Vec<String> {
            list.iter().map(|w| (*w).to_string()).collect()
        }

        let topics: &[(&str, &[&str])] = &[
            ("Politics", &["parliament", "election*", "government", "minister", "president", "vote*", "law", "party", "senate", "sanction*"]),
            ("Economy", &["econom*", "market*", "inflation", "bank*", "price*", "budget", "tax*", "gdp", "stock*", "trade"]),
            ("Technology", &["tech*", "software", "ai", "startup*", "internet", "smartphone*", "app", "cyber*", "computer*", "chip*"]),
            ("Sports", &["match*", "football", "team", "league", "championship", "olympic*", "goal*", "coach", "tournament", "win"]),
            ("Sport", &["match*", "football", "team", "league", "championship", "olympic*", "goal*", "coach", "tournament", "win"]),
            ("Culture", &["museum*", "theatre", "theater", "exhibition*", "literature", "book*", "art", "heritage", "opera"]),
            ("Health", &["health*", "hospital*", "doctor*", "vaccin*", "disease*", "virus*", "medic*", "patient*", "covid"]),
            ("Entertainment", &["film*", "movie*", "actor*", "actress*", "music", "concert*", "celebrit*", "series", "festival*"]),
            ("Science", &["scien*", "research*", "study", "space", "nasa", "physic*", "laborator*", "discover*"]),
            ("Environment", &["climate", "environment*", "pollution", "emission*", "wildfire*", "flood*", "forest*", "ecolog*"]),
            ("World News", &["international", "foreign", "un", "nato", "embassy", "abroad", "global", "summit"]),
            ("Local News", &["city", "local", "mayor", "district", "region*", "residents", "municipal*", "road*"]),
        ];

        let sensitive: &[(&str, &[&str])] = &[
            ("none", &[]),
            ("politics", &["election*", "protest*", "opposition", "regime", "propaganda"]),
            ("offline_crime", &["murder*", "robber*", "theft", "arrest*", "police"]),
            ("online_crime", &["hack*", "phishing", "fraud*", "scam*"]),
            ("drugs", &["drug*", "cocaine", "heroin", "narcotic*"]),
            ("gambling", &["casino*", "betting", "bet*", "lotter*"]),
            ("terrorism", &["terror*", "bomb*", "explosion*", "extremis*"]),
            ("weapons", &["weapon*", "gun*", "rifle*", "ammunition"]),
            ("religion", &["church*", "mosque*", "religio*", "priest*"]),
            ("suicide", &["suicid*"]),
        ];

        Self {
            positive: words(&[
                "good", "great", "excellent", "success*", "win*", "growth", "record", "best",
                "happy", "celebrat*", "improv*", "progress", "agreement", "support*", "rally",
            ]),
            negative: words(&[
                "bad", "terrible", "crisis", "fail*", "loss*", "decline*", "war", "attack*",
                "death*", "kill*", "disaster*", "crash*", "fraud*", "protest*", "scandal*",
            ]),
            topics: topics
                .iter()
                .map(|(label, kws)| ((*label).to_string(), words(kws)))
                .collect(),
            sensitive: sensitive
                .iter()
                .map(|(label, kws)| ((*label).to_string(), words(kws)))
                .collect(),
        }
    }

    fn topic_keywords(&self, label: &str) -> Option<&Vec<String>> {
        lookup_ci(&self.topics, label)
    }

    fn sensitive_keywords(&self, label: &str) -> Option<&Vec<String>> {
        lookup_ci(&self.sensitive, label)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

fn lookup_ci<'a>(map: &'a BTreeMap<String, Vec<String>>, key: &str) -> Option<&'a Vec<String>> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| k.to_lowercase() == key.to_lowercase())
            .map(|(_, v)| v)
    })
}

/// Compiled keyword set for one label.
#[derive(Debug, Clone, Default)]
struct KeywordSet {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl KeywordSet {
    fn compile(keywords: &[String]) -> Self {
        let mut set = Self::default();
        for keyword in keywords {
            let keyword = keyword.trim().to_lowercase();
            if let Some(prefix) = keyword.strip_suffix('*') {
                if !prefix.is_empty() {
                    set.prefixes.push(prefix.to_string());
                }
            } else if !keyword.is_empty() {
                set.exact.push(keyword);
            }
        }
        set
    }

    fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefixes.is_empty()
    }

    fn hits(&self, tokens: &[String]) -> usize {
        tokens
            .iter()
            .filter(|t| {
                self.exact.iter().any(|k| k == *t) || self.prefixes.iter().any(|p| t.starts_with(p))
            })
            .count()
    }
}

/// Splits text into lowercase alphanumeric tokens.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Keyword-scoring [`ClassifierBackend`].
#[derive(Debug, Clone, Default)]
pub struct LexiconBackend {
    lexicon: Lexicon,
}

impl LexiconBackend {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Creates a backend from a lexicon JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(Lexicon::load(path)?))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    fn compile_topics(&self, vocabulary: &TopicVocabulary) -> Result<Vec<(String, KeywordSet)>> {
        let sets: Vec<(String, KeywordSet)> = vocabulary
            .iter()
            .map(|label| {
                let set = self
                    .lexicon
                    .topic_keywords(label)
                    .map(|kws| KeywordSet::compile(kws))
                    .unwrap_or_default();
                (label.to_string(), set)
            })
            .collect();

        if sets.iter().all(|(_, set)| set.is_empty()) {
            return Err(ChatlensError::model_unavailable(
                StageKind::Topic,
                format!(
                    "lexicon has no keywords for any label of vocabulary '{}'",
                    vocabulary.version
                ),
            ));
        }
        Ok(sets)
    }

    fn compile_sensitive(&self, table: &SensitiveTopicTable) -> Result<Vec<(usize, KeywordSet)>> {
        let sets: Vec<(usize, KeywordSet)> = table
            .ids()
            .map(|id| {
                let set = table
                    .label_for(id)
                    .and_then(|label| self.lexicon.sensitive_keywords(label))
                    .map(|kws| KeywordSet::compile(kws))
                    .unwrap_or_default();
                (id, set)
            })
            .collect();

        if sets.iter().all(|(_, set)| set.is_empty()) {
            return Err(ChatlensError::model_unavailable(
                StageKind::SensitiveTopic,
                "lexicon has no keywords for any label of the sensitive topic table",
            ));
        }
        Ok(sets)
    }
}

impl ClassifierBackend for LexiconBackend {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn acquire(&self, stage: &Stage) -> Result<Box<dyn Classifier + '_>> {
        let model = match stage {
            Stage::Sentiment => {
                let positive = KeywordSet::compile(&self.lexicon.positive);
                let negative = KeywordSet::compile(&self.lexicon.negative);
                if positive.is_empty() && negative.is_empty() {
                    return Err(ChatlensError::model_unavailable(
                        StageKind::Sentiment,
                        "lexicon has no sentiment keywords",
                    ));
                }
                Model::Sentiment { positive, negative }
            }
            Stage::Topic(vocabulary) => Model::Topic(self.compile_topics(vocabulary)?),
            Stage::SensitiveTopic(table) => Model::Sensitive {
                sets: self.compile_sensitive(table)?,
                table: table.clone(),
            },
        };
        debug!(stage = %stage.kind(), "lexicon keyword sets compiled");
        Ok(Box::new(LexiconClassifier { model }))
    }
}

enum Model {
    Sentiment {
        positive: KeywordSet,
        negative: KeywordSet,
    },
    Topic(Vec<(String, KeywordSet)>),
    Sensitive {
        sets: Vec<(usize, KeywordSet)>,
        table: SensitiveTopicTable,
    },
}

struct LexiconClassifier {
    model: Model,
}

impl Classifier for LexiconClassifier {
    fn kind(&self) -> StageKind {
        match self.model {
            Model::Sentiment { .. } => StageKind::Sentiment,
            Model::Topic(_) => StageKind::Topic,
            Model::Sensitive { .. } => StageKind::SensitiveTopic,
        }
    }

    fn classify(&mut self, text: &str) -> Result<Prediction> {
        let tokens = tokenize(text);
        match &self.model {
            Model::Sentiment { positive, negative } => {
                let pos = positive.hits(&tokens);
                let neg = negative.hits(&tokens);
                let sentiment = match pos.cmp(&neg) {
                    std::cmp::Ordering::Greater => Sentiment::Positive,
                    std::cmp::Ordering::Less => Sentiment::Negative,
                    std::cmp::Ordering::Equal => Sentiment::Neutral,
                };
                Ok(Prediction::Sentiment(sentiment))
            }
            Model::Topic(sets) => {
                let scores: Vec<f32> = sets.iter().map(|(_, s)| s.hits(&tokens) as f32).collect();
                let best = argmax(&scores).ok_or_else(|| {
                    ChatlensError::classification(StageKind::Topic, "empty vocabulary")
                })?;
                Ok(Prediction::Topic(sets[best].0.clone()))
            }
            Model::Sensitive { sets, table } => {
                let scores: Vec<f32> = sets.iter().map(|(_, s)| s.hits(&tokens) as f32).collect();
                let best = argmax(&scores).ok_or_else(|| {
                    ChatlensError::classification(StageKind::SensitiveTopic, "empty table")
                })?;
                let id = sets[best].0;
                let label = table.label_for(id).ok_or_else(|| {
                    ChatlensError::classification(
                        StageKind::SensitiveTopic,
                        format!("class {} has no label", id),
                    )
                })?;
                Ok(Prediction::SensitiveTopic(label.to_string()))
            }
        }
    }
}

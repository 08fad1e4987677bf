//! Phrase pools per category.
//!
//! Verb and template strings may contain `{Winner}` and `{Loser}`; fixed
//! templates may also contain `{Score}` (winner's goals first).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::{Category, NarrativeError};

/// Fragments for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryPhrases {
    /// Sentence openers ("In a tight one").
    pub openers: Vec<String>,
    /// Core clauses, always present.
    pub verbs: Vec<String>,
    /// Manner words appended to the core; may be empty.
    pub adjectives: Vec<String>,
    /// Trailing clauses.
    pub qualifiers: Vec<String>,
    /// Complete sentences for template mode.
    pub templates: Vec<String>,
}

/// All phrase pools, by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseBook {
    pub categories: BTreeMap<Category, CategoryPhrases>,
    /// Time markers that can follow the core of any category.
    pub temporal: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn concat(pools: &[&[&str]]) -> Vec<String> {
    pools.iter().flat_map(|pool| owned(pool)).collect()
}

const OPENERS_NEUTRAL: &[&str] = &[
    "In an intense contest",
    "After a hard-fought game",
    "In a game of clear phases",
    "After sixty contested minutes",
    "In a tactical encounter",
    "In an evenly matched battle",
    "After a disciplined performance",
    "In a game of shifting momentum",
];

const OPENERS_TIGHT: &[&str] = &[
    "In a tight affair",
    "On a knife's edge",
    "In a game that stayed open for long",
    "After a nerve-racking evening",
    "In a back-and-forth game",
    "With little to separate the sides",
];

const OPENERS_DOMINANT: &[&str] = &[
    "From the opening faceoff",
    "For long stretches",
    "With firm control",
    "After a commanding start",
    "From the first minute on",
];

const OPENERS_DRAMA: &[&str] = &[
    "After a dramatic finish",
    "In a game full of tension",
    "In a gripping duel",
    "After nervy closing stages",
];

const OPENERS_UPSET: &[&str] = &[
    "Against expectations",
    "Surprisingly",
    "In an unexpected twist",
    "Bucking the trend",
];

const VERBS_WIN: &[&str] = &[
    "{Winner} prevails",
    "{Winner} takes the win",
    "{Winner} collects the points",
    "{Winner} decides the game",
    "{Winner} tilts the game its way",
    "{Winner} makes the difference",
    "{Winner} secures the points",
    "{Winner} wins the duel",
    "{Winner} comes out on top",
];

const VERBS_UPSET: &[&str] = &[
    "{Winner} beats {Loser}",
    "{Winner} gets past {Loser}",
    "{Winner} takes the points off {Loser}",
    "{Winner} topples {Loser}",
];

const VERBS_SHOOTOUT: &[&str] = &[
    "{Winner} wins the shootout",
    "{Winner} keeps its nerve in the shootout",
    "{Winner} settles it from the spot",
    "{Winner} edges {Loser} in the shootout",
];

const VERBS_OVERTIME: &[&str] = &[
    "{Winner} wins it in overtime",
    "{Winner} ends it in extra time",
    "{Winner} strikes in overtime",
    "{Winner} finishes off {Loser} in OT",
];

const VERBS_SHUTOUT: &[&str] = &[
    "{Winner} blanks {Loser}",
    "{Winner} keeps {Loser} off the board",
    "{Winner} shuts out {Loser}",
    "{Winner} allows {Loser} nothing",
];

const ADJ_TIGHT: &[&str] = &[
    "narrowly",
    "by a whisker",
    "by the slimmest of margins",
    "after a hard battle",
    "in a tight finish",
];

const ADJ_CLEAR: &[&str] = &[
    "comfortably",
    "convincingly",
    "with authority",
    "without much trouble",
    "in controlled fashion",
    "with a steady hand",
];

const ADJ_DOMINANT: &[&str] = &[
    "emphatically",
    "in dominant fashion",
    "at will",
    "a class above",
    "with overwhelming control",
];

const QUALIFIERS_PATIENCE: &[&str] = &[
    "rewarded for a steady performance",
    "with the decision coming late",
    "after the game stayed open for long",
    "making the key moments count",
    "staying calm in the critical phases",
];

const QUALIFIERS_CONTROL: &[&str] = &[
    "giving the opponent hardly a look",
    "never wavering along the way",
    "controlling the game throughout",
    "allowing no real resistance",
];

const QUALIFIERS_STATEMENT: &[&str] = &[
    "sending a clear message",
    "underlining its current form",
    "confirming its ambitions",
    "making a statement",
];

const QUALIFIERS_NEUTRAL: &[&str] = &[
    "banking important points",
    "keeping the run going",
    "carrying the momentum forward",
    "staying on course",
];

const TEMPORAL: &[&str] = &[
    "in the end",
    "in the third period",
    "after an early lead",
    "in the closing minutes",
    "at the decisive moment",
];

impl PhraseBook {
    /// The built-in phrase pools.
    pub fn standard() -> Self {
        let mut categories = BTreeMap::new();

        categories.insert(
            Category::Shootout,
            CategoryPhrases {
                openers: concat(&[OPENERS_DRAMA, OPENERS_TIGHT]),
                verbs: owned(VERBS_SHOOTOUT),
                adjectives: Vec::new(),
                qualifiers: owned(QUALIFIERS_PATIENCE),
                templates: owned(&[
                    "{Winner} takes the shootout against {Loser}.",
                    "Shootout drama: {Winner} beats {Loser} {Score}.",
                    "{Winner} keeps its nerve from the spot against {Loser}.",
                ]),
            },
        );
        categories.insert(
            Category::Overtime,
            CategoryPhrases {
                openers: concat(&[OPENERS_DRAMA, OPENERS_TIGHT]),
                verbs: owned(VERBS_OVERTIME),
                adjectives: Vec::new(),
                qualifiers: owned(QUALIFIERS_PATIENCE),
                templates: owned(&[
                    "{Winner} beats {Loser} {Score} in overtime.",
                    "Extra time decides it: {Winner} over {Loser}.",
                    "{Winner} ends it in overtime against {Loser}.",
                ]),
            },
        );
        categories.insert(
            Category::Shutout,
            CategoryPhrases {
                openers: concat(&[OPENERS_DOMINANT, OPENERS_NEUTRAL]),
                verbs: owned(VERBS_SHUTOUT),
                adjectives: Vec::new(),
                qualifiers: concat(&[QUALIFIERS_CONTROL, &["without conceding", "behind a clean defence"][..]]),
                templates: owned(&[
                    "{Winner} blanks {Loser} {Score}.",
                    "Clean sheet: {Winner} shuts out {Loser}.",
                    "{Loser} cannot score against {Winner}.",
                ]),
            },
        );
        categories.insert(
            Category::Blowout,
            CategoryPhrases {
                openers: owned(OPENERS_DOMINANT),
                verbs: owned(VERBS_WIN),
                adjectives: owned(ADJ_DOMINANT),
                qualifiers: concat(&[QUALIFIERS_CONTROL, QUALIFIERS_STATEMENT]),
                templates: owned(&[
                    "{Winner} routs {Loser} {Score}.",
                    "No contest: {Winner} overwhelms {Loser}.",
                    "{Winner} runs away from {Loser} {Score}.",
                ]),
            },
        );
        categories.insert(
            Category::StatementWin,
            CategoryPhrases {
                openers: concat(&[OPENERS_DOMINANT, OPENERS_NEUTRAL]),
                verbs: owned(VERBS_WIN),
                adjectives: owned(ADJ_CLEAR),
                qualifiers: concat(&[QUALIFIERS_STATEMENT, QUALIFIERS_CONTROL]),
                templates: owned(&[
                    "{Winner} beats {Loser} {Score} and makes a statement.",
                    "Clear win for {Winner} against {Loser}.",
                    "{Winner} handles {Loser} {Score}.",
                ]),
            },
        );
        categories.insert(
            Category::Upset,
            CategoryPhrases {
                openers: concat(&[OPENERS_UPSET, OPENERS_NEUTRAL]),
                verbs: owned(VERBS_UPSET),
                adjectives: Vec::new(),
                qualifiers: concat(&[&["catching everyone off guard"][..], QUALIFIERS_STATEMENT]),
                templates: owned(&[
                    "Upset: {Winner} beats {Loser} {Score}.",
                    "{Winner} defies the form book against {Loser}.",
                    "{Loser} stumbles against {Winner}.",
                ]),
            },
        );
        categories.insert(
            Category::GrindWin,
            CategoryPhrases {
                openers: concat(&[OPENERS_TIGHT, OPENERS_NEUTRAL]),
                verbs: owned(VERBS_WIN),
                adjectives: owned(ADJ_TIGHT),
                qualifiers: owned(QUALIFIERS_PATIENCE),
                templates: owned(&[
                    "{Winner} edges {Loser} {Score}.",
                    "One goal decides it: {Winner} over {Loser}.",
                    "{Winner} grinds out a win against {Loser}.",
                ]),
            },
        );
        categories.insert(
            Category::HighScoring,
            CategoryPhrases {
                openers: concat(&[&["After an open exchange", "In a goal-fest"][..], OPENERS_NEUTRAL]),
                verbs: owned(VERBS_WIN),
                adjectives: concat(&[ADJ_CLEAR, ADJ_TIGHT]),
                qualifiers: owned(&["in a spectacle", "after a flurry of goals"]),
                templates: owned(&[
                    "{Winner} outscores {Loser} {Score}.",
                    "Goals galore as {Winner} beats {Loser}.",
                    "{Winner} survives a wild one against {Loser}, {Score}.",
                ]),
            },
        );
        categories.insert(
            Category::LowScoring,
            CategoryPhrases {
                openers: concat(&[&["In a grinding game", "After a defensive battle"][..], OPENERS_TIGHT]),
                verbs: owned(VERBS_WIN),
                adjectives: owned(ADJ_TIGHT),
                qualifiers: concat(&[QUALIFIERS_PATIENCE, &["strong at the back"][..]]),
                templates: owned(&[
                    "{Winner} beats {Loser} {Score} in a low-scoring game.",
                    "Defence wins it for {Winner} against {Loser}.",
                    "{Winner} takes a tight one from {Loser}.",
                ]),
            },
        );
        categories.insert(
            Category::Fallback,
            CategoryPhrases {
                openers: owned(OPENERS_NEUTRAL),
                verbs: owned(VERBS_WIN),
                adjectives: owned(ADJ_CLEAR),
                qualifiers: owned(QUALIFIERS_NEUTRAL),
                templates: owned(&[
                    "{Winner} beats {Loser} {Score}.",
                    "{Winner} takes the points against {Loser}.",
                    "{Winner} wins against {Loser}.",
                ]),
            },
        );

        Self {
            categories,
            temporal: owned(TEMPORAL),
        }
    }

    /// Read a phrase book from JSON.
    pub fn from_json(json: &str) -> Result<Self, NarrativeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a phrase book from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NarrativeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Phrases for a category.
    pub fn phrases(&self, category: Category) -> Result<&CategoryPhrases, NarrativeError> {
        self.categories
            .get(&category)
            .ok_or(NarrativeError::EmptyPhrasePool { category })
    }
}

/// Fill in `{Winner}`, `{Loser}` and `{Score}`.
pub fn render(template: &str, winner: &str, loser: &str, score: &str) -> String {
    template
        .replace("{Winner}", winner)
        .replace("{Loser}", loser)
        .replace("{Score}", score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_book_covers_every_category() {
        let book = PhraseBook::standard();
        for category in Category::ALL {
            let phrases = book.phrases(category).unwrap();
            assert!(!phrases.verbs.is_empty(), "{category} has no verbs");
            assert!(!phrases.templates.is_empty(), "{category} has no templates");
            assert!(phrases.verbs.iter().all(|v| v.contains("{Winner}")));
        }
        assert!(!book.temporal.is_empty());
    }

    #[test]
    fn test_render() {
        let text = render("{Winner} beats {Loser} {Score}.", "Berlin", "Köln", "4:2");
        assert_eq!(text, "Berlin beats Köln 4:2.");
    }

    #[test]
    fn test_json_book_roundtrip() {
        let book = PhraseBook::standard();
        let json = serde_json::to_string(&book).unwrap();
        assert!(json.contains("\"SO_DRAMA\""));
        assert_eq!(PhraseBook::from_json(&json).unwrap(), book);
    }

    #[test]
    fn test_missing_category_is_an_error() {
        let book = PhraseBook::default();
        assert!(matches!(
            book.phrases(Category::Upset),
            Err(NarrativeError::EmptyPhrasePool { category: Category::Upset })
        ));
    }
}

//! Match classification - an ordered rule list, first match wins.

use serde::{Deserialize, Serialize};

use league_rules::MatchOutcome;

use crate::config::ClassifierThresholds;

/// Narrative category of a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "SO_DRAMA")]
    Shootout,
    #[serde(rename = "OT_DRAMA")]
    Overtime,
    #[serde(rename = "SHUTOUT")]
    Shutout,
    #[serde(rename = "DOMINATION")]
    Blowout,
    #[serde(rename = "STATEMENT_WIN")]
    StatementWin,
    #[serde(rename = "UPSET")]
    Upset,
    #[serde(rename = "GRIND_WIN")]
    GrindWin,
    #[serde(rename = "TRACK_MEET")]
    HighScoring,
    #[serde(rename = "LOW_SCORING")]
    LowScoring,
    #[serde(rename = "FALLBACK")]
    Fallback,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Shootout,
        Category::Overtime,
        Category::Shutout,
        Category::Blowout,
        Category::StatementWin,
        Category::Upset,
        Category::GrindWin,
        Category::HighScoring,
        Category::LowScoring,
        Category::Fallback,
    ];

    /// Wire tag of the category.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Shootout => "SO_DRAMA",
            Category::Overtime => "OT_DRAMA",
            Category::Shutout => "SHUTOUT",
            Category::Blowout => "DOMINATION",
            Category::StatementWin => "STATEMENT_WIN",
            Category::Upset => "UPSET",
            Category::GrindWin => "GRIND_WIN",
            Category::HighScoring => "TRACK_MEET",
            Category::LowScoring => "LOW_SCORING",
            Category::Fallback => "FALLBACK",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Numbers the classifier looks at, seen from the winner's side.
///
/// A level score names the home side as nominal winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFacts {
    pub winner: String,
    pub loser: String,
    pub winner_goals: u32,
    pub loser_goals: u32,
    pub margin: u32,
    pub total_goals: u32,
    pub home_form: i32,
    pub away_form: i32,
    pub winner_form: i32,
    pub loser_form: i32,
    /// Winner form minus loser form.
    pub form_diff: i32,
    pub level: bool,
    pub overtime: bool,
    pub shootout: bool,
}

impl MatchFacts {
    pub fn derive(outcome: &MatchOutcome, home_form: i32, away_form: i32) -> Self {
        let (winner_form, loser_form) = if outcome.home_wins() {
            (home_form, away_form)
        } else {
            (away_form, home_form)
        };

        Self {
            winner: outcome.winner().to_string(),
            loser: outcome.loser().to_string(),
            winner_goals: outcome.winner_goals(),
            loser_goals: outcome.loser_goals(),
            margin: outcome.margin(),
            total_goals: outcome.total_goals(),
            home_form,
            away_form,
            winner_form,
            loser_form,
            form_diff: winner_form - loser_form,
            level: outcome.is_level(),
            overtime: outcome.overtime,
            shootout: outcome.shootout,
        }
    }
}

type Predicate = fn(&MatchFacts, &ClassifierThresholds) -> bool;

/// One entry of the priority list.
#[derive(Clone, Copy)]
pub struct ClassificationRule {
    pub name: &'static str,
    pub category: Category,
    pub predicate: Predicate,
}

impl std::fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationRule")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

fn is_upset(facts: &MatchFacts, t: &ClassifierThresholds) -> bool {
    facts.form_diff <= t.upset_form_diff
}

/// Rules in evaluation order. The upset check sits between the blowout and
/// statement rules for wide margins, and again after statement for narrow
/// ones; moving either changes the result for upset blowouts.
const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "shootout",
        category: Category::Shootout,
        predicate: |f, _| f.shootout,
    },
    ClassificationRule {
        name: "overtime",
        category: Category::Overtime,
        predicate: |f, _| f.overtime,
    },
    ClassificationRule {
        name: "draw",
        category: Category::Fallback,
        predicate: |f, _| f.level,
    },
    ClassificationRule {
        name: "shutout",
        category: Category::Shutout,
        predicate: |f, _| f.loser_goals == 0,
    },
    ClassificationRule {
        name: "blowout",
        category: Category::Blowout,
        predicate: |f, t| f.margin >= t.blowout_margin,
    },
    ClassificationRule {
        name: "wide-margin upset",
        category: Category::Upset,
        predicate: |f, t| f.margin >= t.statement_margin && is_upset(f, t),
    },
    ClassificationRule {
        name: "statement",
        category: Category::StatementWin,
        predicate: |f, t| f.margin >= t.statement_margin,
    },
    ClassificationRule {
        name: "upset",
        category: Category::Upset,
        predicate: is_upset,
    },
    ClassificationRule {
        name: "grind",
        category: Category::GrindWin,
        predicate: |f, t| f.margin == t.grind_margin,
    },
    ClassificationRule {
        name: "high scoring",
        category: Category::HighScoring,
        predicate: |f, t| f.total_goals >= t.high_scoring_total,
    },
    ClassificationRule {
        name: "low scoring",
        category: Category::LowScoring,
        predicate: |f, t| f.total_goals <= t.low_scoring_total,
    },
];

/// Maps match facts to exactly one category.
#[derive(Debug, Clone)]
pub struct Classifier {
    thresholds: ClassifierThresholds,
}

impl Classifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn with_defaults() -> Self {
        Self::new(ClassifierThresholds::default())
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// The rule list, highest priority first. Anything no rule matches is
    /// [`Category::Fallback`].
    pub fn rules(&self) -> &'static [ClassificationRule] {
        RULES
    }

    pub fn classify(&self, facts: &MatchFacts) -> Category {
        self.matching_rule(facts)
            .map(|rule| rule.category)
            .unwrap_or(Category::Fallback)
    }

    /// The first rule that fires, if any.
    pub fn matching_rule(&self, facts: &MatchFacts) -> Option<&'static ClassificationRule> {
        RULES
            .iter()
            .find(|rule| (rule.predicate)(facts, &self.thresholds))
    }

    /// Derive facts and classify in one step.
    pub fn classify_outcome(
        &self,
        outcome: &MatchOutcome,
        home_form: i32,
        away_form: i32,
    ) -> (MatchFacts, Category) {
        let facts = MatchFacts::derive(outcome, home_form, away_form);
        let category = self.classify(&facts);
        (facts, category)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}

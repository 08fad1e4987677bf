//! Form tables - recent results per team, read from whatever shape the
//! standings export happens to use.

use serde_json::Value;
use std::collections::BTreeMap;

use super::FormRecord;

/// Recent results keyed by team name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormTable {
    records: BTreeMap<String, FormRecord>,
}

impl FormTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a form table from a standings document.
    ///
    /// Accepted shapes, tried in order:
    /// 1. `{"teams": {"<team>": {"last5": [...]}}}`
    /// 2. `{"teams": [{"Team": "<team>", "last5": [...]}]}`
    /// 3. conference tables: any top-level array of `{"Team", "last5"}` rows
    ///
    /// Rows without a team name are skipped. Unknown shapes give an empty table.
    pub fn from_json(value: &Value) -> Self {
        let mut table = Self::new();

        match value.get("teams") {
            Some(Value::Object(teams)) => {
                for (team, row) in teams {
                    table.insert(team.clone(), read_last5(row));
                }
            }
            Some(Value::Array(rows)) => {
                for row in rows {
                    table.insert_row(row);
                }
            }
            _ => {}
        }

        if table.is_empty() {
            if let Value::Object(fields) = value {
                for (key, field) in fields {
                    if key == "teams" {
                        continue;
                    }
                    if let Value::Array(rows) = field {
                        for row in rows {
                            table.insert_row(row);
                        }
                    }
                }
            }
        }

        table
    }

    /// Insert or replace a team's record.
    pub fn insert(&mut self, team: impl Into<String>, record: FormRecord) {
        self.records.insert(team.into(), record);
    }

    fn insert_row(&mut self, row: &Value) {
        let team = row
            .get("Team")
            .or_else(|| row.get("team"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !team.is_empty() {
            self.insert(team, read_last5(row));
        }
    }

    /// Get a team's record, if the table has one.
    pub fn form_of(&self, team: &str) -> Option<&FormRecord> {
        self.records.get(team)
    }

    /// Form score for a team. Teams without data are neutral.
    pub fn score_of(&self, team: &str, window: usize) -> i32 {
        self.form_of(team).map(|f| f.score(window)).unwrap_or(0)
    }

    /// Fill in teams this table lacks from another table.
    pub fn fill_missing(&mut self, other: &FormTable) {
        for (team, record) in &other.records {
            self.records
                .entry(team.clone())
                .or_insert_with(|| record.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}

fn read_last5(row: &Value) -> FormRecord {
    let marks: Vec<&str> = row
        .get("last5")
        .and_then(Value::as_array)
        .map(|marks| marks.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    FormRecord::from_marks(&marks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_teams_map_shape() {
        let table = FormTable::from_json(&json!({
            "teams": {
                "Berlin": {"last5": ["W", "W", "L", "W"]},
                "München": {"last5": ["L", "L", "W"]}
            }
        }));

        assert_eq!(table.len(), 2);
        assert_eq!(table.score_of("Berlin", 5), 2);
        assert_eq!(table.score_of("München", 5), -1);
    }

    #[test]
    fn test_teams_list_shape() {
        let table = FormTable::from_json(&json!({
            "teams": [
                {"Team": "Hamburg", "last5": ["W", "L", "W"]},
                {"Team": "", "last5": ["W"]}
            ]
        }));

        assert_eq!(table.len(), 1);
        assert_eq!(table.score_of("Hamburg", 5), 1);
    }

    #[test]
    fn test_conference_tables_shape() {
        let table = FormTable::from_json(&json!({
            "tabelle_nord": [{"Team": "Berlin", "last5": ["W", "W", "L", "W"]}],
            "tabelle_sued": [{"Team": "Köln", "last5": ["L", "L", "L", "L"]}],
            "season": 3
        }));

        assert_eq!(table.len(), 2);
        assert_eq!(table.score_of("Köln", 5), -4);
    }

    #[test]
    fn test_missing_team_is_neutral() {
        let table = FormTable::from_json(&json!({"unrelated": 1}));
        assert!(table.is_empty());
        assert_eq!(table.score_of("Nobody", 5), 0);
    }

    #[test]
    fn test_fill_missing_keeps_existing() {
        let mut primary = FormTable::new();
        primary.insert("A", FormRecord::from_marks(&["W"]));

        let mut secondary = FormTable::new();
        secondary.insert("A", FormRecord::from_marks(&["L"]));
        secondary.insert("B", FormRecord::from_marks(&["L", "L"]));

        primary.fill_missing(&secondary);
        assert_eq!(primary.score_of("A", 5), 1);
        assert_eq!(primary.score_of("B", 5), -2);
        assert_eq!(primary.teams().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}

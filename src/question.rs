use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;

static BANK_DIR: Dir = include_dir!("src/bank");

/// Difficulty tier used to stratify question sampling
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Expert,
}

/// A single multiple-choice question. Defined once when the bank is
/// loaded and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub difficulty: Difficulty,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    pub name: String,
    pub questions: Vec<Question>,
}

impl QuestionBank {
    /// The bank compiled into the binary.
    pub fn builtin() -> Self {
        read_bank_from_asset("webdev.json").expect("embedded question bank must parse")
    }

    /// Load a bank from an external JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let data = std::fs::read_to_string(path)?;
        let bank = from_str(&data)?;
        Ok(bank)
    }

    pub fn of_difficulty(&self, difficulty: Difficulty) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(move |q| q.difficulty == difficulty)
    }

    /// How many questions each tier holds.
    pub fn tier_counts(&self) -> HashMap<Difficulty, usize> {
        self.questions.iter().map(|q| q.difficulty).counts()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

fn read_bank_from_asset(file_name: &str) -> Result<QuestionBank, Box<dyn Error>> {
    let file = BANK_DIR
        .get_file(file_name)
        .expect("question bank file not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret file as a string");

    let bank = from_str(file_as_str)?;

    Ok(bank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_bank_loads() {
        let bank = QuestionBank::builtin();

        assert_eq!(bank.name, "webdev");
        assert!(!bank.is_empty());
    }

    #[test]
    fn test_builtin_bank_covers_default_distribution() {
        let bank = QuestionBank::builtin();
        let counts = bank.tier_counts();

        assert!(counts[&Difficulty::Easy] >= 20);
        assert!(counts[&Difficulty::Moderate] >= 10);
        assert!(counts[&Difficulty::Expert] >= 10);
    }

    #[test]
    fn test_builtin_bank_ids_are_unique() {
        let bank = QuestionBank::builtin();

        assert!(bank.questions.iter().map(|q| q.id).all_unique());
    }

    #[test]
    fn test_builtin_bank_questions_are_well_formed() {
        let bank = QuestionBank::builtin();

        for q in &bank.questions {
            assert_eq!(q.options.len(), 4, "question {} must have 4 options", q.id);
            assert!(
                q.correct_option < q.options.len(),
                "question {} has correct_option out of range",
                q.id
            );
            assert!(!q.prompt.is_empty());
        }
    }

    #[test]
    fn test_of_difficulty_filters() {
        let bank = QuestionBank::builtin();

        assert!(bank
            .of_difficulty(Difficulty::Expert)
            .all(|q| q.difficulty == Difficulty::Expert));
    }

    #[test]
    fn test_difficulty_display() {
        assert_eq!(Difficulty::Easy.to_string(), "easy");
        assert_eq!(Difficulty::Moderate.to_string(), "moderate");
        assert_eq!(Difficulty::Expert.to_string(), "expert");
    }

    #[test]
    fn test_bank_deserialization() {
        let json_data = r#"
        {
            "name": "tiny",
            "questions": [
                {
                    "id": 7,
                    "prompt": "pick b",
                    "options": ["a", "b", "c", "d"],
                    "correct_option": 1,
                    "difficulty": "moderate",
                    "category": "misc"
                }
            ]
        }
        "#;

        let bank: QuestionBank = from_str(json_data).unwrap();
        assert_eq!(bank.name, "tiny");
        assert_eq!(bank.questions.len(), 1);
        assert_eq!(bank.questions[0].id, 7);
        assert_eq!(bank.questions[0].difficulty, Difficulty::Moderate);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"{{"name":"disk","questions":[{{"id":1,"prompt":"q","options":["a","b","c","d"],"correct_option":0,"difficulty":"easy","category":"misc"}}]}}"#
        )
        .unwrap();

        let bank = QuestionBank::from_path(&path).unwrap();
        assert_eq!(bank.name, "disk");
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn test_from_path_missing_file() {
        assert!(QuestionBank::from_path("/no/such/bank.json").is_err());
    }
}

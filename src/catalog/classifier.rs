//! Keyword classification of sheets into animated-character categories
//!
//! Matching is case-insensitive substring search over title, description and
//! tags. A sheet matching several categories takes the first one in
//! [`Category::PRIORITY`]: player, enemy, npc, animal, character.

use crate::catalog::record::SheetRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category label assigned to a candidate sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Playable characters
    Player,
    /// Hostile characters
    Enemy,
    /// Non-player characters
    Npc,
    /// Animals and creatures
    Animal,
    /// Any other character
    Character,
}

impl Category {
    /// Tie-breaking order, highest priority first
    pub const PRIORITY: [Self; 5] = [
        Self::Player,
        Self::Enemy,
        Self::Npc,
        Self::Animal,
        Self::Character,
    ];

    /// Keywords that place a sheet in this category
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Player => &["player", "hero", "adventurer", "protagonist"],
            Self::Enemy => &["enemy", "enemies", "monster", "mob", "boss", "villain"],
            Self::Npc => &["npc", "civilian", "merchant", "villager"],
            Self::Animal => &[
                "animal", "bird", "fish", "creature", "beast", "dog", "cat", "dragon",
            ],
            Self::Character => &[
                "character", "warrior", "knight", "mage", "wizard", "archer", "rogue", "zombie",
                "skeleton", "alien", "robot", "human", "people", "slime", "ghost", "demon", "orc",
                "goblin", "troll", "soldier", "fighter", "assassin",
            ],
        }
    }

    /// Label used in documents and logs
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Enemy => "enemy",
            Self::Npc => "npc",
            Self::Animal => "animal",
            Self::Character => "character",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Words suggesting the sheet holds animation frames
pub const ANIMATION_HINTS: [&str; 11] = [
    "animated",
    "animation",
    "sprite sheet",
    "spritesheet",
    "walk",
    "run",
    "attack",
    "idle",
    "jump",
    "frames",
    "frame",
];

/// Classification switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Reject sheets without any animation hint
    pub require_animation_hint: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            require_animation_hint: true,
        }
    }
}

/// Classifier output entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedSheet {
    /// Sheet id from the metadata store
    pub id: String,
    /// Sheet title
    pub title: String,
    /// Assigned category
    pub category: Category,
}

/// Label a sheet, or return `None` when it is not an animated-character candidate
pub fn classify(record: &SheetRecord, config: ClassifierConfig) -> Option<Category> {
    let text = record.search_text();

    if config.require_animation_hint && !ANIMATION_HINTS.iter().any(|hint| text.contains(hint)) {
        return None;
    }

    Category::PRIORITY.into_iter().find(|category| {
        category
            .keywords()
            .iter()
            .any(|keyword| text.contains(keyword))
    })
}

/// Label every record, keeping candidates in input order
pub fn classify_all(records: &[SheetRecord], config: ClassifierConfig) -> Vec<ClassifiedSheet> {
    records
        .iter()
        .filter_map(|record| {
            classify(record, config).map(|category| ClassifiedSheet {
                id: record.id.clone(),
                title: record.title.clone(),
                category,
            })
        })
        .collect()
}

//! Scorebook: Result Catalog
//!
//! Immutable lookup from a plate-appearance result code to what it means
//! for the game: category, bases gained by the batter on a hit, whether
//! the batter is out, and whether it counts as an at-bat.
//!
//! The engine only depends on the [`ResultCatalog`] trait. [`TableCatalog`]
//! is the table-backed implementation; [`TableCatalog::standard`] holds the
//! scorer's standard code set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::ResultCategory;

/// One selectable result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultOption {
    pub code: String,
    pub label: String,
    pub category: ResultCategory,
    /// 1 = single … 4 = home run. Absent for non-hits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_bases: Option<u8>,
    #[serde(default)]
    pub is_out: bool,
    #[serde(default)]
    pub is_at_bat: bool,
}

impl ResultOption {
    pub fn is_home_run(&self) -> bool {
        self.hit_bases == Some(4)
    }
}

/// Code → meaning lookup. Unknown codes return `None`; callers decide how
/// to degrade.
pub trait ResultCatalog {
    fn lookup(&self, code: &str) -> Option<&ResultOption>;
}

/// Strikeout codes (swinging, looking).
pub const STRIKEOUT_CODES: [&str; 2] = ["K", "KK"];

pub fn is_strikeout_code(code: &str) -> bool {
    STRIKEOUT_CODES.contains(&code)
}

/// Catalog backed by an in-memory table.
#[derive(Debug, Clone, Default)]
pub struct TableCatalog {
    options: BTreeMap<String, ResultOption>,
}

impl TableCatalog {
    /// Build from a list of options. A later duplicate code replaces an
    /// earlier one.
    pub fn from_options(options: impl IntoIterator<Item = ResultOption>) -> Self {
        Self {
            options: options.into_iter().map(|o| (o.code.clone(), o)).collect(),
        }
    }

    /// Load a catalog from a JSON array of options.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let options: Vec<ResultOption> = serde_json::from_str(json)?;
        Ok(Self::from_options(options))
    }

    /// The standard scorer's code set.
    pub fn standard() -> Self {
        Self::from_options(standard_options())
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl ResultCatalog for TableCatalog {
    fn lookup(&self, code: &str) -> Option<&ResultOption> {
        self.options.get(code)
    }
}

// ---------------------------------------------------------------------------
// Standard code set
// ---------------------------------------------------------------------------

const FIELDERS: [&str; 9] = [
    "pitcher",
    "catcher",
    "first",
    "second",
    "third",
    "shortstop",
    "left",
    "center",
    "right",
];

const DIRECTIONS: [(&str, &str); 3] = [("L", "left"), ("C", "center"), ("R", "right")];

fn option(
    code: String,
    label: String,
    category: ResultCategory,
    hit_bases: Option<u8>,
    is_out: bool,
    is_at_bat: bool,
) -> ResultOption {
    ResultOption {
        code,
        label,
        category,
        hit_bases,
        is_out,
        is_at_bat,
    }
}

fn hit(code: String, label: String, bases: u8) -> ResultOption {
    option(code, label, ResultCategory::Hit, Some(bases), false, true)
}

fn fielded_out(prefix: &str, noun: &str, fielders: usize) -> Vec<ResultOption> {
    FIELDERS[..fielders]
        .iter()
        .enumerate()
        .map(|(i, f)| {
            option(
                format!("{}-{}", prefix, i + 1),
                format!("{} to {}", noun, f),
                ResultCategory::Out,
                None,
                true,
                true,
            )
        })
        .collect()
}

/// Every code of the standard set, grouped the way a scorer picks them.
pub fn standard_options() -> Vec<ResultOption> {
    let mut out = Vec::new();

    for (kind, noun, bases) in [
        ("H1", "Single", 1u8),
        ("H2", "Double", 2),
        ("H3", "Triple", 3),
        ("HR", "Home run", 4),
    ] {
        for (dir, dir_label) in DIRECTIONS {
            out.push(hit(
                format!("{}-{}", kind, dir),
                format!("{} to {}", noun, dir_label),
                bases,
            ));
        }
        if kind == "H1" {
            out.push(hit("H1-IN".to_string(), "Infield single".to_string(), 1));
        }
    }

    out.extend(fielded_out("GO", "Groundout", 6));
    out.extend(fielded_out("FO", "Flyout", 9));
    out.extend(fielded_out("LO", "Lineout", 9));

    out.push(option(
        "K".to_string(),
        "Strikeout swinging".to_string(),
        ResultCategory::Out,
        None,
        true,
        true,
    ));
    out.push(option(
        "KK".to_string(),
        "Strikeout looking".to_string(),
        ResultCategory::Out,
        None,
        true,
        true,
    ));

    out.push(option(
        "BB".to_string(),
        "Walk".to_string(),
        ResultCategory::Walk,
        None,
        false,
        false,
    ));
    out.push(option(
        "HBP".to_string(),
        "Hit by pitch".to_string(),
        ResultCategory::HitByPitch,
        None,
        false,
        false,
    ));

    out.push(option(
        "SAC".to_string(),
        "Sacrifice bunt".to_string(),
        ResultCategory::SacrificeBunt,
        None,
        true,
        false,
    ));
    out.push(option(
        "SF".to_string(),
        "Sacrifice fly".to_string(),
        ResultCategory::SacrificeFly,
        None,
        true,
        false,
    ));

    for (i, f) in FIELDERS.iter().enumerate() {
        out.push(option(
            format!("E-{}", i + 1),
            format!("Error by {}", f),
            ResultCategory::Error,
            None,
            false,
            true,
        ));
    }

    out.push(option(
        "FC".to_string(),
        "Fielder's choice".to_string(),
        ResultCategory::FieldersChoice,
        None,
        false,
        true,
    ));
    out.push(option(
        "INT".to_string(),
        "Catcher's interference".to_string(),
        ResultCategory::Interference,
        None,
        false,
        false,
    ));

    out
}

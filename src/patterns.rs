//! Path classification
//!
//! Every upstream file is matched against an ordered chain of rules, one per
//! configured category. The first rule that matches decides the strategy;
//! files no rule matches are skipped.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fmt;
use std::path::Path;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};

/// Configured category a path can belong to, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Exclude,
    Overwrite,
    Merge,
    CreateIfMissing,
}

impl Category {
    /// All categories, highest precedence first
    pub const PRECEDENCE: [Category; 4] = [
        Category::Exclude,
        Category::Overwrite,
        Category::Merge,
        Category::CreateIfMissing,
    ];

    pub fn strategy(self) -> Strategy {
        match self {
            Category::Exclude => Strategy::Skip,
            Category::Overwrite => Strategy::Overwrite,
            Category::Merge => Strategy::Merge,
            Category::CreateIfMissing => Strategy::CreateIfMissing,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Exclude => "exclude",
            Category::Overwrite => "overwrite",
            Category::Merge => "merge",
            Category::CreateIfMissing => "create_if_missing",
        }
    }

    fn patterns(self, config: &SyncConfig) -> &[String] {
        match self {
            Category::Exclude => &config.exclude,
            Category::Overwrite => &config.overwrite,
            Category::Merge => &config.merge,
            Category::CreateIfMissing => &config.create_if_missing,
        }
    }
}

/// How a single file is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Overwrite,
    Merge,
    CreateIfMissing,
    Skip,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Overwrite => "overwrite",
            Strategy::Merge => "merge",
            Strategy::CreateIfMissing => "create_if_missing",
            Strategy::Skip => "skip",
        };
        f.write_str(s)
    }
}

/// Outcome of classifying a path: the matching category (if any) and the
/// strategy that follows from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Option<Category>,
    pub strategy: Strategy,
}

struct Rule {
    category: Category,
    set: GlobSet,
}

/// Ordered rule chain built from the pattern lists of a config
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let mut rules = Vec::with_capacity(Category::PRECEDENCE.len());
        for category in Category::PRECEDENCE {
            let set = build_set(category, category.patterns(config))?;
            rules.push(Rule { category, set });
        }
        Ok(Self { rules })
    }

    /// Classify a path relative to the repository root
    pub fn classify(&self, relative_path: &Path) -> Classification {
        self.rules
            .iter()
            .find(|rule| rule.set.is_match(relative_path))
            .map(|rule| Classification {
                category: Some(rule.category),
                strategy: rule.category.strategy(),
            })
            .unwrap_or(Classification {
                category: None,
                strategy: Strategy::Skip,
            })
    }
}

fn build_set(category: Category, patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let normalized = normalize_pattern(pattern);
        let glob = GlobBuilder::new(&normalized)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                SyncError::Config(format!(
                    "invalid {} pattern `{}`: {}",
                    category.key(),
                    pattern,
                    e
                ))
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| SyncError::Config(format!("invalid {} patterns: {}", category.key(), e)))
}

/// `docs/` means everything under `docs`; a leading `./` is dropped.
fn normalize_pattern(pattern: &str) -> String {
    let trimmed = pattern.trim();
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    if let Some(dir) = trimmed.strip_suffix('/') {
        format!("{}/**", dir)
    } else {
        trimmed.to_string()
    }
}

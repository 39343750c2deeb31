//! Build plan: which (region, language) pairs get a list.
//!
//! The plan is consumed, never produced, by the builder. The default plan is
//! the set the channel has always shipped; a YAML file can replace it:
//!
//! ```yaml
//! regions:
//!   - region: ntsc
//!     languages: [english, french, spanish]
//!   - region: pal
//!     rating_group: pegi
//!     languages: [english, german]
//! ```

use crate::error::{DllistError, Result};
use crate::types::{BuildTarget, Language, RatingGroup, Region};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Languages built for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionPlan {
    /// The region.
    pub region: Region,
    /// Rating board override; the region default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_group: Option<RatingGroup>,
    /// Languages to build, in order.
    pub languages: Vec<Language>,
}

/// The full set of targets for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Per-region language lists.
    pub regions: Vec<RegionPlan>,
}

impl Default for BuildPlan {
    fn default() -> Self {
        Self {
            regions: vec![
                RegionPlan {
                    region: Region::Japan,
                    rating_group: None,
                    languages: vec![Language::Japanese],
                },
                RegionPlan {
                    region: Region::Ntsc,
                    rating_group: None,
                    languages: vec![Language::English, Language::French, Language::Spanish],
                },
                RegionPlan {
                    region: Region::Pal,
                    rating_group: None,
                    languages: vec![
                        Language::English,
                        Language::German,
                        Language::French,
                        Language::Spanish,
                        Language::Italian,
                        Language::Dutch,
                    ],
                },
            ],
        }
    }
}

impl BuildPlan {
    /// Parse and validate a plan from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let plan: Self = serde_yaml::from_str(yaml).map_err(|e| DllistError::ConfigValue {
            field: "plan".to_string(),
            cause: e.to_string(),
        })?;
        plan.validate()?;
        Ok(plan)
    }

    /// Load and validate a plan from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let parse_error = |cause: String| DllistError::ConfigParse {
            path: path.to_path_buf(),
            cause,
        };

        let text = std::fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
        let plan: Self = serde_yaml::from_str(&text).map_err(|e| parse_error(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    /// Check that the plan is non-empty and names each pair once.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for region_plan in &self.regions {
            if region_plan.languages.is_empty() {
                return Err(DllistError::ConfigValue {
                    field: format!("regions.{}.languages", region_plan.region),
                    cause: "at least one language is required".to_string(),
                });
            }
            for language in &region_plan.languages {
                if !seen.insert((region_plan.region, *language)) {
                    return Err(DllistError::ConfigValue {
                        field: format!("regions.{}.languages", region_plan.region),
                        cause: format!("language '{}' listed more than once", language),
                    });
                }
            }
        }

        if seen.is_empty() {
            return Err(DllistError::ConfigValue {
                field: "regions".to_string(),
                cause: "plan contains no targets".to_string(),
            });
        }
        Ok(())
    }

    /// Expand the plan into build targets, in plan order.
    #[must_use]
    pub fn targets(&self) -> Vec<BuildTarget> {
        self.regions
            .iter()
            .flat_map(|region_plan| {
                let rating_group = region_plan
                    .rating_group
                    .unwrap_or_else(|| region_plan.region.default_rating_group());
                region_plan.languages.iter().map(move |language| BuildTarget {
                    region: region_plan.region,
                    language: *language,
                    rating_group,
                })
            })
            .collect()
    }
}

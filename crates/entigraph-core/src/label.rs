//! The closed entity-category enumeration and its fixed rendering palette.
//!
//! Both rendering outputs (annotated text and the graph document) consume
//! the same 18 category/color pairs, so the palette is a stable contract.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Semantic category assigned to an extracted entity.
///
/// Recognition backends emit label strings; anything outside this set is
/// rejected at reduction or graph-assembly time rather than dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityLabel {
    Cardinal,
    Date,
    Event,
    Fac,
    Gpe,
    Language,
    Law,
    Loc,
    Money,
    Norp,
    Ordinal,
    Org,
    Percent,
    Person,
    Product,
    Quantity,
    Time,
    WorkOfArt,
}

/// Every category, in palette order.
pub const ALL_LABELS: [EntityLabel; 18] = [
    EntityLabel::Cardinal,
    EntityLabel::Date,
    EntityLabel::Event,
    EntityLabel::Fac,
    EntityLabel::Gpe,
    EntityLabel::Language,
    EntityLabel::Law,
    EntityLabel::Loc,
    EntityLabel::Money,
    EntityLabel::Norp,
    EntityLabel::Ordinal,
    EntityLabel::Org,
    EntityLabel::Percent,
    EntityLabel::Person,
    EntityLabel::Product,
    EntityLabel::Quantity,
    EntityLabel::Time,
    EntityLabel::WorkOfArt,
];

impl EntityLabel {
    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cardinal => "CARDINAL",
            Self::Date => "DATE",
            Self::Event => "EVENT",
            Self::Fac => "FAC",
            Self::Gpe => "GPE",
            Self::Language => "LANGUAGE",
            Self::Law => "LAW",
            Self::Loc => "LOC",
            Self::Money => "MONEY",
            Self::Norp => "NORP",
            Self::Ordinal => "ORDINAL",
            Self::Org => "ORG",
            Self::Percent => "PERCENT",
            Self::Person => "PERSON",
            Self::Product => "PRODUCT",
            Self::Quantity => "QUANTITY",
            Self::Time => "TIME",
            Self::WorkOfArt => "WORK_OF_ART",
        }
    }

    /// Fixed fill color for this category, shared by type and instance nodes.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Cardinal => "#FF0000",
            Self::Date => "#0000FF",
            Self::Event => "#008000",
            Self::Fac => "#800080",
            Self::Gpe => "#FFA500",
            Self::Language => "#FFC0CB",
            Self::Law => "#A52A2A",
            Self::Loc => "#00FFFF",
            Self::Money => "#FFFF00",
            Self::Norp => "#FF00FF",
            Self::Ordinal => "#00FF00",
            Self::Org => "#008080",
            Self::Percent => "#FFD700",
            Self::Person => "#000000",
            Self::Product => "#C0C0C0",
            Self::Quantity => "#000080",
            Self::Time => "#800000",
            Self::WorkOfArt => "#808000",
        }
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityLabel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARDINAL" => Ok(Self::Cardinal),
            "DATE" => Ok(Self::Date),
            "EVENT" => Ok(Self::Event),
            "FAC" => Ok(Self::Fac),
            "GPE" => Ok(Self::Gpe),
            "LANGUAGE" => Ok(Self::Language),
            "LAW" => Ok(Self::Law),
            "LOC" => Ok(Self::Loc),
            "MONEY" => Ok(Self::Money),
            "NORP" => Ok(Self::Norp),
            "ORDINAL" => Ok(Self::Ordinal),
            "ORG" => Ok(Self::Org),
            "PERCENT" => Ok(Self::Percent),
            "PERSON" => Ok(Self::Person),
            "PRODUCT" => Ok(Self::Product),
            "QUANTITY" => Ok(Self::Quantity),
            "TIME" => Ok(Self::Time),
            "WORK_OF_ART" => Ok(Self::WorkOfArt),
            other => Err(EngineError::UnknownLabel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_labels() {
        for label in ALL_LABELS {
            let parsed: EntityLabel = label.as_str().parse().unwrap();
            assert_eq!(parsed, label);
        }
    }

    #[test]
    fn test_unknown_label_rejected() {
        let err = "BOGUS".parse::<EntityLabel>().unwrap_err();
        assert!(matches!(err, EngineError::UnknownLabel(ref s) if s == "BOGUS"));
    }

    #[test]
    fn test_palette_is_complete_and_distinct() {
        let colors: std::collections::HashSet<&str> =
            ALL_LABELS.iter().map(|l| l.color()).collect();
        assert_eq!(colors.len(), 18);
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&EntityLabel::WorkOfArt).unwrap();
        assert_eq!(json, "\"WORK_OF_ART\"");
    }

    #[test]
    fn test_display() {
        assert_eq!(EntityLabel::Gpe.to_string(), "GPE");
    }
}

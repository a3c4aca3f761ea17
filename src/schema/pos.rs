//! Part-of-speech tags: the closed Penn Treebank word inventory.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown part-of-speech tag: {0}")]
pub struct UnknownTag(pub String);

/// A Penn Treebank part-of-speech tag.
///
/// Grammar templates refer to tags by their label (`NN`, `VBD`, ...);
/// `PRP$` and `WP$` are spelled `PRPS` and `WPS` as Rust identifiers.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PosTag {
    /// Coordinating conjunction: or, but, and.
    CC,
    /// Cardinal number.
    CD,
    /// Determiner: a, the, these, some.
    DT,
    /// Existential "there".
    EX,
    /// Foreign word.
    FW,
    /// Preposition or subordinating conjunction.
    IN,
    /// Adjective.
    JJ,
    /// Comparative adjective.
    JJR,
    /// Superlative adjective.
    JJS,
    /// List item marker.
    LS,
    /// Modal: can, should, might.
    MD,
    /// Singular common noun.
    NN,
    /// Plural common noun.
    NNS,
    /// Singular proper noun.
    NNP,
    /// Plural proper noun.
    NNPS,
    /// Predeterminer: all, both, half.
    PDT,
    /// Possessive ending.
    POS,
    /// Personal pronoun.
    PRP,
    /// Possessive pronoun.
    PRPS,
    /// Adverb.
    RB,
    /// Comparative adverb.
    RBR,
    /// Superlative adverb.
    RBS,
    /// Particle: up, out, away.
    RP,
    /// Symbol.
    SYM,
    /// The word "to".
    TO,
    /// Interjection.
    UH,
    /// Base-form verb.
    VB,
    /// Past-tense verb.
    VBD,
    /// Gerund or present participle.
    VBG,
    /// Past participle.
    VBN,
    /// Present verb, not third person singular.
    VBP,
    /// Present verb, third person singular.
    VBZ,
    /// Wh-determiner.
    WDT,
    /// Wh-pronoun.
    WP,
    /// Possessive wh-pronoun.
    WPS,
    /// Wh-adverb.
    WRB,
}

impl PosTag {
    pub const ALL: [PosTag; 36] = [
        PosTag::CC,
        PosTag::CD,
        PosTag::DT,
        PosTag::EX,
        PosTag::FW,
        PosTag::IN,
        PosTag::JJ,
        PosTag::JJR,
        PosTag::JJS,
        PosTag::LS,
        PosTag::MD,
        PosTag::NN,
        PosTag::NNS,
        PosTag::NNP,
        PosTag::NNPS,
        PosTag::PDT,
        PosTag::POS,
        PosTag::PRP,
        PosTag::PRPS,
        PosTag::RB,
        PosTag::RBR,
        PosTag::RBS,
        PosTag::RP,
        PosTag::SYM,
        PosTag::TO,
        PosTag::UH,
        PosTag::VB,
        PosTag::VBD,
        PosTag::VBG,
        PosTag::VBN,
        PosTag::VBP,
        PosTag::VBZ,
        PosTag::WDT,
        PosTag::WP,
        PosTag::WPS,
        PosTag::WRB,
    ];

    /// The treebank label, as written in grammar templates.
    pub fn label(self) -> &'static str {
        match self {
            PosTag::CC => "CC",
            PosTag::CD => "CD",
            PosTag::DT => "DT",
            PosTag::EX => "EX",
            PosTag::FW => "FW",
            PosTag::IN => "IN",
            PosTag::JJ => "JJ",
            PosTag::JJR => "JJR",
            PosTag::JJS => "JJS",
            PosTag::LS => "LS",
            PosTag::MD => "MD",
            PosTag::NN => "NN",
            PosTag::NNS => "NNS",
            PosTag::NNP => "NNP",
            PosTag::NNPS => "NNPS",
            PosTag::PDT => "PDT",
            PosTag::POS => "POS",
            PosTag::PRP => "PRP",
            PosTag::PRPS => "PRP$",
            PosTag::RB => "RB",
            PosTag::RBR => "RBR",
            PosTag::RBS => "RBS",
            PosTag::RP => "RP",
            PosTag::SYM => "SYM",
            PosTag::TO => "TO",
            PosTag::UH => "UH",
            PosTag::VB => "VB",
            PosTag::VBD => "VBD",
            PosTag::VBG => "VBG",
            PosTag::VBN => "VBN",
            PosTag::VBP => "VBP",
            PosTag::VBZ => "VBZ",
            PosTag::WDT => "WDT",
            PosTag::WP => "WP",
            PosTag::WPS => "WP$",
            PosTag::WRB => "WRB",
        }
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PosTag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PosTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.label() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

impl From<PosTag> for String {
    fn from(tag: PosTag) -> String {
        tag.label().to_string()
    }
}

impl TryFrom<String> for PosTag {
    type Error = UnknownTag;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The set of tags that template tokens are matched against when a frame
/// is built. Tokens outside the inventory stay literal words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInventory {
    tags: FxHashSet<PosTag>,
}

impl TagInventory {
    /// The full 36-tag treebank inventory.
    pub fn penn() -> Self {
        Self {
            tags: PosTag::ALL.iter().copied().collect(),
        }
    }

    pub fn from_tags<I: IntoIterator<Item = PosTag>>(tags: I) -> Self {
        Self {
            tags: tags.into_iter().collect(),
        }
    }

    /// Resolve a template token to a tag, if it names one in this inventory.
    pub fn lookup(&self, token: &str) -> Option<PosTag> {
        token.parse().ok().filter(|tag| self.contains(*tag))
    }

    pub fn contains(&self, tag: PosTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Tags in treebank order.
    pub fn iter(&self) -> impl Iterator<Item = PosTag> + '_ {
        PosTag::ALL.iter().copied().filter(|t| self.contains(*t))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for TagInventory {
    fn default() -> Self {
        Self::penn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for tag in PosTag::ALL {
            assert_eq!(tag.label().parse::<PosTag>().unwrap(), tag);
        }
    }

    #[test]
    fn dollar_tags_use_treebank_spelling() {
        assert_eq!("PRP$".parse::<PosTag>().unwrap(), PosTag::PRPS);
        assert_eq!(PosTag::WPS.to_string(), "WP$");
        assert!("PRPS".parse::<PosTag>().is_err());
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert_eq!(
            "XYZ".parse::<PosTag>(),
            Err(UnknownTag("XYZ".to_string()))
        );
        // Tags are case-sensitive; lowercase words never become placeholders.
        assert!("nn".parse::<PosTag>().is_err());
    }

    #[test]
    fn inventory_lookup_respects_membership() {
        let inv = TagInventory::from_tags([PosTag::NN, PosTag::DT]);
        assert_eq!(inv.lookup("NN"), Some(PosTag::NN));
        assert_eq!(inv.lookup("VBD"), None);
        assert_eq!(inv.lookup("the"), None);
        assert_eq!(inv.len(), 2);
    }

    #[test]
    fn penn_inventory_has_all_tags() {
        let inv = TagInventory::penn();
        assert_eq!(inv.len(), 36);
        assert_eq!(inv.iter().next(), Some(PosTag::CC));
    }

    #[test]
    fn ron_uses_treebank_labels() {
        let s = ron::to_string(&PosTag::PRPS).unwrap();
        assert_eq!(s, "\"PRP$\"");
        let tag: PosTag = ron::from_str("\"VBG\"").unwrap();
        assert_eq!(tag, PosTag::VBG);
        assert!(ron::from_str::<PosTag>("\"BOGUS\"").is_err());
    }
}

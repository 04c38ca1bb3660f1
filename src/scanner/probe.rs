use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/// The value grammars a scanner can be asked about without consuming input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ProbeKind {
    Generic,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    Boolean,
    Line,
}

impl ProbeKind {
    /// Name of the probing method as learners know it (`hasNext`, `hasNextInt`, ...).
    pub fn method_name(&self) -> String {
        match self {
            ProbeKind::Generic => "hasNext".to_string(),
            kind => {
                let name = kind.as_ref();
                let mut chars = name.chars();
                let first = chars.next().map(|c| c.to_ascii_uppercase());
                format!("hasNext{}{}", first.unwrap_or_default(), chars.as_str())
            }
        }
    }
}

/// Results of every probe taken at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResults(BTreeMap<ProbeKind, bool>);

impl ProbeResults {
    /// Runs `probe` for every kind. The map is complete or not built at all.
    pub fn collect<F>(mut probe: F) -> Self
    where
        F: FnMut(ProbeKind) -> bool,
    {
        Self(ProbeKind::iter().map(|kind| (kind, probe(kind))).collect())
    }

    pub fn get(&self, kind: ProbeKind) -> bool {
        self.0.get(&kind).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProbeKind, bool)> + '_ {
        self.0.iter().map(|(kind, value)| (*kind, *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        ProbeKind::iter().all(|kind| self.0.contains_key(&kind))
    }
}

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An unordered denom pair, canonicalized lexicographically so that
/// (a, b) and (b, a) index the same taker fee entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DenomPair {
    denom0: String,
    denom1: String,
}

impl DenomPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let a = a.into();
        let b = b.into();
        if a <= b {
            Self { denom0: a, denom1: b }
        } else {
            Self { denom0: b, denom1: a }
        }
    }

    pub fn denom0(&self) -> &str {
        &self.denom0
    }

    pub fn denom1(&self) -> &str {
        &self.denom1
    }
}

impl fmt::Display for DenomPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.denom0, self.denom1)
    }
}

/// Protocol-level taker fees keyed by canonicalized denom pair. Pairs without
/// an entry fall back to the default fee threaded in from the router
/// configuration; there is no ambient global default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakerFeeMap {
    fees: BTreeMap<DenomPair, Decimal>,
}

impl TakerFeeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, a: impl Into<String>, b: impl Into<String>, fee: Decimal) {
        self.fees.insert(DenomPair::new(a, b), fee);
    }

    pub fn has(&self, a: &str, b: &str) -> bool {
        self.fees.contains_key(&DenomPair::new(a, b))
    }

    pub fn get(&self, a: &str, b: &str) -> Option<Decimal> {
        self.fees.get(&DenomPair::new(a, b)).copied()
    }

    /// Lookup with the configured default as fallback for absent pairs.
    pub fn fee_or_default(&self, a: &str, b: &str, default_fee: Decimal) -> Decimal {
        self.get(a, b).unwrap_or(default_fee)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DenomPair, &Decimal)> {
        self.fees.iter()
    }

    pub fn len(&self) -> usize {
        self.fees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fees.is_empty()
    }
}

impl FromIterator<(DenomPair, Decimal)> for TakerFeeMap {
    fn from_iter<T: IntoIterator<Item = (DenomPair, Decimal)>>(iter: T) -> Self {
        Self {
            fees: iter.into_iter().collect(),
        }
    }
}

/// Client-facing taker fee listing for one denom pair of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakerFeeForPair {
    pub denom0: String,
    pub denom1: String,
    pub taker_fee: Decimal,
}

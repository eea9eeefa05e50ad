use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed enumeration of the rhythm and ischemia classes the engine can
/// draw. Each variant maps to a fixed composer strategy and parameter set in
/// `compose`; adding a class means adding one variant and one composer arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rhythm {
    Sinus,
    SinusBradycardia,
    SinusTachycardia,
    AtrialFlutter,
    AtrialFibrillation,
    /// Sinus rhythm with a premature atrial complex.
    Pac,
    /// Paroxysmal supraventricular tachycardia.
    Psvt,
    Junctional,
    FirstDegreeBlock,
    StemiInferior,
    /// Non-ST-elevation / ischemic pattern.
    Nstemi,
}

impl Rhythm {
    pub const ALL: [Rhythm; 11] = [
        Rhythm::Sinus,
        Rhythm::SinusBradycardia,
        Rhythm::SinusTachycardia,
        Rhythm::AtrialFlutter,
        Rhythm::AtrialFibrillation,
        Rhythm::Pac,
        Rhythm::Psvt,
        Rhythm::Junctional,
        Rhythm::FirstDegreeBlock,
        Rhythm::StemiInferior,
        Rhythm::Nstemi,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rhythm::Sinus => "sinus",
            Rhythm::SinusBradycardia => "sinus_bradycardia",
            Rhythm::SinusTachycardia => "sinus_tachycardia",
            Rhythm::AtrialFlutter => "atrial_flutter",
            Rhythm::AtrialFibrillation => "atrial_fibrillation",
            Rhythm::Pac => "pac",
            Rhythm::Psvt => "psvt",
            Rhythm::Junctional => "junctional",
            Rhythm::FirstDegreeBlock => "first_degree_block",
            Rhythm::StemiInferior => "stemi_inferior",
            Rhythm::Nstemi => "nstemi",
        }
    }

    /// Lenient lookup: unknown names fall back to normal sinus. The
    /// identifier space is validated upstream by the question bank, so a
    /// miss here means a stale identifier, and drawing a sinus strip is
    /// preferable to drawing nothing.
    pub fn from_name_or_default(name: &str) -> Rhythm {
        name.parse().unwrap_or(Rhythm::Sinus)
    }
}

impl fmt::Display for Rhythm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strict parse failure, for callers that validate at the boundary.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown rhythm identifier: {0}")]
pub struct UnknownRhythm(pub String);

impl FromStr for Rhythm {
    type Err = UnknownRhythm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rhythm::ALL
            .iter()
            .copied()
            .find(|r| r.name() == s)
            .ok_or_else(|| UnknownRhythm(s.to_string()))
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical party identifier. Spellings follow the OpenDiscourse faction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Party {
    #[serde(rename = "AfD")]
    AfD,
    #[serde(rename = "BSW")]
    Bsw,
    #[serde(rename = "CDU/CSU")]
    CduCsu,
    #[serde(rename = "DIE LINKE.")]
    DieLinke,
    #[serde(rename = "FDP")]
    Fdp,
    #[serde(rename = "Grüne")]
    Gruene,
    #[serde(rename = "SPD")]
    Spd,
    // Historical factions of the early Bundestag terms
    #[serde(rename = "BP")]
    Bp,
    #[serde(rename = "DA")]
    Da,
    #[serde(rename = "DP")]
    Dp,
    #[serde(rename = "DPB")]
    Dpb,
    #[serde(rename = "DRP")]
    Drp,
    #[serde(rename = "FU")]
    Fu,
    #[serde(rename = "FVP")]
    Fvp,
    #[serde(rename = "GB/BHE")]
    GbBhe,
    #[serde(rename = "KPD")]
    Kpd,
    #[serde(rename = "NR")]
    Nr,
    #[serde(rename = "SSW")]
    Ssw,
    #[serde(rename = "WAV")]
    Wav,
    #[serde(rename = "Zentrum")]
    Zentrum,
    /// Unaffiliated members and anyone without a caucus
    #[serde(rename = "Fraktionslos")]
    Fraktionslos,
}

impl Party {
    pub const ALL: [Party; 21] = [
        Party::AfD,
        Party::Bsw,
        Party::CduCsu,
        Party::DieLinke,
        Party::Fdp,
        Party::Gruene,
        Party::Spd,
        Party::Bp,
        Party::Da,
        Party::Dp,
        Party::Dpb,
        Party::Drp,
        Party::Fu,
        Party::Fvp,
        Party::GbBhe,
        Party::Kpd,
        Party::Nr,
        Party::Ssw,
        Party::Wav,
        Party::Zentrum,
        Party::Fraktionslos,
    ];

    /// Display spelling, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Party::AfD => "AfD",
            Party::Bsw => "BSW",
            Party::CduCsu => "CDU/CSU",
            Party::DieLinke => "DIE LINKE.",
            Party::Fdp => "FDP",
            Party::Gruene => "Grüne",
            Party::Spd => "SPD",
            Party::Bp => "BP",
            Party::Da => "DA",
            Party::Dp => "DP",
            Party::Dpb => "DPB",
            Party::Drp => "DRP",
            Party::Fu => "FU",
            Party::Fvp => "FVP",
            Party::GbBhe => "GB/BHE",
            Party::Kpd => "KPD",
            Party::Nr => "NR",
            Party::Ssw => "SSW",
            Party::Wav => "WAV",
            Party::Zentrum => "Zentrum",
            Party::Fraktionslos => "Fraktionslos",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Chemical species supported by the equilibrium grid
//!
//! The grid tabulates mixing fractions for exactly 34 gas-phase species.
//! Using an enum rather than free-form strings makes abundance lookups
//! type-safe and keeps per-species metadata (molecular mass, polarizability)
//! in one place.

use std::fmt;

/// One of the 34 chemical species tracked by the equilibrium grid
///
/// # Enum type safety
///
/// Species identity is fixed at compile time. File import
/// ([`Species::from_name`]) accepts the legacy column name `"CH2O"` as an
/// alias for [`Species::H2CO`]; no other renames are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum Species {
    H2,
    He,
    H2O,
    CH4,
    CO,
    CO2,
    NH3,
    HCN,
    C2H2,
    C2H4,
    C2H6,
    H2S,
    SO2,
    PH3,
    Na,
    K,
    TiO,
    VO,
    SiO,
    SiH,
    MgH,
    CaH,
    FeH,
    CrH,
    O2,
    O3,
    OH,
    NO,
    NO2,
    N2,
    OCS,
    HCl,
    HF,
    H2CO,
}

/// Number of supported species
pub const NUM_SPECIES: usize = 34;

impl Species {
    /// All supported species, in canonical storage order
    ///
    /// The position of a species in this array is its row/column index in
    /// every dense abundance structure of the crate.
    pub const ALL: [Species; NUM_SPECIES] = [
        Species::H2,
        Species::He,
        Species::H2O,
        Species::CH4,
        Species::CO,
        Species::CO2,
        Species::NH3,
        Species::HCN,
        Species::C2H2,
        Species::C2H4,
        Species::C2H6,
        Species::H2S,
        Species::SO2,
        Species::PH3,
        Species::Na,
        Species::K,
        Species::TiO,
        Species::VO,
        Species::SiO,
        Species::SiH,
        Species::MgH,
        Species::CaH,
        Species::FeH,
        Species::CrH,
        Species::O2,
        Species::O3,
        Species::OH,
        Species::NO,
        Species::NO2,
        Species::N2,
        Species::OCS,
        Species::HCl,
        Species::HF,
        Species::H2CO,
    ];

    /// Canonical storage index of this species
    ///
    /// Declaration order matches [`Species::ALL`], so the discriminant is the
    /// storage index.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical name as used in data files
    pub fn name(self) -> &'static str {
        match self {
            Species::H2 => "H2",
            Species::He => "He",
            Species::H2O => "H2O",
            Species::CH4 => "CH4",
            Species::CO => "CO",
            Species::CO2 => "CO2",
            Species::NH3 => "NH3",
            Species::HCN => "HCN",
            Species::C2H2 => "C2H2",
            Species::C2H4 => "C2H4",
            Species::C2H6 => "C2H6",
            Species::H2S => "H2S",
            Species::SO2 => "SO2",
            Species::PH3 => "PH3",
            Species::Na => "Na",
            Species::K => "K",
            Species::TiO => "TiO",
            Species::VO => "VO",
            Species::SiO => "SiO",
            Species::SiH => "SiH",
            Species::MgH => "MgH",
            Species::CaH => "CaH",
            Species::FeH => "FeH",
            Species::CrH => "CrH",
            Species::O2 => "O2",
            Species::O3 => "O3",
            Species::OH => "OH",
            Species::NO => "NO",
            Species::NO2 => "NO2",
            Species::N2 => "N2",
            Species::OCS => "OCS",
            Species::HCl => "HCl",
            Species::HF => "HF",
            Species::H2CO => "H2CO",
        }
    }

    /// Parse a species from its data-file name
    ///
    /// Accepts the legacy ExoTransmit-style column name `"CH2O"` as an alias
    /// for formaldehyde, which this crate stores as `H2CO`.
    pub fn from_name(name: &str) -> Option<Species> {
        // Legacy alias kept for compatibility with older abundance tables
        if name == "CH2O" {
            return Some(Species::H2CO);
        }
        Species::ALL.iter().copied().find(|s| s.name() == name)
    }

    /// Molecular mass \[amu\]
    pub fn mass_amu(self) -> f64 {
        match self {
            Species::H2 => 2.016,
            Species::He => 4.003,
            Species::H2O => 18.015,
            Species::CH4 => 16.043,
            Species::CO => 28.010,
            Species::CO2 => 44.009,
            Species::NH3 => 17.031,
            Species::HCN => 27.025,
            Species::C2H2 => 26.037,
            Species::C2H4 => 28.053,
            Species::C2H6 => 30.069,
            Species::H2S => 34.081,
            Species::SO2 => 64.064,
            Species::PH3 => 33.998,
            Species::Na => 22.990,
            Species::K => 39.098,
            Species::TiO => 63.866,
            Species::VO => 66.941,
            Species::SiO => 44.085,
            Species::SiH => 29.093,
            Species::MgH => 25.313,
            Species::CaH => 41.086,
            Species::FeH => 56.853,
            Species::CrH => 53.004,
            Species::O2 => 31.998,
            Species::O3 => 47.997,
            Species::OH => 17.007,
            Species::NO => 30.006,
            Species::NO2 => 46.005,
            Species::N2 => 28.014,
            Species::OCS => 60.075,
            Species::HCl => 36.458,
            Species::HF => 20.006,
            Species::H2CO => 30.026,
        }
    }

    /// Static polarizability \[m³\]
    ///
    /// Drives the Rayleigh scattering term. Species with negligible gas-phase
    /// abundance at scattering-relevant altitudes carry 0.0, which removes
    /// them from the scattering sum.
    pub fn polarizability(self) -> f64 {
        match self {
            Species::H2 => 0.804e-30,
            Species::He => 0.21e-30,
            Species::H2O => 1.45e-30,
            Species::CH4 => 2.593e-30,
            Species::CO => 1.95e-30,
            Species::CO2 => 2.911e-30,
            Species::NH3 => 2.26e-30,
            Species::N2 => 1.74e-30,
            Species::O2 => 1.58e-30,
            _ => 0.0,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_34_species() {
        assert_eq!(Species::ALL.len(), NUM_SPECIES);
        assert_eq!(NUM_SPECIES, 34);
    }

    #[test]
    fn test_index_round_trip() {
        for (i, species) in Species::ALL.iter().enumerate() {
            assert_eq!(species.index(), i);
        }
    }

    #[test]
    fn test_name_round_trip() {
        for species in Species::ALL {
            assert_eq!(Species::from_name(species.name()), Some(species));
        }
    }

    #[test]
    fn test_legacy_formaldehyde_alias() {
        assert_eq!(Species::from_name("CH2O"), Some(Species::H2CO));
        assert_eq!(Species::from_name("H2CO"), Some(Species::H2CO));
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert_eq!(Species::from_name("unobtainium"), None);
    }

    #[test]
    fn test_masses_are_physical() {
        for species in Species::ALL {
            let m = species.mass_amu();
            assert!(m > 1.0 && m < 100.0, "{} mass {}", species, m);
        }
    }
}

//! Application constants for cruise curation
//!
//! This module contains the key column vocabulary, flag schemes, pseudo-column
//! suffixes and physical constants used throughout the crate.

// =============================================================================
// Key Columns
// =============================================================================

/// Columns that identify a bottle sample, in key order
pub const BOTTLE_KEY_COLUMNS: &[&str] = &["EXPOCODE", "STNNBR", "CASTNO", "SAMPNO", "BTLNBR"];

/// Globals that identify one cast file inside a collection
pub const DATAFILE_KEY_COLUMNS: &[&str] = &["EXPOCODE", "STNNBR", "CASTNO"];

/// Pressure parameters in order of preference
pub const PRESSURE_PARAMETERS: &[&str] = &["CTDPRS", "CTDRAW"];

/// Station number column
pub const STATION_COLUMN: &str = "STNNBR";

/// Cast number column
pub const CAST_COLUMN: &str = "CASTNO";

/// Bottle number column
pub const BOTTLE_COLUMN: &str = "BTLNBR";

/// Cruise identifier column/global
pub const EXPOCODE_COLUMN: &str = "EXPOCODE";

/// Latitude global
pub const LATITUDE_GLOBAL: &str = "LATITUDE";

/// Processing stamp global
pub const STAMP_GLOBAL: &str = "stamp";

/// Free-text header global
pub const HEADER_GLOBAL: &str = "header";

// =============================================================================
// Parameters
// =============================================================================

/// Leading marker of file-internal parameters that bypass the registry
pub const CONTRIVED_MARKER: char = '_';

/// Display format used for contrived parameters
pub const CONTRIVED_FORMAT: &str = "%11s";

/// Display order for parameters with no registered order (sorted last)
pub const UNORDERED: u32 = u32::MAX;

/// Suffix naming the WOCE flag pseudo-column of a parameter
pub const FLAG_ENDING_WOCE: &str = "_FLAG_W";

/// Suffix naming the IGOSS flag pseudo-column of a parameter
pub const FLAG_ENDING_IGOSS: &str = "_FLAG_I";

/// Canonical placeholder written for an absent measurement
pub const FILL_VALUE: f64 = -999.0;

// =============================================================================
// Quality Flags
// =============================================================================

/// WOCE quality flag values
pub mod woce {
    /// Sample drawn but no analysis received
    pub const NOT_ANALYZED: u8 = 1;

    /// Acceptable measurement
    pub const ACCEPTABLE: u8 = 2;

    /// Questionable measurement
    pub const QUESTIONABLE: u8 = 3;

    /// Bad measurement
    pub const BAD: u8 = 4;

    /// Value not reported
    pub const NOT_REPORTED: u8 = 5;

    /// Mean of replicate measurements
    pub const REPLICATE_MEAN: u8 = 6;

    /// Manual chromatographic peak measurement
    pub const MANUAL_PEAK: u8 = 7;

    /// Irregular digital chromatographic peak integration
    pub const IRREGULAR_PEAK: u8 = 8;

    /// Sample not drawn / data missing
    pub const MISSING: u8 = 9;

    /// Lowest valid WOCE flag
    pub const MIN: u8 = NOT_ANALYZED;

    /// Highest valid WOCE flag
    pub const MAX: u8 = MISSING;

    /// Check whether a flag is a valid WOCE code
    pub fn is_valid(flag: u8) -> bool {
        (MIN..=MAX).contains(&flag)
    }
}

/// IGOSS quality flag values
pub mod igoss {
    /// No quality control performed
    pub const NO_QC: u8 = 0;

    /// Missing value
    pub const MISSING: u8 = 9;

    /// Check whether a flag is a valid IGOSS code
    pub fn is_valid(flag: u8) -> bool {
        flag <= MISSING
    }
}

// =============================================================================
// Physical Constants
// =============================================================================

/// Equatorial surface gravity in m/s^2
pub const GRAVITY_EQUATOR: f64 = 9.780318;

/// Correction for gravity as pressure increases (closer to the Earth's center)
pub const DGRAV_DPRES: f64 = 2.184e-6;

/// Pressures above this (dbar) start Sverdrup integration relative to the first level
pub const SHALLOW_START_DBAR: f64 = 15.0;

/// Degrees per radian as used by the UNESCO 1983 depth formula
pub const DEGREES_PER_RADIAN: f64 = 57.29578;

/// Salinity assumed by unit conversions when none is measured (PSS-78)
pub const APPROXIMATION_SALINITY: f64 = 34.8;

/// Temperature assumed by unit conversions when none is measured (deg C)
pub const APPROXIMATION_TEMPERATURE: f64 = 25.0;

/// Default relative tolerance for numeric equality during diffs
pub const DEFAULT_EPSILON: f64 = 1e-6;

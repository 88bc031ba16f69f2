//! The state record exchanged between the store, the API, and the
//! ingestion pipeline.

use serde::{Deserialize, Serialize};

/// One row of the states dataset.
///
/// Serialized field names are the registry's public names, so a record
/// rendered as JSON is also a valid source row for ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StateRecord {
    /// State name, unique across the dataset.
    pub name: String,
    /// Population estimate, in thousands.
    pub population: i32,
    /// Per-capita income, in dollars.
    pub income: i32,
    /// Illiterate share of the population, percent.
    pub illiteracy: f64,
    /// Life expectancy, in years.
    pub life_exp: f64,
    /// Murder rate per 100,000 population.
    pub murder: f64,
    /// High-school graduate share of the population, percent.
    pub hs_grad: f64,
    /// Mean days per year with minimum temperature below freezing.
    pub frost: i32,
    /// Land area, in square miles.
    pub area: i32,
}

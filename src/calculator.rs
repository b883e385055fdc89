use serde::Serialize;

/// Grid emission factor, kg CO₂ per kWh
pub const CO2_KG_PER_KWH: f64 = 0.82;
pub const MIN_EFFICIENCY_PERCENT: f64 = 15.0;
pub const MAX_EFFICIENCY_PERCENT: f64 = 22.0;
const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CalculationError {
    #[error("Invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarPotential {
    /// kWh per year
    pub annual_energy: i64,
    /// Same currency unit as the electricity rate
    pub annual_savings: i64,
    /// kg per year
    pub co2_saved: i64,
}

/// Estimate yearly output for a roof with no loss, tilt or shading model.
///
/// Savings and CO₂ are derived from the unrounded energy figure; all three results
/// are rounded to the nearest integer.
pub fn calculate_solar_potential(
    roof_area: f64,
    efficiency_percent: f64,
    electricity_rate: f64,
    avg_daily_irradiance: f64,
) -> Result<SolarPotential, CalculationError> {
    check("roof area", roof_area, |v| v > 0.0)?;
    check("efficiency percent", efficiency_percent, |v| {
        (MIN_EFFICIENCY_PERCENT..=MAX_EFFICIENCY_PERCENT).contains(&v)
    })?;
    check("electricity rate", electricity_rate, |v| v > 0.0)?;
    check("average daily irradiance", avg_daily_irradiance, |v| v >= 0.0)?;

    let annual_energy = roof_area * (efficiency_percent / 100.0) * avg_daily_irradiance * DAYS_PER_YEAR;

    Ok(SolarPotential {
        annual_energy: annual_energy.round() as i64,
        annual_savings: (annual_energy * electricity_rate).round() as i64,
        co2_saved: (annual_energy * CO2_KG_PER_KWH).round() as i64,
    })
}

fn check(
    field: &'static str,
    value: f64,
    valid: impl Fn(f64) -> bool,
) -> Result<(), CalculationError> {
    if value.is_finite() && valid(value) {
        Ok(())
    } else {
        Err(CalculationError::InvalidInput { field, value })
    }
}

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::models::{
    Location, MonthlyIrradiance, NormalizedSolarData, DATA_SOURCE, IRRADIANCE_PARAMETER,
    IRRADIANCE_UNIT,
};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Month component of the provider's annual-aggregate key (e.g. "202413")
const ANNUAL_MONTH: u32 = 13;

/// Reshape a NASA POWER monthly point payload into monthly records plus an annual
/// average.
///
/// The reading map lives at `properties.parameter.ALLSKY_SFC_SW_DWN`. A missing or
/// malformed map is treated as empty, which yields no months and a zero average.
/// Negative readings are provider sentinels for missing data and are skipped, as is
/// the `YYYY13` annual aggregate.
#[instrument(skip(payload))]
pub fn normalize(payload: &Value, latitude: f64, longitude: f64, year: i32) -> NormalizedSolarData {
    let readings = payload
        .pointer(&format!("/properties/parameter/{IRRADIANCE_PARAMETER}"))
        .and_then(Value::as_object);

    let mut monthly_data = Vec::with_capacity(12);
    let mut sum = 0.0;
    let mut skipped = 0;

    match readings {
        Some(readings) => {
            for (period, reading) in readings {
                let Some(month) = parse_month(period) else {
                    warn!("Skipping reading with unrecognized period key '{}'", period);
                    skipped += 1;
                    continue;
                };
                if month == ANNUAL_MONTH {
                    continue;
                }

                let Some(value) = reading.as_f64() else {
                    warn!("Skipping non-numeric reading for {}: {}", period, reading);
                    skipped += 1;
                    continue;
                };
                if value < 0.0 {
                    debug!("Period {} has no data (sentinel {})", period, value);
                    skipped += 1;
                    continue;
                }

                let month_index = month - 1;
                sum += value;
                monthly_data.push(MonthlyIrradiance {
                    month: MONTH_NAMES[month_index as usize].to_string(),
                    month_index,
                    irradiance: round2(value),
                });
            }
        }
        None => warn!("Provider response has no {} readings", IRRADIANCE_PARAMETER),
    }

    // Provider key order is not guaranteed chronological
    monthly_data.sort_by_key(|m| m.month_index);

    let average_daily_irradiance = if monthly_data.is_empty() {
        0.0
    } else {
        round2(sum / monthly_data.len() as f64)
    };

    debug!(
        "Normalized {} months ({} skipped), average {:.2} {}",
        monthly_data.len(),
        skipped,
        average_daily_irradiance,
        IRRADIANCE_UNIT
    );

    NormalizedSolarData {
        average_daily_irradiance,
        monthly_data,
        location: Location {
            latitude,
            longitude,
        },
        year,
        data_source: DATA_SOURCE.to_string(),
        parameter: IRRADIANCE_PARAMETER.to_string(),
        unit: IRRADIANCE_UNIT.to_string(),
        note: format!("Average daily solar irradiance for {year}"),
    }
}

/// Month number (1-13) from the last two characters of a `YYYYMM` key
fn parse_month(period: &str) -> Option<u32> {
    if period.len() != 6 || !period.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: u32 = period[4..].parse().ok()?;
    (1..=ANNUAL_MONTH).contains(&month).then_some(month)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(readings: Value) -> Value {
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [77.2, 28.6, 216.0] },
            "properties": { "parameter": { "ALLSKY_SFC_SW_DWN": readings } }
        })
    }

    #[test]
    fn test_full_year_average() {
        let readings = payload(json!({
            "202401": 4.1, "202402": 5.02, "202403": 6.13, "202404": 6.88,
            "202405": 7.2, "202406": 6.51, "202407": 5.37, "202408": 5.11,
            "202409": 5.4, "202410": 5.25, "202411": 4.46, "202412": 3.9,
            "202413": 5.44
        }));

        let data = normalize(&readings, 28.6, 77.2, 2024);

        let expected: f64 = [
            4.1, 5.02, 6.13, 6.88, 7.2, 6.51, 5.37, 5.11, 5.4, 5.25, 4.46, 3.9,
        ]
        .iter()
        .sum::<f64>()
            / 12.0;
        assert_eq!(data.monthly_data.len(), 12);
        assert_eq!(data.average_daily_irradiance, round2(expected));
        assert_eq!(data.monthly_data[0].month, "January");
        assert_eq!(data.monthly_data[11].month, "December");
        assert_eq!(data.monthly_data[11].month_index, 11);
    }

    #[test]
    fn test_excludes_sentinel_and_annual_key() {
        let readings = payload(json!({"202401": 5.0, "202402": -999, "202413": 6.0}));

        let data = normalize(&readings, 10.0, 20.0, 2024);

        assert_eq!(
            data.monthly_data,
            vec![MonthlyIrradiance {
                month: "January".to_string(),
                month_index: 0,
                irradiance: 5.0,
            }]
        );
        assert_eq!(data.average_daily_irradiance, 5.0);
    }

    #[test]
    fn test_any_negative_value_is_missing() {
        let readings = payload(json!({"202401": 4.0, "202402": -0.5, "202403": 6.0}));

        let data = normalize(&readings, 0.0, 0.0, 2024);

        assert_eq!(data.monthly_data.len(), 2);
        assert_eq!(data.average_daily_irradiance, 5.0);
    }

    #[test]
    fn test_no_valid_months_yields_zero() {
        let readings = payload(json!({"202401": -999, "202402": -999, "202413": -999}));

        let data = normalize(&readings, 0.0, 0.0, 2024);

        assert!(data.monthly_data.is_empty());
        assert_eq!(data.average_daily_irradiance, 0.0);
    }

    #[test]
    fn test_missing_parameter_path_yields_zero() {
        let data = normalize(&json!({"messages": ["oops"]}), 1.0, 2.0, 2024);
        assert!(data.monthly_data.is_empty());
        assert_eq!(data.average_daily_irradiance, 0.0);

        let data = normalize(&payload(json!([1, 2, 3])), 1.0, 2.0, 2024);
        assert!(data.monthly_data.is_empty());
        assert_eq!(data.average_daily_irradiance, 0.0);
    }

    #[test]
    fn test_partial_year_averages_present_months_only() {
        let readings = payload(json!({"202403": 6.0, "202404": 7.0, "202405": 8.0}));

        let data = normalize(&readings, 0.0, 0.0, 2024);

        assert_eq!(data.monthly_data.len(), 3);
        assert_eq!(data.average_daily_irradiance, 7.0);
    }

    #[test]
    fn test_sorted_by_month_index_across_year_boundary() {
        // String order puts 202311 first; month order must put 202401 first
        let readings = payload(json!({"202311": 3.0, "202312": 2.5, "202401": 2.8}));

        let data = normalize(&readings, 0.0, 0.0, 2024);

        let indices: Vec<u32> = data.monthly_data.iter().map(|m| m.month_index).collect();
        assert_eq!(indices, vec![0, 10, 11]);
    }

    #[test]
    fn test_rounds_values_to_two_decimals() {
        let readings = payload(json!({"202401": 5.126, "202402": 4.0}));

        let data = normalize(&readings, 0.0, 0.0, 2024);

        assert_eq!(data.monthly_data[0].irradiance, 5.13);
        // Average uses unrounded readings: (5.126 + 4.0) / 2 = 4.563
        assert_eq!(data.average_daily_irradiance, 4.56);
    }

    #[test]
    fn test_skips_malformed_keys_and_values() {
        let readings = payload(json!({
            "202401": 5.0, "2024": 9.0, "202400": 9.0, "2024ab": 9.0, "202402": "n/a"
        }));

        let data = normalize(&readings, 0.0, 0.0, 2024);

        assert_eq!(data.monthly_data.len(), 1);
        assert_eq!(data.average_daily_irradiance, 5.0);
    }

    #[test]
    fn test_echoes_requested_location_and_metadata() {
        let data = normalize(&payload(json!({"202406": 6.0})), 28.6139, 77.209, 2024);

        assert_eq!(data.location.latitude, 28.6139);
        assert_eq!(data.location.longitude, 77.209);
        assert_eq!(data.year, 2024);
        assert_eq!(data.parameter, "ALLSKY_SFC_SW_DWN");
        assert_eq!(data.unit, "kWh/m²/day");
        assert!(data.note.contains("2024"));
    }
}

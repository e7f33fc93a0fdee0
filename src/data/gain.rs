use std::collections::HashMap;

use super::dates::parse_date;
use super::headers::{resolve, Field};
use super::model::{AnimalGainSummary, RawRecord, WeighingRecord, NOT_AVAILABLE};

/// Identity given to rows without any animal column value.
pub const UNKNOWN_ANIMAL: &str = "UNKNOWN";

// ---------------------------------------------------------------------------
// Row validation
// ---------------------------------------------------------------------------

/// Why a row could not become a [`WeighingRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingDate,
    UnparseableDate,
    InvalidWeight,
}

/// Animal identity of a row: first non-blank alias value, trimmed, or
/// [`UNKNOWN_ANIMAL`].
pub fn animal_id(record: &RawRecord) -> String {
    resolve(record, Field::Animal)
        .and_then(|v| v.as_text())
        .unwrap_or_else(|| UNKNOWN_ANIMAL.to_string())
}

/// Validate one raw row. Never panics; invalid rows come back as a
/// [`Rejection`] for the caller to drop.
pub fn validate(record: &RawRecord) -> Result<WeighingRecord, Rejection> {
    let date_cell = resolve(record, Field::Date).ok_or(Rejection::MissingDate)?;
    let date = parse_date(date_cell).ok_or(Rejection::UnparseableDate)?;
    let weight_kg = resolve(record, Field::Weight)
        .and_then(|v| v.as_f64())
        .ok_or(Rejection::InvalidWeight)?;

    Ok(WeighingRecord {
        animal_id: animal_id(record),
        date,
        weight_kg,
        pasture: resolve(record, Field::Pasture).and_then(|v| v.as_text()),
        sex: resolve(record, Field::Sex)
            .and_then(|v| v.as_text())
            .map(|s| s.to_uppercase()),
        age_months: resolve(record, Field::Age).and_then(|v| v.as_f64()),
    })
}

// ---------------------------------------------------------------------------
// Gain calculation
// ---------------------------------------------------------------------------

/// Round to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Compute one [`AnimalGainSummary`] per animal that has at least one
/// positive-length interval between valid weighings.
///
/// Animals appear in the order their first row was seen. The gain is the
/// unweighted mean of the daily gains of consecutive weighing pairs, not
/// the first-to-last slope.
pub fn calculate_gains(records: &[RawRecord]) -> Vec<AnimalGainSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&RawRecord>> = HashMap::new();
    for record in records {
        let id = animal_id(record);
        groups
            .entry(id.clone())
            .or_insert_with(|| {
                order.push(id);
                Vec::new()
            })
            .push(record);
    }

    let mut summaries = Vec::new();
    for id in order {
        let Some(rows) = groups.get(&id) else {
            continue;
        };
        if rows.len() < 2 {
            log::debug!("{id}: single row, skipped");
            continue;
        }
        let valid: Vec<WeighingRecord> = rows.iter().filter_map(|r| validate(r).ok()).collect();
        match summarize(&id, valid) {
            Some(summary) => summaries.push(summary),
            None => log::debug!("{id}: no usable weighing interval, skipped"),
        }
    }

    log::info!(
        "Computed gains for {} of {} animals",
        summaries.len(),
        groups.len()
    );
    summaries
}

/// Summary of one animal's validated weighings, or `None` when fewer than
/// two remain or no pair is separated by at least one day.
fn summarize(animal: &str, mut weighings: Vec<WeighingRecord>) -> Option<AnimalGainSummary> {
    if weighings.len() < 2 {
        return None;
    }
    // Total order so same-day rows never depend on input order.
    weighings.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.weight_kg.total_cmp(&b.weight_kg))
            .then_with(|| a.pasture.cmp(&b.pasture))
            .then_with(|| a.sex.cmp(&b.sex))
            .then_with(|| {
                let age = |w: &WeighingRecord| w.age_months.unwrap_or(f64::NEG_INFINITY);
                age(a).total_cmp(&age(b))
            })
    });

    let gains: Vec<f64> = weighings
        .windows(2)
        .filter_map(|pair| {
            let [prev, cur] = pair else { return None };
            let days = (cur.date - prev.date).num_days() as f64;
            (days > 0.0).then(|| (cur.weight_kg - prev.weight_kg) / days)
        })
        .collect();
    if gains.is_empty() {
        return None;
    }
    let mean = gains.iter().sum::<f64>() / gains.len() as f64;

    let first = weighings.first()?;
    let last = weighings.last()?;
    Some(AnimalGainSummary {
        animal: animal.to_string(),
        pasture: last.pasture.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        sex: last.sex.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        age_months: last.age_months,
        average_daily_gain_kg: round4(mean),
        weighing_count: weighings.len(),
        initial_weight_kg: first.weight_kg,
        final_weight_kg: last.weight_kg,
    })
}

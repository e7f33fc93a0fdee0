use std::collections::BTreeMap;

use super::model::{CellValue, RawRecord};

// ---------------------------------------------------------------------------
// Header normalisation
// ---------------------------------------------------------------------------

/// Canonical form of a column name: trimmed and upper-cased.
pub fn normalize_header(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Rewrite every key of `record` to its canonical form.
///
/// When two source columns collapse onto the same canonical name
/// (`"Peso"` and `"PESO "`), the first non-blank value wins.
pub fn normalize_record(record: RawRecord) -> RawRecord {
    let mut cells: BTreeMap<String, CellValue> = BTreeMap::new();
    for (key, value) in record.into_cells() {
        let key = normalize_header(&key);
        match cells.get(&key) {
            Some(existing) if !existing.is_blank() => {}
            _ => {
                cells.insert(key, value);
            }
        }
    }
    RawRecord::new(cells)
}

// ---------------------------------------------------------------------------
// Logical fields and their accepted column aliases
// ---------------------------------------------------------------------------

/// A logical input field the calculator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Animal,
    Date,
    Weight,
    Sex,
    Pasture,
    Age,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Animal,
        Field::Date,
        Field::Weight,
        Field::Sex,
        Field::Pasture,
        Field::Age,
    ];

    /// Canonical column names accepted for this field, in lookup order.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Animal => &["ANIMAL", "ID", "BRINCO"],
            Field::Date => &["DATA", "DATA_PESAGEM", "DATE", "WEIGHING_DATE"],
            Field::Weight => &["PESO", "WEIGHT", "WEIGHT_KG"],
            Field::Sex => &["SX", "SEXO", "SEX"],
            Field::Pasture => &["LOCAL", "PASTO", "PASTURE"],
            Field::Age => &["MESES", "AGE", "AGE_MONTHS"],
        }
    }
}

/// First non-blank value among the aliases of `field`.
pub fn resolve(record: &RawRecord, field: Field) -> Option<&CellValue> {
    field
        .aliases()
        .iter()
        .filter_map(|alias| record.get(alias))
        .find(|value| !value.is_blank())
}

/// Fields for which none of the aliases appear among `columns`.
pub fn missing_fields<'a>(columns: impl IntoIterator<Item = &'a String>) -> Vec<Field> {
    let columns: Vec<&String> = columns.into_iter().collect();
    Field::ALL
        .into_iter()
        .filter(|field| {
            !field
                .aliases()
                .iter()
                .any(|alias| columns.iter().any(|c| c.as_str() == *alias))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, CellValue)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn header_variants_collapse() {
        assert_eq!(normalize_header("Data"), "DATA");
        assert_eq!(normalize_header(" data "), "DATA");
        assert_eq!(normalize_header("DATA"), "DATA");
    }

    #[test]
    fn normalize_record_keeps_first_non_blank_on_collision() {
        let rec = record(&[
            (" PESO", CellValue::Null),
            ("Peso", CellValue::Float(120.0)),
        ]);
        let norm = normalize_record(rec);
        assert_eq!(norm.get("PESO"), Some(&CellValue::Float(120.0)));
        assert_eq!(norm.columns().count(), 1);
    }

    #[test]
    fn resolve_follows_alias_order() {
        let rec = record(&[
            ("SEXO", CellValue::String("f".into())),
            ("SX", CellValue::String("m".into())),
        ]);
        assert_eq!(
            resolve(&rec, Field::Sex),
            Some(&CellValue::String("m".into()))
        );
    }

    #[test]
    fn resolve_skips_blank_aliases() {
        let rec = record(&[
            ("DATA", CellValue::String("  ".into())),
            ("DATA_PESAGEM", CellValue::String("01/02/2024".into())),
        ]);
        assert_eq!(
            resolve(&rec, Field::Date),
            Some(&CellValue::String("01/02/2024".into()))
        );
        assert_eq!(resolve(&rec, Field::Weight), None);
    }

    #[test]
    fn reports_missing_fields() {
        let cols = vec!["ANIMAL".to_string(), "DATA".to_string(), "PESO".to_string()];
        assert_eq!(
            missing_fields(&cols),
            vec![Field::Sex, Field::Pasture, Field::Age]
        );
    }
}

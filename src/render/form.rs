//! Key/value form rendering
//!
//! The two single-reading methods (CIR7, S01) display their one record as a
//! labeled form instead of a one-row table. Fields are grouped into a fixed
//! section order; anything a section does not claim lands in a trailing
//! "Other" section, sorted alphabetically. Each field shows its raw code
//! and, when resolvable, its human meaning.

use serde::Serialize;

use super::table::format_cell;
use crate::meaning::MeaningMap;
use crate::report::Record;

const SECTION_LAYOUT: [(&str, &[&str]); 6] = [
    (
        "General parameters",
        &[
            "Cnc.Id", "Cnt.Id", "Vf", "VPrime", "Fh", "PF", "Ca", "PP", "Fc", "Eacti", "Eanti",
            "IdRpt", "IdPet", "Version", "recordTag",
        ],
    ),
    ("Voltages", &["L1v", "L2v", "L3v"]),
    ("Currents", &["L1i", "L2i", "L3i", "L3", "I3"]),
    ("Powers", &["Pimp", "Pexp", "Qimp", "Qexp"]),
    ("Energies", &["Ala", "AEa", "R1a", "R2a", "R3a", "R4a"]),
    (
        "Demand threshold",
        &[
            "ATariff", "AThres", "Dctcp", "DThres1", "DThres2", "DThres3", "DThres4", "DThres5",
            "DThres6",
        ],
    ),
];

/// One labeled field in the form
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormField {
    /// Display code (last segment of a dotted key)
    pub code: String,
    /// Full record key, used for export columns
    pub key: String,
    /// Resolved human meaning, when the lookup found one
    pub meaning: Option<String>,
    pub value: String,
}

/// A titled group of fields
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormSection {
    pub title: String,
    pub fields: Vec<FormField>,
}

/// A rendered key/value form for a single record
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormView {
    /// The report method that produced the record
    pub method: String,
    pub sections: Vec<FormSection>,
}

impl FormView {
    pub fn from_record(method: &str, record: &Record, meanings: &MeaningMap) -> Self {
        let mut sections = Vec::new();
        let mut used: Vec<&str> = Vec::new();

        for (title, keys) in SECTION_LAYOUT {
            let fields: Vec<FormField> = keys
                .iter()
                .copied()
                .filter(|k| record.contains_key(*k))
                .map(|k| {
                    used.push(k);
                    build_field(k, record, meanings)
                })
                .collect();
            if !fields.is_empty() {
                sections.push(FormSection {
                    title: title.to_string(),
                    fields,
                });
            }
        }

        let mut rest: Vec<&str> = record
            .keys()
            .map(String::as_str)
            .filter(|k| !used.contains(k))
            .collect();
        rest.sort_unstable();
        if !rest.is_empty() {
            sections.push(FormSection {
                title: "Other".to_string(),
                fields: rest
                    .iter()
                    .map(|k| build_field(k, record, meanings))
                    .collect(),
            });
        }

        Self {
            method: method.to_string(),
            sections,
        }
    }

    /// Column order for export: keys exactly as sectioned
    pub fn export_columns(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|s| s.fields.iter().map(|f| f.key.clone()))
            .collect()
    }
}

fn build_field(key: &str, record: &Record, meanings: &MeaningMap) -> FormField {
    let code = match key.rsplit_once('.') {
        Some((_, base)) => base.to_string(),
        None => key.to_string(),
    };
    FormField {
        code,
        key: key.to_string(),
        meaning: meanings.field_meaning(key),
        value: record.get(key).map(format_cell).unwrap_or_default(),
    }
}

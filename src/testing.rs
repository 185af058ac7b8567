//! Deterministic synthetic cohort shared by unit tests.
//!
//! Recurrent cases carry nodal disease, advanced T and stage, and an
//! incomplete response; non-recurrent cases are N0, M0, stage I without
//! adenopathy. The classes are separable on those columns, which keeps the
//! end-to-end assertions exact.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::PatientFeatures;
use crate::ports::LabeledDataset;

const PHYSICAL: &[&str] = &[
    "Normal",
    "Single nodular goiter-left",
    "Single nodular goiter-right",
    "Multinodular goiter",
];

fn pick<'a>(rng: &mut ChaCha8Rng, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or(options[0])
}

/// Patient drawn from the non-recurrent profile.
fn negative(rng: &mut ChaCha8Rng) -> PatientFeatures {
    PatientFeatures {
        age: rng.gen_range(20..=55),
        gender: pick(rng, &["F", "F", "F", "M"]).into(),
        smoking: pick(rng, &["No", "No", "No", "Yes"]).into(),
        hx_smoking: pick(rng, &["No", "No", "No", "No", "Yes"]).into(),
        hx_radiotherapy: pick(rng, &["No", "No", "No", "No", "No", "Yes"]).into(),
        thyroid_function: pick(
            rng,
            &["Euthyroid", "Euthyroid", "Euthyroid", "Euthyroid", "Clinical Hypothyroidism", "Subclinical Hypothyroidism"],
        )
        .into(),
        physical_examination: pick(rng, PHYSICAL).into(),
        adenopathy: "No".into(),
        pathology: pick(rng, &["Papillary", "Papillary", "Micropapillary"]).into(),
        focality: pick(rng, &["Uni-Focal", "Uni-Focal", "Uni-Focal", "Uni-Focal", "Multi-Focal"]).into(),
        risk: pick(rng, &["Low", "Low", "Low", "Low", "Intermediate"]).into(),
        tumour: pick(rng, &["T1a", "T1b", "T2"]).into(),
        nodes: "N0".into(),
        metastasis: "M0".into(),
        stage: "I".into(),
        response: pick(rng, &["Excellent", "Excellent", "Excellent", "Indeterminate"]).into(),
    }
}

/// Patient drawn from the recurrent profile.
fn positive(rng: &mut ChaCha8Rng) -> PatientFeatures {
    PatientFeatures {
        age: rng.gen_range(35..=82),
        gender: pick(rng, &["F", "M"]).into(),
        smoking: pick(rng, &["No", "Yes"]).into(),
        hx_smoking: pick(rng, &["No", "No", "Yes"]).into(),
        hx_radiotherapy: pick(rng, &["No", "No", "No", "Yes"]).into(),
        thyroid_function: pick(rng, &["Euthyroid", "Euthyroid", "Euthyroid", "Clinical Hypothyroidism"]).into(),
        physical_examination: pick(rng, PHYSICAL).into(),
        adenopathy: pick(rng, &["Right", "Left", "Bilateral", "Extensive"]).into(),
        pathology: pick(rng, &["Papillary", "Papillary", "Follicular", "Hurthel cell"]).into(),
        focality: pick(rng, &["Multi-Focal", "Multi-Focal", "Multi-Focal", "Uni-Focal"]).into(),
        risk: pick(rng, &["Intermediate", "High", "High"]).into(),
        tumour: pick(rng, &["T3a", "T3b", "T4a", "T4b"]).into(),
        nodes: pick(rng, &["N1a", "N1b", "N1b"]).into(),
        metastasis: pick(rng, &["M0", "M0", "M0", "M0", "M0", "M0", "M0", "M1", "M1", "M1"]).into(),
        stage: pick(rng, &["II", "IVB"]).into(),
        response: pick(rng, &["Structural Incomplete", "Structural Incomplete", "Biochemical Incomplete"]).into(),
    }
}

/// `n` labelled patients; every third one recurred.
pub(crate) fn cohort(n: usize, seed: u64) -> LabeledDataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut dataset = LabeledDataset::default();
    for i in 0..n {
        let (patient, label) = if i % 3 == 0 {
            (positive(&mut rng), "Yes")
        } else {
            (negative(&mut rng), "No")
        };
        dataset.rows.push(patient.to_row());
        dataset.labels.push(label.to_string());
    }
    dataset
}

/// Young patient with the mildest presentation the cohort contains.
pub(crate) fn low_risk_patient() -> PatientFeatures {
    PatientFeatures {
        age: 30,
        gender: "F".into(),
        smoking: "No".into(),
        hx_smoking: "No".into(),
        hx_radiotherapy: "No".into(),
        thyroid_function: "Euthyroid".into(),
        physical_examination: "Normal".into(),
        adenopathy: "No".into(),
        pathology: "Papillary".into(),
        focality: "Uni-Focal".into(),
        risk: "Low".into(),
        tumour: "T1a".into(),
        nodes: "N0".into(),
        metastasis: "M0".into(),
        stage: "I".into(),
        response: "Excellent".into(),
    }
}

/// Older patient with nodal and distant disease.
pub(crate) fn high_risk_patient() -> PatientFeatures {
    PatientFeatures {
        age: 70,
        gender: "M".into(),
        smoking: "No".into(),
        hx_smoking: "No".into(),
        hx_radiotherapy: "No".into(),
        thyroid_function: "Euthyroid".into(),
        physical_examination: "Multinodular goiter".into(),
        adenopathy: "Bilateral".into(),
        pathology: "Papillary".into(),
        focality: "Multi-Focal".into(),
        risk: "High".into(),
        tumour: "T4b".into(),
        nodes: "N1b".into(),
        metastasis: "M1".into(),
        stage: "IVB".into(),
        response: "Structural Incomplete".into(),
    }
}

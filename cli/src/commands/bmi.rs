use anyhow::{Context, Result};
use serde::Serialize;

use fitsphere_core::models::{BmiClass, Category, HeightUnit, WeightUnit, body_mass_index};

use super::Service;

#[derive(Serialize)]
struct BmiOutput {
    bmi: f64,
    class: BmiClass,
    weight_kg: f64,
    height_m: f64,
}

/// BMI from an explicit weight, or from the most recent weight entry.
pub(crate) fn cmd_bmi(
    svc: &Service,
    weight: Option<f64>,
    weight_unit: &str,
    height: f64,
    height_unit: &str,
    json: bool,
) -> Result<()> {
    let height_unit: HeightUnit = height_unit.parse()?;
    let (weight, weight_unit) = match weight {
        Some(w) => (w, weight_unit.parse::<WeightUnit>()?),
        None => {
            let latest = svc.entries(Category::Weight).last().context(
                "No weight entries. Pass --weight or log one with `fitsphere log weight <kg>`",
            )?;
            (latest.value, WeightUnit::Kg)
        }
    };

    let bmi = body_mass_index(weight, weight_unit, height, height_unit)
        .context("Weight and height must both be greater than 0")?;
    let class = BmiClass::of(bmi);

    if json {
        let out = BmiOutput {
            bmi,
            class,
            weight_kg: weight_unit.to_kg(weight),
            height_m: height_unit.to_meters(height),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("BMI: {bmi:.2} ({class})");
    }
    Ok(())
}

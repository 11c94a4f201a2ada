use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::{Value, json};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (country, typical inflation %, volatility)
const COUNTRIES: &[(&str, f64, f64)] = &[
    ("Argentina", 25.0, 15.0),
    ("Bolivia", 4.0, 2.0),
    ("Brasil", 6.5, 2.5),
    ("Chile", 3.5, 1.5),
    ("Colombia", 5.0, 2.0),
    ("Costa Rica", 5.5, 3.0),
    ("Ecuador", 3.0, 2.5),
    ("El Salvador", 2.5, 1.5),
    ("Guatemala", 5.0, 2.0),
    ("Haití", 12.0, 5.0),
    ("Honduras", 6.0, 2.0),
    ("México", 4.5, 1.5),
    ("Nicaragua", 7.0, 3.0),
    ("Panamá", 2.0, 1.5),
    ("Paraguay", 5.5, 2.5),
    ("Perú", 3.0, 1.5),
    ("República Dominicana", 6.0, 3.0),
    ("Uruguay", 8.0, 2.0),
    ("Venezuela", 60.0, 40.0),
];

/// Key spellings seen in the wild, cycled per row.
const KEY_VARIANTS: &[(&str, &str, &str)] = &[
    ("País", "Año", "Inflación Anual"),
    ("Pais", "Ano", "Inflacion Anual"),
    ("País", "Anio", "Inflación anual"),
];

const FIRST_YEAR: i64 = 2000;
const LAST_YEAR: i64 = 2023;

/// Inflation for one country-year, in percent.
fn sample_inflation(rng: &mut SimpleRng, country: &str, base: f64, vol: f64, year: i64) -> f64 {
    let mut v = rng.gauss(base, vol);
    // Venezuela's hyperinflation years.
    if country == "Venezuela" && (2016..=2020).contains(&year) {
        v = rng.gauss(1500.0, 900.0).abs() + 250.0;
    }
    (v * 10.0).round() / 10.0
}

/// Small figures are stored as fractions, large ones already in percent.
fn stored_value(pct: f64) -> f64 {
    if pct.abs() < 100.0 {
        (pct / 100.0 * 10_000.0).round() / 10_000.0
    } else {
        pct
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut json_rows: Vec<Value> = Vec::new();
    let mut all_country: Vec<String> = Vec::new();
    let mut all_year: Vec<i64> = Vec::new();
    let mut all_value: Vec<f64> = Vec::new();

    let mut row_no = 0usize;
    for &(country, base, vol) in COUNTRIES {
        for year in FIRST_YEAR..=LAST_YEAR {
            // Leave a few holes so aligned series have gaps.
            if rng.next_f64() < 0.04 {
                continue;
            }
            let pct = sample_inflation(&mut rng, country, base, vol, year);
            let value = stored_value(pct);

            let (k_country, k_year, k_value) = KEY_VARIANTS[row_no % KEY_VARIANTS.len()];
            // Untidy whitespace on some names; the normalizer collapses it.
            let name = if row_no % 11 == 0 {
                format!("  {}  ", country.replace(' ', "   "))
            } else {
                country.to_string()
            };
            json_rows.push(json!({ k_country: name, k_year: year, k_value: value }));

            all_country.push(country.to_string());
            all_year.push(year);
            all_value.push(value);
            row_no += 1;
        }
    }

    // Rows the normalizer must drop.
    json_rows.push(json!({ "País": "", "Año": 2020, "Inflación Anual": 0.05 }));
    json_rows.push(json!({ "País": "Chile", "Año": "abc", "Inflación Anual": 0.05 }));
    json_rows.push(json!({ "País": "Perú", "Año": 2021, "Inflación Anual": null }));

    let json_path = "inflation_data.json";
    let text = serde_json::to_string_pretty(&json_rows).context("serializing JSON")?;
    std::fs::write(json_path, text).with_context(|| format!("writing {json_path}"))?;

    // Parquet copy with canonical column names
    let schema = Arc::new(Schema::new(vec![
        Field::new("País", DataType::Utf8, false),
        Field::new("Año", DataType::Int64, false),
        Field::new("Inflación Anual", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                all_country.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(all_year)),
            Arc::new(Float64Array::from(all_value)),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "inflation_data.parquet";
    let file = std::fs::File::create(parquet_path)
        .with_context(|| format!("creating {parquet_path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {row_no} records for {} countries to {json_path} and {parquet_path}",
        COUNTRIES.len()
    );
    Ok(())
}

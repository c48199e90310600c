use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One generated record.
#[derive(Clone)]
struct Row {
    id: i64,
    age: Option<i64>,
    income: f64,
    spend: Option<f64>,
    city: String,
    member: bool,
}

fn generate_rows(n: usize, rng: &mut SimpleRng) -> Vec<Row> {
    let cities = ["Lyon", "Oslo", "Rome", "Porto", "Ghent"];

    let mut rows: Vec<Row> = (0..n)
        .map(|i| {
            let age = rng.gauss(41.0, 12.0).round().clamp(18.0, 90.0) as i64;
            let income = rng.gauss(52_000.0, 9_000.0).max(8_000.0);
            let spend = income * 0.18 + rng.gauss(0.0, 900.0);
            Row {
                id: i as i64 + 1,
                // ~8% missing ages, ~5% missing spend
                age: (!rng.chance(0.08)).then_some(age),
                income: (income * 100.0).round() / 100.0,
                spend: (!rng.chance(0.05)).then_some((spend * 100.0).round() / 100.0),
                city: rng.pick(&cities).to_string(),
                member: rng.chance(0.35),
            }
        })
        .collect();

    // A few extreme incomes for the z-score pass.
    for row in rows.iter_mut().step_by(n / 3 + 1).take(3) {
        row.income = 250_000.0;
    }

    // One exact duplicate row.
    if let Some(first) = rows.first().cloned() {
        rows.push(first);
    }
    rows
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["id", "age", "income", "spend", "city", "member"])?;
    for r in rows {
        writer.write_record([
            r.id.to_string(),
            r.age.map(|a| a.to_string()).unwrap_or_default(),
            format!("{:.2}", r.income),
            r.spend.map(|s| format!("{s:.2}")).unwrap_or_default(),
            r.city.clone(),
            if r.member { "True" } else { "False" }.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("age", DataType::Int64, true),
        Field::new("income", DataType::Float64, false),
        Field::new("spend", DataType::Float64, true),
        Field::new("city", DataType::Utf8, false),
        Field::new("member", DataType::Boolean, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(rows.iter().map(|r| r.id).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.age).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.income).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.spend).collect::<Vec<_>>())),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.city.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(BooleanArray::from(rows.iter().map(|r| r.member).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(300, &mut rng);

    write_csv(&rows, "sample_data.csv")?;
    write_parquet(&rows, "sample_data.parquet")?;

    println!(
        "Wrote {} rows to sample_data.csv and sample_data.parquet",
        rows.len()
    );
    Ok(())
}

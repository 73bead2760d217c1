//! Writes a synthetic import/export table shaped like the ANP open-data file.
//!
//! ```text
//! generate_sample [path] [rows]
//! ```
//!
//! The output is `;`-separated with comma decimals, and contains a few
//! duplicates, blank cells and zero volumes so every cleaning step has work.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal};

const PRODUCTS: &[(&str, f64)] = &[
    // (name, log-mean of the monthly volume)
    ("GASOLINA A", 11.5),
    ("ÓLEO DIESEL", 13.0),
    ("GLP", 12.0),
    ("QUEROSENE DE AVIAÇÃO", 11.0),
    ("ÓLEO COMBUSTÍVEL", 12.5),
    ("NAFTA", 12.2),
];

const OPERATIONS: &[&str] = &["IMPORTAÇÃO", "EXPORTAÇÃO"];

/// Price per unit of volume, used to derive expenditure / revenue.
const UNIT_PRICE: f64 = 2.8;

#[derive(Clone)]
struct Row {
    year: u32,
    month: u32,
    product: &'static str,
    operation: &'static str,
    volume: String,
    expenditure: String,
}

impl Row {
    fn fields(&self) -> [String; 6] {
        [
            self.year.to_string(),
            self.month.to_string(),
            self.product.to_string(),
            self.operation.to_string(),
            self.volume.clone(),
            self.expenditure.clone(),
        ]
    }
}

/// `1234.5` → `"1234,5"`.
fn comma_decimal(v: f64) -> String {
    format!("{v:.3}").replace('.', ",")
}

fn generate(rows: usize, rng: &mut StdRng) -> Result<Vec<Row>> {
    let mut out = Vec::with_capacity(rows);
    for i in 0..rows {
        let &(product, log_mean) = PRODUCTS.choose(rng).context("no products")?;
        let operation = *OPERATIONS.choose(rng).context("no operations")?;
        let volume = LogNormal::new(log_mean, 1.1)
            .context("volume distribution")?
            .sample(rng);
        let price = UNIT_PRICE * rng.gen_range(0.7..1.3);

        let mut row = Row {
            year: 2000 + (i % 25) as u32,
            month: 1 + (i % 12) as u32,
            product,
            operation,
            volume: comma_decimal(volume),
            expenditure: format!("{:.0}", volume * price),
        };

        // Sprinkle the defects the cleaning pipeline removes.
        match rng.gen_range(0..100) {
            0..=1 => row.volume = "0".into(),
            2 => row.expenditure.clear(),
            3 => row.operation = "",
            _ => {}
        }
        out.push(row);
    }

    // ~1% exact duplicates.
    let duplicates: Vec<usize> = (0..rows / 100).map(|_| rng.gen_range(0..rows)).collect();
    for i in duplicates {
        out.push(out[i].clone());
    }
    Ok(out)
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = PathBuf::from(args.next().unwrap_or_else(|| "importacoes-exportacoes.csv".into()));
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid row count '{n}'"))?,
        None => 5_000,
    };

    let mut rng = StdRng::seed_from_u64(42);
    let data = generate(rows, &mut rng)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "ANO",
        "MÊS",
        "PRODUTO",
        "OPERAÇÃO COMERCIAL",
        "IMPORTADO / EXPORTADO",
        "DISPÊNDIO / RECEITA",
    ])?;
    for row in &data {
        writer.write_record(row.fields())?;
    }
    writer.flush()?;

    log::info!("Wrote {} rows to {}", data.len(), path.display());
    println!("Wrote {} rows to {}", data.len(), path.display());
    Ok(())
}

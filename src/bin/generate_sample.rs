use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Write a deterministic sample `dataf.xlsx` so the dashboard runs out of
/// the box. A few cells are deliberately left empty to exercise the
/// loader's zero-fill.
fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let formats = ["Papier", "Numérique", "Hybride", "Données"];
    let categories = ["Personnel", "Fonctionnement", "Investissement", "Intervention"];
    let programmes = ["P105", "P151", "P185", "P209"];

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let headers = ["Année", "format_pdt", "Cat. LOLF", "ETP", "Programme"];
    for (col, name) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *name)
            .context("writing header row")?;
    }

    let mut n_rows = 0u32;
    let mut n_blanks = 0u32;

    for year in 2015..=2024 {
        // 18-24 records per year
        let per_year = 18 + (rng.next_u64() % 7) as u32;
        for _ in 0..per_year {
            let row = n_rows + 1;

            worksheet.write_number(row, 0, year as f64)?;

            // ~5% of format cells left empty → integer zero after loading
            if rng.next_f64() < 0.05 {
                n_blanks += 1;
            } else {
                worksheet.write_string(row, 1, *rng.pick(&formats))?;
            }

            worksheet.write_string(row, 2, *rng.pick(&categories))?;

            // ~5% of ETP cells left empty as well
            if rng.next_f64() < 0.05 {
                n_blanks += 1;
            } else {
                let etp = rng.gauss(12.0, 4.0).max(0.25);
                worksheet.write_number(row, 3, (etp * 100.0).round() / 100.0)?;
            }

            worksheet.write_string(row, 4, *rng.pick(&programmes))?;

            n_rows += 1;
        }
    }

    let output_path = "dataf.xlsx";
    workbook.save(output_path).context("saving workbook")?;

    println!("Wrote {n_rows} rows ({n_blanks} blank cells) to {output_path}");
    Ok(())
}

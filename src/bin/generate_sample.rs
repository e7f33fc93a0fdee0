use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        let i = (self.next_u64() % items.len() as u64) as usize;
        items.get(i).copied().unwrap_or_default()
    }
}

/// Writes a herd of weighings to CSV, mixing date styles and header casing
/// the way hand-kept farm sheets do.
fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_weighings.csv".to_string());

    let mut rng = SimpleRng::new(42);

    let pastures = ["Pasto 1", "Pasto 2", "Reserva", "Piquete Norte"];
    let sexes = ["M", "F", "m", "f"];
    let start = NaiveDate::from_ymd_opt(2024, 1, 8).context("invalid start date")?;

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record([" Animal", "Data", "Peso", "Local", "Sx", "Meses"])?;

    let n_animals = 60;
    let mut rows = 0usize;
    for n in 1..=n_animals {
        let animal = format!("BR-{n:04}");
        let pasture = rng.pick(&pastures);
        let sex = rng.pick(&sexes);
        let age = 3 + (rng.next_u64() % 30);
        let daily_gain = rng.gauss(0.75, 0.2);
        let mut weight = rng.gauss(140.0 + age as f64 * 9.0, 15.0);

        // Some animals only ever get one weighing.
        let weighings = if n % 17 == 0 { 1 } else { 3 + (rng.next_u64() % 4) };
        let mut day = 0u64;
        for w in 0..weighings {
            let date = start
                .checked_add_days(Days::new(day))
                .context("date overflow")?;
            let date_text = match w % 3 {
                0 => date.format("%d/%m/%Y").to_string(),
                1 => date.format("%Y-%m-%d").to_string(),
                _ => (date - NaiveDate::from_ymd_opt(1899, 12, 30).context("epoch")?)
                    .num_days()
                    .to_string(),
            };
            let weight_text = format!("{weight:.1}");
            let age_text = age.to_string();
            writer.write_record([
                animal.as_str(),
                date_text.as_str(),
                weight_text.as_str(),
                pasture,
                sex,
                age_text.as_str(),
            ])?;
            rows += 1;

            let interval = 21 + rng.next_u64() % 20;
            day += interval;
            weight += rng.gauss(daily_gain, 0.1) * interval as f64;
        }
    }
    writer.flush()?;

    println!("Wrote {rows} weighings for {n_animals} animals to {output_path}");
    Ok(())
}

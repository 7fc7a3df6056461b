use std::path::PathBuf;

/// Regions written to the sample files: (province, country, lat, long, peak size).
const REGIONS: &[(&str, &str, f64, f64, f64)] = &[
    ("", "US", 40.0, -100.0, 2_500_000.0),
    ("", "Italy", 41.87194, 12.56738, 240_000.0),
    ("", "Germany", 51.165691, 10.451526, 200_000.0),
    ("Hubei", "China", 30.9756, 112.2707, 68_000.0),
    ("Ontario", "Canada", 51.2538, -85.3232, 38_000.0),
    ("", "Brazil", -14.235, -51.9253, 1_500_000.0),
    ("", "India", 20.593684, 78.96288, 900_000.0),
    ("", "South Africa", -30.5595, 22.9375, 300_000.0),
    ("New South Wales", "Australia", -33.8688, 151.2093, 4_000.0),
    ("", "Peru", -9.19, -75.0152, 330_000.0),
];

const DAYS: usize = 180;

/// Randomised shape of one region's outbreak.
struct Outbreak {
    midpoint: f64,
    steepness: f64,
    /// Share of confirmed cases that end up recovered.
    recovered: f64,
    /// Share of confirmed cases that end up dead.
    dead: f64,
}

/// Logistic curve: cumulative cases on `day` for an outbreak peaking at `midpoint`.
fn logistic(day: f64, size: f64, midpoint: f64, steepness: f64) -> f64 {
    size / (1.0 + (-(day - midpoint) * steepness).exp())
}

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

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// CSSE-style `m/d/yy` headers starting on 1/22/20.
fn date_headers(days: usize) -> Vec<String> {
    const MONTH_LENGTHS_2020: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let (mut month, mut day) = (1usize, 22u32);
    let mut out = Vec::with_capacity(days);
    for _ in 0..days {
        out.push(format!("{month}/{day}/20"));
        day += 1;
        if day > MONTH_LENGTHS_2020[month - 1] {
            day = 1;
            month += 1;
        }
    }
    out
}

fn main() {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");

    let mut rng = SimpleRng::new(42);
    let dates = date_headers(DAYS);

    let outbreaks: Vec<Outbreak> = REGIONS
        .iter()
        .map(|_| Outbreak {
            midpoint: rng.range(40.0, 120.0),
            steepness: rng.range(0.05, 0.15),
            recovered: rng.range(0.3, 0.8),
            dead: rng.range(0.005, 0.12),
        })
        .collect();

    // Recoveries and deaths trail confirmed cases by two weeks.
    let files: [(&str, fn(&Outbreak) -> f64, f64); 3] = [
        ("time_series_covid19_confirmed_global.csv", |_| 1.0, 0.0),
        ("time_series_covid19_recovered_global.csv", |o| o.recovered, 14.0),
        ("time_series_covid19_deaths_global.csv", |o| o.dead, 14.0),
    ];

    for (file_name, fraction_of, lag) in files {
        let path = out_dir.join(file_name);
        let mut writer = csv::Writer::from_path(&path).expect("Failed to create output file");

        let mut header = vec![
            "Province/State".to_string(),
            "Country/Region".to_string(),
            "Lat".to_string(),
            "Long".to_string(),
        ];
        header.extend(dates.iter().cloned());
        writer.write_record(&header).expect("Failed to write header");

        for ((province, country, lat, long, size), outbreak) in REGIONS.iter().zip(&outbreaks) {
            let fraction = fraction_of(outbreak);
            let mut record = vec![
                province.to_string(),
                country.to_string(),
                lat.to_string(),
                long.to_string(),
            ];
            record.extend((0..DAYS).map(|d| {
                let v = logistic(d as f64 - lag, *size, outbreak.midpoint, outbreak.steepness)
                    * fraction;
                format!("{:.0}", v.floor())
            }));
            writer.write_record(&record).expect("Failed to write row");
        }
        writer.flush().expect("Failed to flush output file");
        println!("Wrote {} regions × {DAYS} days to {}", REGIONS.len(), path.display());
    }
}

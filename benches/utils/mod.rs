use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub const ANGLES: [u32; 4] = [0, 90, 180, 270];

// Dataset
//------------------------------------------------------------------------------

/// Image with the payload it is expected to decode to, read from a sibling `.txt` file.
pub struct Sample {
    pub path: PathBuf,
    pub folder: String,
    pub expected: Vec<String>,
}

pub fn collect_samples(dataset_dir: &Path) -> Vec<Sample> {
    WalkDir::new(dataset_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let ext = e.path().extension().and_then(|e| e.to_str());
            matches!(ext, Some("png" | "jpg" | "jpeg" | "bmp"))
        })
        .filter_map(|e| {
            let path = e.into_path();
            let folder = path.parent()?.file_name()?.to_str()?.to_string();
            let expected = std::fs::read_to_string(path.with_extension("txt")).ok()?;
            let expected = expected.lines().map(String::from).collect();
            Some(Sample { path, folder, expected })
        })
        .collect()
}

// Tally
//------------------------------------------------------------------------------

/// Hits per angle and decode times in microseconds for one folder and reader setup.
#[derive(Default)]
pub struct Tally {
    pub hits: [u32; ANGLES.len()],
    pub runtimes: Vec<u128>,
}

impl Tally {
    pub fn record(&mut self, angle_idx: usize, micros: u128) {
        self.hits[angle_idx] += 1;
        self.runtimes.push(micros);
    }

    pub fn merge(&mut self, other: Tally) {
        self.hits.iter_mut().zip(other.hits).for_each(|(a, b)| *a += b);
        self.runtimes.extend(other.runtimes);
    }

    pub fn total(&self) -> u32 {
        self.hits.iter().sum()
    }

    pub fn median(&mut self) -> u128 {
        if self.runtimes.is_empty() {
            return 0;
        }
        self.runtimes.sort_unstable();
        let mid = self.runtimes.len() / 2;
        if self.runtimes.len() % 2 == 1 {
            self.runtimes[mid]
        } else {
            (self.runtimes[mid - 1] + self.runtimes[mid]) / 2
        }
    }

    pub fn average(&self) -> u128 {
        match self.runtimes.len() {
            0 => 0,
            n => self.runtimes.iter().sum::<u128>() / n as u128,
        }
    }
}

// Report
//------------------------------------------------------------------------------

/// One row per `(folder, setup)` key, hits per angle followed by totals and timings.
pub fn print_report(tallies: &mut BTreeMap<(String, &str), Tally>, samples: usize) {
    let cell_w = 14;
    let head = ["folder", "setup", "0", "90", "180", "270", "total", "median_us", "avg_us"];
    let divider = "-".repeat(head.len() * (cell_w + 2) + 1);

    println!("\nImages: {samples}");
    println!("{divider}");
    let header = head.iter().map(|c| format!("{c:<cell_w$}")).collect::<Vec<_>>();
    println!("| {} |", header.join("| "));
    println!("{divider}");

    for ((folder, setup), tally) in tallies.iter_mut() {
        let mut cells = vec![folder.clone(), setup.to_string()];
        cells.extend(tally.hits.iter().map(u32::to_string));
        cells.push(tally.total().to_string());
        cells.push(tally.median().to_string());
        cells.push(tally.average().to_string());
        let cells = cells.iter().map(|c| format!("{c:<cell_w$}")).collect::<Vec<_>>();
        println!("| {} |", cells.join("| "));
    }

    println!("{divider}");
}

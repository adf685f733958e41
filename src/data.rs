use csv::ReaderBuilder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::GenerateConfig;
use crate::error::DataError;
use crate::types::{Method, SampleRecord};

const COLUMNS: [&str; 5] = ["cell", "latitude", "longitude", "n_seagrass_plants", "method"];

/// Load survey records from a tab-separated file with a header row naming
/// the five columns. Records come back in file order; a malformed row is an
/// error, never silently skipped.
pub fn load_records(path: &Path) -> Result<Vec<SampleRecord>, DataError> {
    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new().delimiter(b'\t').from_reader(file);

    let headers = rdr.headers()?.clone();
    let mut indices = [0usize; 5];
    for (slot, column) in indices.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DataError::MissingColumn { column: column.to_string() })?;
    }
    let [cell_idx, lat_idx, lon_idx, plants_idx, method_idx] = indices;

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let field = |idx: usize, column: &str| {
            record.get(idx).ok_or_else(|| DataError::MalformedRecord {
                line,
                reason: format!("missing '{column}' field"),
            })
        };

        let cell: u32 = parse_field(field(cell_idx, "cell")?, line, "cell")?;
        let latitude: f64 = parse_field(field(lat_idx, "latitude")?, line, "latitude")?;
        let longitude: f64 = parse_field(field(lon_idx, "longitude")?, line, "longitude")?;
        let n_plants: u32 =
            parse_field(field(plants_idx, "n_seagrass_plants")?, line, "n_seagrass_plants")?;

        let raw_method = field(method_idx, "method")?;
        let method = Method::parse(raw_method).ok_or_else(|| DataError::MalformedRecord {
            line,
            reason: format!("unknown method '{raw_method}'"),
        })?;

        records.push(SampleRecord { cell, latitude, longitude, n_plants, method });
    }

    Ok(records)
}

fn parse_field<T: std::str::FromStr>(raw: &str, line: u64, column: &str) -> Result<T, DataError> {
    raw.trim().parse().map_err(|_| DataError::MalformedRecord {
        line,
        reason: format!("cannot parse '{raw}' as {column}"),
    })
}

/// Write a random example survey file: uniform coordinates inside the
/// configured bounding box, 0-100 plants per plot, and the four methods
/// assigned in equal blocks by row order. A seed makes the output
/// reproducible.
pub fn generate_random_data(config: &GenerateConfig, path: &Path) -> Result<(), DataError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    writeln!(out, "cell\tlatitude\tlongitude\tn_seagrass_plants\tmethod")?;

    let quarter = (config.num_rows.max(1) + 3) / 4;
    for i in 0..config.num_rows {
        let cell = i + 1;
        let n_plants: u32 = rng.gen_range(0..=100);
        let lat = config.min_lat + rng.gen::<f64>() * (config.max_lat - config.min_lat);
        let lon = config.min_lon + rng.gen::<f64>() * (config.max_lon - config.min_lon);
        let method = Method::ALL[(i / quarter).min(3) as usize];

        writeln!(out, "{cell}\t{lat:.6}\t{lon:.6}\t{n_plants}\t{}", method.label())?;
    }
    out.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_records_in_file_order() {
        let file = write_temp(
            "cell\tlatitude\tlongitude\tn_seagrass_plants\tmethod\n\
             1\t51.450100\t4.190100\t42\t2\n\
             5\t51.446000\t4.183000\t0\t4\n",
        );
        let records = load_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cell, 1);
        assert_eq!(records[0].n_plants, 42);
        assert_eq!(records[0].method, Method::Two);
        assert_eq!(records[1].cell, 5);
        assert_eq!(records[1].method, Method::Four);
    }

    #[test]
    fn malformed_row_reports_its_line() {
        let file = write_temp(
            "cell\tlatitude\tlongitude\tn_seagrass_plants\tmethod\n\
             1\t51.450100\t4.190100\t42\t2\n\
             2\tnot-a-number\t4.190100\t10\t1\n",
        );
        let err = load_records(file.path()).unwrap_err();
        match err {
            DataError::MalformedRecord { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_method_is_rejected() {
        let file = write_temp(
            "cell\tlatitude\tlongitude\tn_seagrass_plants\tmethod\n\
             1\t51.450100\t4.190100\t42\t9\n",
        );
        assert!(matches!(
            load_records(file.path()),
            Err(DataError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn missing_column_is_reported() {
        let file = write_temp("cell\tlatitude\tlongitude\tmethod\n");
        assert!(matches!(
            load_records(file.path()),
            Err(DataError::MissingColumn { .. })
        ));
    }

    #[test]
    fn generated_data_round_trips_through_the_loader() {
        let config = GenerateConfig {
            min_lat: 51.4459,
            max_lat: 51.4521,
            min_lon: 4.1828,
            max_lon: 4.2032,
            num_rows: 100,
            seed: Some(100),
        };
        let file = NamedTempFile::new().unwrap();
        generate_random_data(&config, file.path()).unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 100);

        // Ids are 1-based and sequential, methods come in four blocks of 25.
        assert_eq!(records[0].cell, 1);
        assert_eq!(records[99].cell, 100);
        assert_eq!(records[0].method, Method::One);
        assert_eq!(records[25].method, Method::Two);
        assert_eq!(records[50].method, Method::Three);
        assert_eq!(records[75].method, Method::Four);

        for record in &records {
            assert!((51.4459..=51.4521).contains(&record.latitude));
            assert!((4.1828..=4.2032).contains(&record.longitude));
            assert!(record.n_plants <= 100);
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let config = GenerateConfig {
            min_lat: 51.0,
            max_lat: 52.0,
            min_lon: 4.0,
            max_lon: 5.0,
            num_rows: 10,
            seed: Some(7),
        };
        let first = NamedTempFile::new().unwrap();
        let second = NamedTempFile::new().unwrap();
        generate_random_data(&config, first.path()).unwrap();
        generate_random_data(&config, second.path()).unwrap();

        let a = std::fs::read_to_string(first.path()).unwrap();
        let b = std::fs::read_to_string(second.path()).unwrap();
        assert_eq!(a, b);
    }
}

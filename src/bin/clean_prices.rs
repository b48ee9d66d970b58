use std::env;
use std::path::Path;

use log::warn;
use maverick::clean;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let path = Path::new(&args[1]);

    let report = clean::clean_file(path).unwrap();
    for (company, round) in &report.missing {
        warn!("missing {company} round {round}");
    }

    println!(
        "cleaned {}: {} rows in, {} rows out, {} missing combinations",
        path.display(),
        report.rows_in,
        report.rows_out,
        report.missing.len()
    );
}

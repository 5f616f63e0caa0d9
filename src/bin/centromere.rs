use std::env;
use std::io;
use std::process;

use centromere_rs::analytics::CountsConfig;
use centromere_rs::window_reader::validate_window_params;
use centromere_rs::window_reports;

fn usage() {
    eprintln!("Usage: centromere <file name> <window size> <overlap> [DAWG] [LEFT] [<min depth>-<max depth>] [<interval size>]");
    eprintln!();
    eprintln!(" <window size> range 10 to 100000000, and greater than the overlap");
    eprintln!(" <overlap> range 0 to 1000000");
    eprintln!(" [<interval size>] breaks the depth range into chunks");
    eprintln!(" [DAWG] removes nodes that have suffix links to nodes with the same leaf counts");
    eprintln!(" [LEFT] removes nodes that are not left diverse");
    eprintln!();
    eprintln!("Breaks a file into overlapping windows and prints one line per window:");
    eprintln!(" the source line number, line offset and sequence offset of the window");
    eprintln!(" start, then node and substring count pairs for the window's suffix tree.");
}

fn parse_number(arg: &str, name: &str) -> u64 {
    match arg.parse() {
        Ok(value) => value,
        Err(_) => {
            eprintln!("invalid {name} '{arg}'");
            usage();
            process::exit(1);
        }
    }
}

fn extract_range(args: &[String]) -> Option<(u64, u64)> {
    for arg in args {
        if let Some((min, max)) = arg.split_once('-') {
            match (min.parse(), max.parse()) {
                (Ok(min), Ok(max)) => return Some((min, max)),
                _ => {
                    eprintln!("invalid depth range '{arg}'");
                    usage();
                    process::exit(1);
                }
            }
        }
    }
    None
}

fn extract_interval(args: &[String]) -> Option<u64> {
    args.iter()
        .find_map(|arg| arg.parse::<u64>().ok())
        .filter(|&value| value > 0)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        usage();
        process::exit(1);
    }
    let file_name = &args[1];
    let window_size = parse_number(&args[2], "window size");
    let overlap = parse_number(&args[3], "overlap");
    let trailing = &args[4..];

    let config = CountsConfig {
        generate_dawg: trailing.iter().any(|arg| arg == "DAWG"),
        detect_left_diverse: trailing.iter().any(|arg| arg == "LEFT"),
        depth_range: extract_range(trailing),
        interval_size: extract_interval(trailing),
    };

    // Out-of-range or contradictory parameters get the usage text, the
    // way malformed arguments do.
    if let Err(err) = validate_window_params(window_size, overlap).and_then(|_| config.validate())
    {
        eprintln!("{err}");
        usage();
        process::exit(1);
    }

    let mut stdout = io::stdout().lock();
    match window_reports(file_name, window_size, overlap, &config, &mut stdout) {
        Ok(windows) => log::info!("reported {windows} windows from '{file_name}'"),
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

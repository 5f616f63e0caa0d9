use std::env;
use std::io;
use std::process;

use indicatif::{ProgressBar, ProgressStyle};

use centromere_rs::segment_compare;

fn usage() {
    eprintln!("Usage: chrcompare <file1> <start offset> <reference length> <file2> <segment size> <window size>");
    eprintln!();
    eprintln!(" Reads <reference length> bytes from <file1> starting at <start offset>,");
    eprintln!(" then scans all of <file2>: in each <segment size> section every");
    eprintln!(" <window size> string is looked up in the reference in both");
    eprintln!(" orientations, and the matches are bucketed by reference position.");
    eprintln!();
    eprintln!(" Outputs one comma delimited line per section: <section>,<forward>,");
    eprintln!(" <backward>, then the forward buckets, then the backward buckets.");
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

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 7 {
        usage();
        process::exit(1);
    }
    let reference_path = &args[1];
    let start_offset = parse_number(&args[2], "start offset");
    let reference_len = parse_number(&args[3], "reference length");
    let scan_path = &args[4];
    let segment_size = parse_number(&args[5], "segment size");
    let window_size = parse_number(&args[6], "window size");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ])
            .template("{spinner:.green} {msg}")
            .expect("Invalid spinner template"),
    );
    spinner.set_message(format!("Comparing '{scan_path}' against '{reference_path}'..."));

    let mut stdout = io::stdout().lock();
    match segment_compare(
        reference_path,
        start_offset,
        reference_len,
        scan_path,
        segment_size,
        window_size,
        &mut stdout,
    ) {
        Ok(sections) => {
            spinner.finish_with_message(format!("Scanned {sections} section(s)."));
        }
        Err(err) => {
            spinner.finish_and_clear();
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

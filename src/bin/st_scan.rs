use std::env;
use std::process;

use centromere_rs::scan_summary;

fn usage() {
    eprintln!("Usage: st-scan <suffix tree file name> <file to scan> <scan size>");
    eprintln!();
    eprintln!(" <scan size> is a fixed window size to check against the suffix tree");
    eprintln!();
    eprintln!(" Prints one comma delimited line: <suffix tree file>,<scanned file>,");
    eprintln!(" <forward matches>,<backward matches>,<windows found>,<windows not found>");
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        usage();
        process::exit(1);
    }
    let index_path = &args[1];
    let scan_path = &args[2];
    let window_size = match args[3].parse() {
        Ok(value) => value,
        Err(_) => {
            eprintln!("invalid scan size '{}'", args[3]);
            usage();
            process::exit(1);
        }
    };

    match scan_summary(index_path, scan_path, window_size) {
        Ok(summary) => println!("{}", summary.to_line()),
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

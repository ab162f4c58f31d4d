use bookmark_cli::{logging, run_cli, set_version, take_config_flag, FilesystemBookmarkBackend};
use bookmark_core::config::load_config;

fn main() {
    set_version(env!("CARGO_PKG_VERSION"));
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let config_path = match take_config_flag(&mut args) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    let (config, _source) = match load_config(config_path.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    logging::init(&config.logging.level);

    let out = run_cli(&args, &FilesystemBookmarkBackend::new(config));
    if !out.stdout.is_empty() {
        print!("{}", out.stdout);
    }
    if !out.stderr.is_empty() {
        eprint!("{}", out.stderr);
    }
    std::process::exit(out.exit_code);
}

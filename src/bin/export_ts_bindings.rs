use section_tracker::config::load_config;
use section_tracker::logging::{init_tracing, set_log_level};
use std::path::Path;

fn main() {
    let reload_handle = init_tracing();
    let config = load_config(Path::new("conf/tracker.toml"));
    set_log_level(reload_handle, config.log_level);

    let out_dir = Path::new("web/src/generated");
    if let Err(err) = section_tracker::bindings::export_ts_bindings(out_dir) {
        eprintln!("failed to export TS bindings: {err:#}");
        std::process::exit(1);
    }
    println!("exported TS bindings to {}", out_dir.display());
}

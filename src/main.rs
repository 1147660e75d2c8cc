// src/main.rs

use holdon::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = match cli::parse() {
        Ok(args) => args,
        Err(exit) => {
            let _ = exit.print();
            std::process::exit(exit.code);
        }
    };

    let job_log = if args.detached { args.log.as_deref() } else { None };
    if let Err(err) = logging::init_logging(args.log_level, job_log) {
        eprintln!("holdon: {err}");
    }

    let code = match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("holdon: {err}");
            err.exit_code()
        }
    };
    std::process::exit(code);
}

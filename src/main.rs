use std::env;
use std::process::ExitCode;

use rdwm::display::{XConn, XlibConn};
use rdwm::error::WmError;
use rdwm::manager::Wm;
use rdwm::{event, VERSION};

fn usage() -> String {
    format!("usage: rdwm [-v]")
}

fn run() -> Result<(), WmError> {
    let args: Vec<String> = env::args().collect();
    if args.len() > 1 {
        if args[1] == "-v" {
            println!("rdwm-{}", VERSION);
            std::process::exit(0);
        }
        return Err(WmError::Usage(usage()));
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("starting rdwm {}", VERSION);

    let conn = XlibConn::open()?;
    conn.become_wm()?;

    let mut wm = Wm::new(Box::new(conn));

    log::debug!("scanning for pre-existing clients");
    wm.scan();

    event::run(&mut wm);

    log::info!("rdwm shutting down");
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(WmError::Usage(msg)) => {
            eprintln!("{}", msg);
            ExitCode::from(2)
        }
        Err(e) => {
            log::error!("fatal: {}", e);
            eprintln!("rdwm: {}", e);
            ExitCode::FAILURE
        }
    }
}

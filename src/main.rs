use anyhow::{Context, Result};
use clap::{crate_version, Arg, ArgAction, Command};
use env_logger::Builder;
use laserprop::basis::{read_basis, Basis};
use laserprop::io::{write_header, write_preparation, write_result, Configuration};
use laserprop::run_simulation;
use log::{info, LevelFilter};
use std::io::Write;
use std::path::Path;

fn log_level(verbose: i8) -> LevelFilter {
    match verbose {
        v if v >= 2 => LevelFilter::Trace,
        1 => LevelFilter::Debug,
        0 => LevelFilter::Info,
        _ => LevelFilter::Warn,
    }
}

fn main() -> Result<()> {
    let matches = Command::new("laserprop")
        .version(crate_version!())
        .about("Crank-Nicolson propagation of a single electron in a laser field, GTOPW basis")
        .arg(
            Arg::new("basis")
                .help("file with the $BASIS block of the GTOPW basis set")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("prep")
                .long("prep")
                .help("only write the XGTOPW input deck <job_name>.inp")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config: Configuration = Configuration::new().context("unable to load the configuration")?;

    Builder::new()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .filter(None, log_level(config.verbose))
        .init();

    write_header();

    let basis_file: &String = matches
        .get_one::<String>("basis")
        .context("no basis file was given")?;
    let basis: Basis = read_basis(Path::new(basis_file))?;

    if *matches.get_one::<bool>("prep").unwrap_or(&false) {
        write_preparation(Path::new("."), &config, &basis).context("unable to write the XGTOPW input")?;
        return Ok(());
    }

    let n_functions: usize = basis.functions_number(config.representation);
    info!("{: <25} {}", "basis set:", basis_file);
    info!("{: <25} {}", "representation:", config.representation);
    info!("{: <25} {}", "atoms:", basis.atoms.len());
    if let Some(shell) = basis.max_shell() {
        info!("{: <25} {}", "highest shell:", shell.label());
    }
    info!("{: <25} {}", "basis functions:", n_functions);

    let result = run_simulation(&config, n_functions)?;
    info!("{: <25} {}", "reduced basis size:", result.reduced_dim);

    if config.output.write {
        let path = config.result_file();
        write_result(&path, &config, &result.samples)
            .with_context(|| format!("unable to write the results to {}", path.display()))?;
    }
    Ok(())
}

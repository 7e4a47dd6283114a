extern crate clap;
use clap::*;

mod cmd_ancar;

fn main() -> anyhow::Result<()> {
    let app = Command::new("ancar")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`ancar` - Ancestral adjacencies and contiguous ancestral regions")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true)
                .help("Verbosity, -v for progress, -vv for details"),
        )
        .subcommand(cmd_ancar::infer::make_subcommand())
        .subcommand(cmd_ancar::assemble::make_subcommand())
        .after_help(
            r###"Subcommands:

* infer    - Posterior probabilities of ancestral adjacencies
* assemble - Greedy assembly of scored adjacencies into APCFs

A typical run:
    ancar infer hg19 0.5 tree.txt genomes.txt -o adjacencies.prob
    ancar assemble 0.0 adjacencies.prob -o ancestor.apcf -j ancestor.joins

"###,
        );

    let matches = app.get_matches();
    if let Some((_, sub_matches)) = matches.subcommand() {
        init_logger(sub_matches.get_count("verbose"));
    }

    match matches.subcommand() {
        Some(("infer", sub_matches)) => cmd_ancar::infer::execute(sub_matches),
        Some(("assemble", sub_matches)) => cmd_ancar::assemble::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}

fn init_logger(verbose: u8) {
    env_logger::Builder::new()
        .filter_level(match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp(None)
        .init();
}

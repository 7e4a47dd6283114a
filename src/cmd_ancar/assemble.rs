use ancar::libs::apcf::{read_scores, write_apcf, write_joins, Assembler};
use clap::*;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("assemble")
        .about("Assembles scored adjacencies into ancestral contiguous fragments")
        .after_help(
            r###"
Greedily chains scored adjacencies into APCFs.

Adjacencies are taken in decreasing score, ties in the order of
(block, orientation, block, orientation). One is skipped when an end of its
blocks is already taken, or when it would close a chain into a cycle.
Chains meeting at a block are merged.

Input:
* <min-weight> Adjacencies scoring below this are ignored
* <scores>     `id1 id2 score` lines, signed block ids, 0 for a chromosome
               end. The output of `ancar infer` can be used directly.

Output:
* APCF file (--outfile):
  >ANCESTOR<TAB>T
  # APCF 1
  1 -2 3 $
* Join file (--joins), the adjacencies of each APCF in order:
  id1<TAB>id2<TAB>weight

Examples:
1. Default output files ancestor.apcf and ancestor.joins:
   ancar assemble 0.0 adjacencies.prob

2. Custom output:
   ancar assemble 0.1 adjacencies.prob -o out.apcf -j out.joins

"###,
        )
        .arg(
            Arg::new("min_weight")
                .required(true)
                .num_args(1)
                .index(1)
                .value_parser(value_parser!(f64))
                .help("Minimum adjacency weight"),
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(2)
                .help("Adjacency score filename. [stdin] for standard input"),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("ancestor.apcf")
                .help("APCF output filename. [stdout] for screen"),
        )
        .arg(
            Arg::new("joins")
                .short('j')
                .long("joins")
                .num_args(1)
                .default_value("ancestor.joins")
                .help("Join output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let min_weight = *args.get_one::<f64>("min_weight").unwrap();
    let infile = args.get_one::<String>("infile").unwrap();
    let outfile = args.get_one::<String>("outfile").unwrap();
    let outfile_joins = args.get_one::<String>("joins").unwrap();

    log::info!("Minimum weight = {}", min_weight);
    log::info!("Score file = {}", infile);

    //----------------------------
    // Ops
    //----------------------------
    let table = read_scores(infile)?;
    let assembler = Assembler::assemble(table.weighted_edges(), min_weight);

    //----------------------------
    // Output
    //----------------------------
    let mut writer = ancar::writer(outfile)?;
    write_apcf(&mut writer, table.numblocks, assembler.chains())?;
    writer.flush()?;

    let mut writer = ancar::writer(outfile_joins)?;
    write_joins(&mut writer, assembler.chains())?;
    writer.flush()?;

    Ok(())
}

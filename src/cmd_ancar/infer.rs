use ancar::libs::adjacency::{Evidence, Inference};
use ancar::libs::genome::read_genomes;
use ancar::libs::phylo::writer::write_newick;
use ancar::libs::phylo::Tree;
use anyhow::anyhow;
use clap::*;
use std::io::Write;
use std::path::Path;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("infer")
        .about("Infers posterior probabilities of ancestral adjacencies")
        .after_help(
            r###"
Computes, for every pair of element ends seen adjacent in some leaf genome,
the posterior probability that the pair was adjacent in the ancestor.

Input:
* <refspc>  Reference species. Its element count sets T.
* <alpha>   Rate scalar applied to every branch length.
* <tree>    Newick tree. `@` after a closing parenthesis marks the ancestor:
            ((hg19:0.1,panTro2:0.1)@:0.05,mm9:0.3);
* <genomes> Genome file, a `>name count` header followed by `count`
            chromosomes, each an optional `# chrN` line and a `$`-terminated
            list of signed element ids.

Outgroups:
* Leaves outside the clade of the ancestor read their adjacencies from
  `<joins-dir>/<name>.joins`, one `id1 id2` pair per line, 0 for a
  chromosome end.
* With `--no-outgroup-joins`, outgroups use their genome order instead.
* `-v` logs the outgroups and the tree rerooted at the ancestor.

Output:
* `#T`, then `id1 id2<TAB>prob` for each pair, 0 standing for a chromosome end.

Examples:
1. Default output file adjacencies.prob:
   ancar infer hg19 0.5 tree.txt genomes.txt

2. Outgroups without join files, to screen:
   ancar infer hg19 0.5 tree.txt genomes.txt --no-outgroup-joins -o stdout

"###,
        )
        .arg(
            Arg::new("refspc")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Reference species"),
        )
        .arg(
            Arg::new("alpha")
                .required(true)
                .num_args(1)
                .index(2)
                .value_parser(value_parser!(f64))
                .help("Rate scalar for branch lengths"),
        )
        .arg(
            Arg::new("tree")
                .required(true)
                .num_args(1)
                .index(3)
                .help("Tree filename"),
        )
        .arg(
            Arg::new("genomes")
                .required(true)
                .num_args(1)
                .index(4)
                .help("Genome filename. [stdin] for standard input"),
        )
        .arg(
            Arg::new("joins_dir")
                .long("joins-dir")
                .num_args(1)
                .default_value(".")
                .help("Directory holding <outgroup>.joins files"),
        )
        .arg(
            Arg::new("no_outgroup_joins")
                .long("no-outgroup-joins")
                .action(ArgAction::SetTrue)
                .help("Use the genome order of outgroups instead of join files"),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("adjacencies.prob")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let refspc = args.get_one::<String>("refspc").unwrap();
    let alpha = *args.get_one::<f64>("alpha").unwrap();
    let infile_tree = args.get_one::<String>("tree").unwrap();
    let infile_genomes = args.get_one::<String>("genomes").unwrap();
    let joins_dir = if args.get_flag("no_outgroup_joins") {
        None
    } else {
        Some(Path::new(args.get_one::<String>("joins_dir").unwrap()))
    };
    let outfile = args.get_one::<String>("outfile").unwrap();

    log::info!("alpha={}", alpha);

    //----------------------------
    // Tree
    //----------------------------
    let mut tree = Tree::from_file(infile_tree)?;
    let outgroups = tree.identify_outgroups().map_err(|e| anyhow!(e))?;
    for &id in &outgroups {
        if let Some(node) = tree.get_node(id) {
            log::info!("Outgroup: {}", node.name_or_id());
        }
    }
    tree.root_at_ancestor().map_err(|e| anyhow!(e))?;
    log::info!("Rerooted tree: {}", write_newick(&tree));

    //----------------------------
    // Evidence
    //----------------------------
    let genomes = read_genomes(infile_genomes)?;
    let evidence = Evidence::collect(&tree, refspc, &genomes, joins_dir)?;

    //----------------------------
    // Ops
    //----------------------------
    log::info!("Computing posterior probabilities ...");
    let mut inference = Inference::new(&tree, &evidence, alpha)?;
    inference.run();

    //----------------------------
    // Output
    //----------------------------
    let mut writer = ancar::writer(outfile)?;
    inference.write_posteriors(&mut writer)?;
    writer.flush()?;

    Ok(())
}

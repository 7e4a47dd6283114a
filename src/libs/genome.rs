use anyhow::{anyhow, bail, Context};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::io::BufRead;

lazy_static! {
    static ref RE_HEADER: Regex = Regex::new(r"^>\s*(\S+)\s+(\d+)\s*$").unwrap();
    static ref RE_CHR_TAG: Regex = Regex::new(r"^#\s*chr\S+").unwrap();
}

/// Whether a chromosome record came from an assembled chromosome or a scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromKind {
    Chrom,
    Scaffold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    pub kind: ChromKind,
    /// Signed element ids, the sign being the orientation
    pub elements: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    pub name: String,
    pub chromosomes: Vec<Chromosome>,
}

impl Genome {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            chromosomes: vec![],
        }
    }

    pub fn count_kind(&self, kind: ChromKind) -> usize {
        self.chromosomes.iter().filter(|c| c.kind == kind).count()
    }

    /// Total number of elements over all chromosomes.
    pub fn element_count(&self) -> usize {
        self.chromosomes.iter().map(|c| c.elements.len()).sum()
    }
}

/// Parse one element line: whitespace separated signed integers up to `$`.
fn parse_elements(line: &str) -> anyhow::Result<Vec<i32>> {
    let mut elements = vec![];
    for tok in line.split_whitespace() {
        if tok == "$" {
            return Ok(elements);
        }
        let e: i32 = tok
            .parse()
            .map_err(|_| anyhow!("invalid element id `{}`", tok))?;
        if e == 0 {
            bail!("element id 0 is reserved for chromosome ends");
        }
        elements.push(e);
    }

    bail!("element list not terminated by `$`")
}

/// Parse a genome file holding one record per species.
///
/// ```text
/// >hg19 2
/// # chr1
/// 1 -2 3 $
/// # chr2
/// 4 5 $
/// ```
///
/// A record header gives the species name and the number of chromosomes that
/// follow. Each chromosome line may be preceded by a `#` tag line; a tag of the
/// form `# chrN` marks a chromosome, any other tag a scaffold, and the kind
/// carries over to untagged records that follow.
pub fn parse_genomes<R: BufRead>(reader: R, source: &str) -> anyhow::Result<BTreeMap<String, Genome>> {
    let mut genomes = BTreeMap::new();
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l));

    let mut next_line = || -> anyhow::Result<Option<(usize, String)>> {
        match lines.next() {
            Some((no, line)) => {
                let line = line.with_context(|| format!("{}: failed reading line {}", source, no))?;
                Ok(Some((no, line)))
            }
            None => Ok(None),
        }
    };
    let eof = |what: &str| anyhow!("{}: unexpected end of file, expecting {}", source, what);

    while let Some((no, line)) = next_line()? {
        if !line.starts_with('>') {
            continue;
        }

        let caps = RE_HEADER
            .captures(&line)
            .ok_or_else(|| anyhow!("{}:{}: cannot parse genome header `{}`", source, no, line))?;
        let name = caps[1].to_string();
        let count: usize = caps[2]
            .parse()
            .with_context(|| format!("{}:{}: bad chromosome count", source, no))?;

        let mut genome = Genome::new(&name);
        let mut kind = ChromKind::Chrom;
        let mut seen: HashSet<u32> = HashSet::new();
        for _ in 0..count {
            let (mut no, mut line) = next_line()?.ok_or_else(|| eof("a chromosome record"))?;
            if line.starts_with('#') {
                kind = if RE_CHR_TAG.is_match(&line) {
                    ChromKind::Chrom
                } else {
                    ChromKind::Scaffold
                };
                (no, line) = next_line()?.ok_or_else(|| eof("an element list"))?;
            }

            let elements = parse_elements(&line)
                .with_context(|| format!("{}:{}: bad element list `{}`", source, no, line))?;
            if elements.is_empty() {
                log::warn!("{}:{}: empty chromosome in genome {}", source, no, name);
                continue;
            }
            if let Some(e) = elements.iter().find(|e| !seen.insert(e.unsigned_abs())) {
                bail!("{}:{}: element {} appears twice in genome {}", source, no, e.abs(), name);
            }
            genome.chromosomes.push(Chromosome { kind, elements });
        }

        log::debug!(
            "Genome {}: {} chromosomes, {} scaffolds, {} elements",
            name,
            genome.count_kind(ChromKind::Chrom),
            genome.count_kind(ChromKind::Scaffold),
            genome.element_count()
        );
        if genomes.insert(name.clone(), genome).is_some() {
            bail!("{}:{}: duplicated genome {}", source, no, name);
        }
    }

    Ok(genomes)
}

/// Read all genome records of a file.
pub fn read_genomes(infile: &str) -> anyhow::Result<BTreeMap<String, Genome>> {
    let reader = crate::reader(infile)?;
    parse_genomes(reader, infile)
}

/// Read adjacency hints, one `x y` pair of signed element ids per line.
/// `0` stands for a chromosome end; `0 0` lines carry nothing and are dropped.
pub fn read_joins(infile: &str) -> anyhow::Result<Vec<(i32, i32)>> {
    let mut joins = vec![];
    for (no, line) in crate::read_data_lines(infile)? {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            bail!("{}:{}: bad join line `{}`", infile, no, line);
        }
        let x: i32 = fields[0]
            .parse()
            .with_context(|| format!("{}:{}: bad join line `{}`", infile, no, line))?;
        let y: i32 = fields[1]
            .parse()
            .with_context(|| format!("{}:{}: bad join line `{}`", infile, no, line))?;
        if x == 0 && y == 0 {
            continue;
        }
        joins.push((x, y));
    }

    Ok(joins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> anyhow::Result<BTreeMap<String, Genome>> {
        parse_genomes(Cursor::new(text.to_string()), "test")
    }

    #[test]
    fn test_parse_genomes() {
        let text = "\
>hg19 3
# chr1
1 -2 3 $
# scaffold_7
4 $
-5 6 $
>mm9 1
1 2 3 -4 5 6 $
";
        let genomes = parse(text).unwrap();
        assert_eq!(genomes.len(), 2);

        let hg19 = &genomes["hg19"];
        assert_eq!(hg19.element_count(), 6);
        assert_eq!(hg19.count_kind(ChromKind::Chrom), 1);
        assert_eq!(hg19.count_kind(ChromKind::Scaffold), 2);
        assert_eq!(hg19.chromosomes[0].kind, ChromKind::Chrom);
        assert_eq!(hg19.chromosomes[0].elements, vec![1, -2, 3]);
        assert_eq!(hg19.chromosomes[1].kind, ChromKind::Scaffold);
        // The tag persists for untagged records
        assert_eq!(hg19.chromosomes[2].kind, ChromKind::Scaffold);
        assert_eq!(hg19.chromosomes[2].elements, vec![-5, 6]);

        assert_eq!(genomes["mm9"].chromosomes.len(), 1);
        assert_eq!(genomes["mm9"].chromosomes[0].kind, ChromKind::Chrom);
    }

    #[test]
    fn test_parse_genomes_skip_empty() {
        let genomes = parse(">A 2\n$\n1 2 $\n").unwrap();
        assert_eq!(genomes["A"].chromosomes.len(), 1);
        assert_eq!(genomes["A"].element_count(), 2);
    }

    #[test]
    fn test_parse_genomes_errors() {
        let err = parse(">A two\n1 2 $\n").unwrap_err();
        assert!(format!("{:#}", err).contains("test:1"));

        let err = parse(">A 2\n1 2 $\n").unwrap_err();
        assert!(format!("{:#}", err).contains("unexpected end of file"));

        let err = parse(">A 1\n1 x 2 $\n").unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("test:2"));
        assert!(msg.contains("`x`"));

        let err = parse(">A 1\n1 2\n").unwrap_err();
        assert!(format!("{:#}", err).contains("not terminated"));

        let err = parse(">A 1\n1 0 2 $\n").unwrap_err();
        assert!(format!("{:#}", err).contains("reserved"));

        let err = parse(">A 2\n1 -2 $\n# chr2\n3 2 $\n").unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("test:4"));
        assert!(msg.contains("element 2 appears twice"));

        let err = parse(">A 1\n1 $\n>A 1\n2 $\n").unwrap_err();
        assert!(format!("{:#}", err).contains("duplicated"));
    }

    #[test]
    fn test_read_joins() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("O.joins");
        std::fs::write(&file, "# hints\n0 1\n1 -2\n\n0 0\n-2 0\n").unwrap();

        let joins = read_joins(file.to_str().unwrap()).unwrap();
        assert_eq!(joins, vec![(0, 1), (1, -2), (-2, 0)]);

        std::fs::write(&file, "1 two\n").unwrap();
        assert!(read_joins(file.to_str().unwrap()).is_err());
    }
}

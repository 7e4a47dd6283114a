use super::Chain;
use itertools::Itertools;
use std::io::Write;

/// `>ANCESTOR\tT`, then `# APCF k` and the `$`-terminated element list of each chain.
pub fn write_apcf<'a>(
    writer: &mut dyn Write,
    numblocks: usize,
    chains: impl Iterator<Item = &'a Chain>,
) -> anyhow::Result<()> {
    writer.write_fmt(format_args!(">ANCESTOR\t{}\n", numblocks))?;
    for (k, chain) in chains.enumerate() {
        writer.write_fmt(format_args!("# APCF {}\n", k + 1))?;
        let elements = chain.elements();
        if elements.is_empty() {
            writer.write_all(b"$\n")?;
        } else {
            writer.write_fmt(format_args!("{} $\n", elements.iter().join(" ")))?;
        }
    }

    Ok(())
}

/// `id1\tid2\tweight` for every edge, chains in order.
pub fn write_joins<'a>(
    writer: &mut dyn Write,
    chains: impl Iterator<Item = &'a Chain>,
) -> anyhow::Result<()> {
    for chain in chains {
        for e in chain.edges() {
            writer.write_fmt(format_args!(
                "{}\t{}\t{}\n",
                e.signed1(),
                e.signed2(),
                format_general(e.weight)
            ))?;
        }
    }

    Ok(())
}

/// Shortest of fixed or scientific notation with six significant digits,
/// trailing zeros removed.
///
/// ```
/// use ancar::libs::apcf::format_general;
/// assert_eq!(format_general(0.9), "0.9");
/// assert_eq!(format_general(1.0), "1");
/// assert_eq!(format_general(0.8045849), "0.804585");
/// assert_eq!(format_general(0.00001), "1e-05");
/// assert_eq!(format_general(123456789.0), "1.23457e+08");
/// ```
pub fn format_general(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:.5e}", v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => return sci,
    };

    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(&mantissa), sign, exp.abs())
    } else {
        let decimals = (5 - exp) as usize;
        trim_zeros(&format!("{:.*}", decimals, v))
    }
}

fn trim_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

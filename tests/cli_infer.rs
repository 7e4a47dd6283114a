use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn command_infer_stdout() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ancar")?;
    let output = cmd
        .arg("infer")
        .arg("A")
        .arg("1")
        .arg("tests/ancar/tree.txt")
        .arg("tests/ancar/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert_eq!(
        stdout,
        "\
#3
0 1\t1.000000e+00
0 -2\t1.061177e-02
0 -3\t8.045849e-01
1 2\t8.045849e-01
1 3\t1.061177e-02
2 3\t8.045849e-01
2 0\t1.061177e-02
3 2\t1.061177e-02
3 0\t8.045849e-01
-1 0\t1.000000e+00
-2 -1\t8.045849e-01
-2 -3\t1.061177e-02
-3 -1\t1.061177e-02
-3 -2\t8.045849e-01
"
    );

    Ok(())
}

#[test]
fn command_infer_outfile() -> anyhow::Result<()> {
    let tempdir = tempfile::tempdir()?;
    let outfile = tempdir.path().join("adjacencies.prob");

    let mut cmd = Command::cargo_bin("ancar")?;
    cmd.arg("infer")
        .arg("A")
        .arg("1")
        .arg("tests/ancar/tree.txt")
        .arg("tests/ancar/genomes.txt")
        .arg("-o")
        .arg(&outfile)
        .assert()
        .success();

    let content = std::fs::read_to_string(&outfile)?;
    assert_eq!(content.lines().count(), 15);
    assert!(content.starts_with("#3\n"));

    Ok(())
}

#[test]
fn command_infer_outgroup_joins() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ancar")?;
    let output = cmd
        .arg("infer")
        .arg("A")
        .arg("1")
        .arg("tests/ancar/tree_outgroup.txt")
        .arg("tests/ancar/genomes.txt")
        .arg("--joins-dir")
        .arg("tests/ancar")
        .arg("-o")
        .arg("stdout")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert!(stdout.starts_with("#3\n"));
    // Only the outgroup join file has 1 followed by -3
    assert!(stdout.contains("\n1 -3\t"));

    Ok(())
}

#[test]
fn command_infer_no_outgroup_joins() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ancar")?;
    let output = cmd
        .arg("infer")
        .arg("A")
        .arg("1")
        .arg("tests/ancar/tree_outgroup.txt")
        .arg("tests/ancar/genomes.txt")
        .arg("--no-outgroup-joins")
        .arg("-o")
        .arg("stdout")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert!(!stdout.contains("\n1 -3\t"));
    assert!(stdout.contains("\n1 2\t9.221653e-01\n"));
    assert!(stdout.contains("\n0 3\t5.910554e-03\n"));
    assert!(stdout.contains("\n-3 0\t5.910554e-03\n"));
    assert_eq!(stdout.lines().count(), 17);

    Ok(())
}

#[test]
fn command_infer_missing_joins() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ancar")?;
    cmd.arg("infer")
        .arg("A")
        .arg("1")
        .arg("tests/ancar/tree_outgroup.txt")
        .arg("tests/ancar/genomes.txt")
        .arg("--joins-dir")
        .arg("tests/not-exists")
        .arg("-o")
        .arg("stdout")
        .assert()
        .failure()
        .stderr(predicate::str::contains("O.joins"));

    Ok(())
}

#[test]
fn command_infer_bad_reference() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ancar")?;
    cmd.arg("infer")
        .arg("X")
        .arg("1")
        .arg("tests/ancar/tree.txt")
        .arg("tests/ancar/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Reference species X"));

    Ok(())
}

#[test]
fn command_infer_bad_genome() -> anyhow::Result<()> {
    let tempdir = tempfile::tempdir()?;
    let genomes = tempdir.path().join("genomes.txt");
    std::fs::write(&genomes, ">A 1\n1 2 3 $\n>B 1\n1 2 9 $\n>C 1\n1 3 2 $\n")?;

    let mut cmd = Command::cargo_bin("ancar")?;
    cmd.arg("infer")
        .arg("A")
        .arg("1")
        .arg("tests/ancar/tree.txt")
        .arg(&genomes)
        .arg("-o")
        .arg("stdout")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Element 9 of B"));

    Ok(())
}

#[test]
fn command_infer_verbose_tree() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ancar")?;
    cmd.arg("infer")
        .arg("A")
        .arg("1")
        .arg("tests/ancar/tree_outgroup.txt")
        .arg("tests/ancar/genomes.txt")
        .arg("--no-outgroup-joins")
        .arg("-o")
        .arg("stdout")
        .arg("-v")
        .assert()
        .success()
        .stderr(predicate::str::contains("Outgroup: O"))
        .stderr(predicate::str::contains(
            "Rerooted tree: ((O:0.2)IN3:0.1,(A:0.1,(B:0.1,C:0.1)IN1:0.1)@IN2:0)NEWROOT;",
        ));

    // Quiet by default
    let mut cmd = Command::cargo_bin("ancar")?;
    cmd.arg("infer")
        .arg("A")
        .arg("1")
        .arg("tests/ancar/tree.txt")
        .arg("tests/ancar/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    Ok(())
}

#[test]
fn command_infer_tree_parse_error() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ancar")?;
    cmd.arg("infer")
        .arg("A")
        .arg("1")
        .arg("stdin")
        .arg("tests/ancar/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .write_stdin("(A:0.1,(B:0.1,C:0.1)@:0.1)")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error"));

    // Missing branch length below the root
    let mut cmd = Command::cargo_bin("ancar")?;
    cmd.arg("infer")
        .arg("A")
        .arg("1")
        .arg("stdin")
        .arg("tests/ancar/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .write_stdin("(A:0.1,(B:0.1,C)@:0.1);")
        .assert()
        .failure()
        .stderr(predicate::str::contains("column"));

    Ok(())
}

#[test]
fn command_infer_tree_without_marker() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ancar")?;
    cmd.arg("infer")
        .arg("A")
        .arg("1")
        .arg("stdin")
        .arg("tests/ancar/genomes.txt")
        .arg("-o")
        .arg("stdout")
        .write_stdin("(A:0.1,(B:0.1,C:0.1):0.1);")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#3\n0 1\t"))
        .stderr(predicate::str::contains("No ancestral marker"));

    Ok(())
}

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn command_ref_circularize() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("isat")?;
    let output = cmd
        .arg("ref")
        .arg("circularize")
        .arg("tests/ref/vector.fa")
        .arg("-s")
        .arg("CCT")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(
        stdout,
        ">vector_circularized FRT_site_orientation: forward\nAACCTAA\n"
    );

    Ok(())
}

#[test]
fn command_ref_circularize_revcomp() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let outfile = temp.path().join("circ.fa");

    let mut cmd = Command::cargo_bin("isat")?;
    cmd.arg("ref")
        .arg("circularize")
        .arg("tests/ref/vector.fa")
        .arg("--frt")
        .arg("agg")
        .arg("-o")
        .arg(&outfile)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&outfile)?,
        ">vector_circularized FRT_site_orientation: revcomp\nAACCTAA\n"
    );

    Ok(())
}

#[test]
fn command_ref_circularize_missing_sites() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("isat")?;
    cmd.arg("ref")
        .arg("circularize")
        .arg("-s")
        .arg("CCT")
        .write_stdin(">v\nTTTTTTCCTAAAACCCGGGGG\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected 2 FRT sites"));

    Ok(())
}

#[test]
fn command_ref_circularize_two_records() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("isat")?;
    cmd.arg("ref")
        .arg("circularize")
        .arg("-s")
        .arg("CCT")
        .write_stdin(">v1\nTTTTTTCCTAAAACCTGGGGG\n>v2\nTTTTTTCCTAAAACCTGGGGG\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Input file must contain exactly one FASTA record.",
        ));

    Ok(())
}

#[test]
fn command_ref_circularize_bad_frt() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("isat")?;
    cmd.arg("ref")
        .arg("circularize")
        .arg("tests/ref/vector.fa")
        .arg("-s")
        .arg("CCU")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FRT sequence must only contain"));

    Ok(())
}

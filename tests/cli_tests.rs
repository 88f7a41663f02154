//! End-to-end tests of the `sonar` binary.
//!
//! External tools are replaced by small shell scripts, so the tests that run
//! an aligner or DNAML are unix-only.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LIBRARY: &str = ">IGHV1-2*02\nATGAACC\n>IGHV3-23*01\nGAGGTGC\n";

const READS: &str = "\
>read_good V_gene=IGHV1-2*02,J_gene=IGHJ4*02
ATGAACC
>read_shift V_gene=IGHV1-2*02
ATG-ACC
>read_unknown V_gene=IGHV9-99*01
ATGAACC
>read_untagged
ATGAACC
";

fn sonar() -> Command {
    Command::cargo_bin("sonar").unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Stand-in for ClustalW: reports the two input sequences as already aligned
#[cfg(unix)]
fn fake_clustalw(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = write(
        dir,
        "fake_clustalw",
        r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    -INFILE=*) in="${arg#-INFILE=}" ;;
    -OUTFILE=*) out="${arg#-OUTFILE=}" ;;
  esac
done
{
  echo "CLUSTAL 2.1 multiple sequence alignment"
  echo
  awk '/^>/ { name = substr($1, 2); next } { print name "    " $0 }' "$in"
} > "$out"
"#,
    );
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_help() {
    sonar()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check-frameshift"))
        .stdout(predicate::str::contains("dnaml"));

    sonar()
        .args(["check-frameshift", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--threads"));
}

#[test]
fn test_missing_positionals_is_usage_error() {
    sonar()
        .arg("check-frameshift")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_zero_threads_rejected() {
    let dir = TempDir::new().unwrap();
    let reads = write(dir.path(), "reads.fa", READS);
    sonar()
        .arg("check-frameshift")
        .arg(&reads)
        .arg(dir.path().join("out.fa"))
        .args(["--threads", "0"])
        .assert()
        .failure();
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let library = write(dir.path(), "germline.fa", LIBRARY);
    sonar()
        .arg("check-frameshift")
        .arg(dir.path().join("missing.fa"))
        .arg(dir.path().join("out.fa"))
        .arg(&library)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
    assert!(!dir.path().join("out.fa").exists());
}

#[test]
fn test_missing_library() {
    let dir = TempDir::new().unwrap();
    let reads = write(dir.path(), "reads.fa", READS);
    sonar()
        .arg("check-frameshift")
        .arg(&reads)
        .arg(dir.path().join("out.fa"))
        .arg(dir.path().join("no-library.fa"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Germline library not found"));
}

#[test]
fn test_empty_input() {
    let dir = TempDir::new().unwrap();
    let reads = write(dir.path(), "reads.fa", "");
    let library = write(dir.path(), "germline.fa", LIBRARY);
    let output = dir.path().join("out.fa");

    sonar()
        .arg("check-frameshift")
        .arg(&reads)
        .arg(&output)
        .arg(&library)
        .env("SONAR_CLUSTALW", "sonar-no-such-clustalw")
        .assert()
        .success()
        .stdout("Total: 0, Good: 0\n");
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[cfg(unix)]
#[test]
fn test_check_frameshift_end_to_end() {
    let dir = TempDir::new().unwrap();
    let clustalw = fake_clustalw(dir.path());
    let reads = write(dir.path(), "reads.fa", READS);
    let library = write(dir.path(), "germline.fa", LIBRARY);
    let output = dir.path().join("good.fa");

    sonar()
        .arg("check-frameshift")
        .arg(&reads)
        .arg(&output)
        .arg(&library)
        .env("SONAR_CLUSTALW", &clustalw)
        .assert()
        .success()
        .stdout("Total: 4, Good: 1\n")
        .stderr(predicate::str::contains("read_unknown might be misassigned"))
        .stderr(predicate::str::contains("read_untagged has no V_gene"));

    let kept = fs::read_to_string(&output).unwrap();
    assert!(kept.starts_with(">read_good V_gene=IGHV1-2*02,J_gene=IGHJ4*02\nATGAACC"));
    assert!(!kept.contains("read_shift"));

    // Same output with concurrent alignments and on a re-run
    let parallel = dir.path().join("good-parallel.fa");
    sonar()
        .arg("check-frameshift")
        .arg(&reads)
        .arg(&parallel)
        .arg(&library)
        .args(["--threads", "4"])
        .arg("--clustalw")
        .arg(&clustalw)
        .assert()
        .success()
        .stdout("Total: 4, Good: 1\n");
    assert_eq!(fs::read_to_string(&parallel).unwrap(), kept);
}

#[cfg(unix)]
#[test]
fn test_check_frameshift_json_summary() {
    let dir = TempDir::new().unwrap();
    let clustalw = fake_clustalw(dir.path());
    let reads = write(dir.path(), "reads.fa", READS);
    let library = write(dir.path(), "germline.fa", LIBRARY);

    let assert = sonar()
        .arg("check-frameshift")
        .arg(&reads)
        .arg(dir.path().join("good.fa"))
        .arg(&library)
        .args(["--format", "json"])
        .env("SONAR_CLUSTALW", &clustalw)
        .assert()
        .success();

    let summary: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(summary["total"], 4);
    assert_eq!(summary["good"], 1);
    assert_eq!(summary["frameshift"], 1);
    assert_eq!(summary["unknown_germline"], 1);
    assert_eq!(summary["missing_tag"], 1);
}

#[cfg(unix)]
#[test]
fn test_check_frameshift_tsv_stdout_is_only_the_table() {
    let dir = TempDir::new().unwrap();
    let clustalw = fake_clustalw(dir.path());
    let reads = write(dir.path(), "reads.fa", READS);
    let library = write(dir.path(), "germline.fa", LIBRARY);

    sonar()
        .arg("check-frameshift")
        .arg(&reads)
        .arg(dir.path().join("good.fa"))
        .arg(&library)
        .args(["--format", "tsv", "--verbose"])
        .env("SONAR_CLUSTALW", &clustalw)
        .assert()
        .success()
        .stdout(
            "total\tgood\tmissing_tag\tunknown_germline\talignment_failed\tframeshift\n\
             4\t1\t1\t1\t0\t1\n",
        )
        .stderr(predicate::str::contains("read_unknown might be misassigned"));
}

#[test]
fn test_list_ids() {
    let dir = TempDir::new().unwrap();
    let reads = write(dir.path(), "reads.fa", READS);

    sonar()
        .arg("list-ids")
        .arg(&reads)
        .assert()
        .success()
        .stdout("read_good\nread_shift\nread_unknown\nread_untagged\n");

    let list = dir.path().join("ids.txt");
    sonar()
        .arg("list-ids")
        .arg(&reads)
        .arg("-o")
        .arg(&list)
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(&list).unwrap(),
        "read_good\nread_shift\nread_unknown\nread_untagged\n"
    );
}

#[test]
fn test_command_history_in_project() {
    let project = TempDir::new().unwrap();
    fs::create_dir_all(project.path().join("output/logs")).unwrap();
    write(project.path(), "reads.fa", READS);

    sonar()
        .current_dir(project.path())
        .args(["list-ids", "reads.fa"])
        .assert()
        .success();
    sonar()
        .current_dir(project.path())
        .args(["list-ids", "missing.fa"])
        .assert()
        .failure();

    let history =
        fs::read_to_string(project.path().join("output/logs/command_history.log")).unwrap();
    assert!(history.contains("run with command:\n\t"));
    assert!(history.contains("list-ids reads.fa\n"));
    assert!(history.contains("-- Program finished successfully"));
    assert!(history.contains("-- Program exited with error:\n\tFile not found: missing.fa"));
}

#[test]
fn test_no_history_outside_project() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "reads.fa", READS);

    sonar()
        .current_dir(dir.path())
        .args(["list-ids", "reads.fa"])
        .assert()
        .success();
    assert!(!dir.path().join("output").exists());
}

#[test]
fn test_dnaml_requires_one_source() {
    sonar().arg("dnaml").assert().failure();
    sonar()
        .args(["dnaml", "-i", "aligned.phy", "-g", "IGHV1-2*02"])
        .assert()
        .failure();
}

#[cfg(unix)]
#[test]
fn test_dnaml_from_phylip() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let dnaml = write(
        dir.path(),
        "fake_dnaml",
        "#!/bin/sh\n\
         cat > /dev/null\n\
         echo '(0000000001:0.1,0000000002:0.0);' > outtree\n\
         echo '0000000002 is the outgroup' > outfile\n",
    );
    fs::set_permissions(&dnaml, fs::Permissions::from_mode(0o755)).unwrap();
    let aligned = write(
        dir.path(),
        "aligned.phy",
        "2 7\nread_good ATGAACC\nIGHV1-2*02 ATGAACC\n",
    );

    sonar()
        .current_dir(dir.path())
        .arg("dnaml")
        .arg("-i")
        .arg(&aligned)
        .args(["--outtree", "lineage.tree", "--outfile", "lineage.out", "--seed", "9"])
        .arg("--dnaml")
        .arg(&dnaml)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output in lineage.tree and lineage.out"));

    assert_eq!(
        fs::read_to_string(dir.path().join("lineage.tree")).unwrap(),
        "(read_good:0.1,IGHV1-2*02:0.0);\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("lineage.out")).unwrap(),
        "IGHV1-2*02 is the outgroup\n"
    );

    // A second run refuses to clobber the first without --force
    sonar()
        .current_dir(dir.path())
        .arg("dnaml")
        .arg("-i")
        .arg(&aligned)
        .arg("--dnaml")
        .arg(&dnaml)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Old files exist"));
}

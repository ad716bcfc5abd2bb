use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn s1_rectangular_prints_the_unique_solution() {
    Command::cargo_bin("regex_crossword_solver")
        .unwrap()
        .arg("tests/fixtures/s1_unique_solution.grid")
        .assert()
        .success()
        .stdout(contains("ATO"))
        .stdout(contains("WEL"));
}

#[test]
fn s2_rectangular_reports_no_solutions() {
    Command::cargo_bin("regex_crossword_solver")
        .unwrap()
        .arg("tests/fixtures/s2_no_solutions.grid")
        .assert()
        .success()
        .stdout(contains("no solutions found"));
}

#[test]
fn s3_hexagonal_prints_the_unique_solution() {
    Command::cargo_bin("regex_crossword_solver")
        .unwrap()
        .arg("tests/fixtures/s3_hexagonal.grid")
        .assert()
        .success()
        .stdout(contains("NH"))
        .stdout(contains("DIO"));
}

#[test]
fn stop_after_caps_the_reported_solutions() {
    Command::cargo_bin("regex_crossword_solver")
        .unwrap()
        .args(["tests/fixtures/s1_unique_solution.grid", "--stop-after=1"])
        .assert()
        .success()
        .stdout(contains("solution 1:"));
}

#[test]
fn missing_grid_path_is_a_usage_error() {
    Command::cargo_bin("regex_crossword_solver")
        .unwrap()
        .assert()
        .failure();
}

#[test]
fn nonexistent_grid_file_is_reported() {
    Command::cargo_bin("regex_crossword_solver")
        .unwrap()
        .arg("tests/fixtures/does_not_exist.grid")
        .assert()
        .failure()
        .stderr(contains("error"));
}

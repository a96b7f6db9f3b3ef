#![allow(deprecated)] // cargo_bin is deprecated but still functional

use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tapecat_catalogue::{Catalogue, SqliteCatalogue};
use tapecat_catalogue::models::{NewDiskInstanceSpace, NewDiskSystem};
use tapecat_core::SecurityIdentity;
use tapecat_core::config::CatalogueConfig;
use tempfile::TempDir;

fn write_config(dir: &Path, extra: &str) -> std::path::PathBuf {
    let config_path = dir.join("tapecat.toml");
    let contents = format!(
        "[catalogue]\npath = \"{}\"\n{extra}",
        dir.join("catalogue.db").display()
    );
    fs::write(&config_path, contents).unwrap();
    config_path
}

fn tapecat(config_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tapecat").unwrap();
    cmd.arg("--config").arg(config_path).env("RUST_LOG", "warn");
    cmd
}

#[test]
fn verify_schema_on_fresh_catalogue() {
    let temp = TempDir::new().unwrap();
    let config_path = write_config(temp.path(), "");

    tapecat(&config_path)
        .arg("verify-schema")
        .assert()
        .success()
        .stdout(contains("Catalogue schema version 1.0 OK"));

    assert!(temp.path().join("catalogue.db").exists());
}

#[test]
fn verify_schema_reports_mismatch() {
    let temp = TempDir::new().unwrap();
    let config_path = write_config(
        temp.path(),
        "max_tries_to_connect = 1\nexpected_schema_version = { major = 2, minor = 0 }\n",
    );

    tapecat(&config_path)
        .arg("verify-schema")
        .assert()
        .failure()
        .stderr(contains("schema version mismatch: expected 2.0, found 1.0"));
}

#[test]
fn environment_overrides_missing_config_file() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("nested").join("env.db");

    tapecat(&temp.path().join("absent.toml"))
        .env("TAPECAT_CATALOGUE__PATH", &db_path)
        .arg("ping")
        .assert()
        .success()
        .stdout(contains("is reachable"));

    assert!(db_path.exists());
}

#[test]
fn invalid_configuration_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config_path = write_config(temp.path(), "listing_page_size = 0\n");

    tapecat(&config_path)
        .arg("ping")
        .assert()
        .failure()
        .stderr(contains("listing_page_size"));
}

#[test]
fn metrics_are_printed_in_text_format() {
    let temp = TempDir::new().unwrap();
    let config_path = write_config(temp.path(), "");

    tapecat(&config_path)
        .arg("metrics")
        .assert()
        .success()
        .stdout(contains("tapecat_catalogue_retries_total"))
        .stdout(contains("tapecat_free_space_cache_hits_total"));
}

#[tokio::test]
async fn free_space_lists_disk_systems_and_failures() {
    let temp = TempDir::new().unwrap();
    let config_path = write_config(temp.path(), "");

    let catalogue = SqliteCatalogue::open(&CatalogueConfig::for_testing(
        temp.path().join("catalogue.db"),
    ))
    .await
    .unwrap();
    let admin = SecurityIdentity::new("admin1", "host1");
    catalogue
        .disk_instances()
        .create_disk_instance(&admin, "di1", "disk instance")
        .await
        .unwrap();
    for (name, url) in [("ds1", "constantFreeSpace:5000"), ("ds2", "eosSpace:spinners")] {
        catalogue
            .disk_instance_spaces()
            .create_disk_instance_space(
                &admin,
                &NewDiskInstanceSpace {
                    disk_instance_name: "di1".to_string(),
                    name: format!("{name}_space"),
                    free_space_query_url: url.to_string(),
                    refresh_interval: 60,
                    comment: "space".to_string(),
                },
            )
            .await
            .unwrap();
        catalogue
            .disk_systems()
            .create_disk_system(
                &admin,
                &NewDiskSystem {
                    name: name.to_string(),
                    file_regexp: format!("^root://{name}/"),
                    disk_instance_name: "di1".to_string(),
                    disk_instance_space_name: format!("{name}_space"),
                    targeted_free_space: 1000,
                    sleep_time: 15,
                    comment: "disk system".to_string(),
                },
            )
            .await
            .unwrap();
    }
    catalogue.pools().close().await;

    // ds2 needs the external script, which is not configured.
    tapecat(&config_path)
        .arg("free-space")
        .arg("--bytes")
        .arg("3000")
        .assert()
        .failure()
        .stdout(contains("ds1"))
        .stdout(contains("5000"))
        .stdout(contains("yes"))
        .stderr(contains("ds2"))
        .stderr(contains("1 of 2 disk system(s)"));

    tapecat(&config_path)
        .arg("free-space")
        .arg("ds1")
        .arg("--bytes")
        .arg("4500")
        .assert()
        .success()
        .stdout(contains("no"));
}

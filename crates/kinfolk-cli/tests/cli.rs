use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;

const TODAY: &str = "2024-06-10";

struct Vault {
    temp: TempDir,
}

impl Vault {
    fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("config.toml"), "contacts_folder = \"People\"\n")
            .expect("write config");
        Self { temp }
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    fn config_path(&self) -> PathBuf {
        self.root().join("config.toml")
    }

    fn people(&self) -> PathBuf {
        self.root().join("People")
    }

    fn output(&self, args: &[&str]) -> Output {
        cargo_bin_cmd!("kinfolk")
            .args(["--root", self.root().to_str().expect("root")])
            .args(["--config", self.config_path().to_str().expect("config")])
            .args(["--today", TODAY])
            .args(args)
            .output()
            .expect("run command")
    }

    fn run(&self, args: &[&str]) -> String {
        let output = self.output(args);
        assert!(output.status.success(), "command failed: {:?}", output);
        String::from_utf8(output.stdout).expect("utf8")
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let output = self.output(&full);
        assert!(output.status.success(), "command failed: {:?}", output);
        serde_json::from_slice(&output.stdout).expect("parse json")
    }
}

#[test]
fn cli_contact_lifecycle() {
    let vault = Vault::new();

    vault.run(&[
        "add-contact",
        "--name",
        "Ada Lovelace",
        "--birthday",
        "1990-06-15",
        "--relationship",
        "Mentor",
    ]);
    vault.run(&["add-contact", "--name", "Bob", "--birthday", "1985-06-10"]);
    assert!(vault.people().join("Ada Lovelace.md").is_file());

    let list = vault.run_json(&["list"]);
    let rows = list.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Bob");
    assert_eq!(rows[0]["days_until_birthday"], 0);
    assert_eq!(rows[1]["name"], "Ada Lovelace");
    assert_eq!(rows[1]["relationship"], "mentor");
    assert_eq!(rows[1]["age"], 33);

    let by_name = vault.run_json(&["list", "--sort", "name", "--desc"]);
    assert_eq!(by_name[0]["name"], "Bob");
    let filtered = vault.run_json(&["list", "--filter", "LOVE"]);
    assert_eq!(filtered.as_array().expect("array").len(), 1);

    vault.run(&["interaction", "add", "Ada Lovelace", "--date", "2024-06-01", "--text", "Coffee."]);
    vault.run(&["interaction", "add", "ada lovelace", "--date", "2024-06-05", "--text", "Call."]);
    let entries = vault.run_json(&["interaction", "ls", "Ada Lovelace"]);
    assert_eq!(entries[0]["text"], "Call.");
    assert_eq!(entries[1]["date"], "2024-06-01");

    vault.run(&["interaction", "edit", "Ada Lovelace", "2", "--text", "Long coffee."]);
    let removed = vault.run_json(&["interaction", "rm", "Ada Lovelace", "1"]);
    assert_eq!(removed["text"], "Call.");

    vault.run(&["notes", "Ada Lovelace", "--set", "Prefers tea."]);
    vault.run(&["edit-contact", "Ada Lovelace", "--set", "twitter=@ada"]);

    let detail = vault.run_json(&["show", "Ada Lovelace"]);
    assert_eq!(detail["name"], "Ada Lovelace");
    assert_eq!(detail["days_until_birthday"], 5);
    assert_eq!(detail["notes"], "Prefers tea.");
    assert_eq!(detail["interactions"][0]["text"], "Long coffee.");
    assert_eq!(detail["almanac"]["zodiac"], "Gemini");
    let fields = detail["fields"].as_array().expect("fields");
    assert!(fields.iter().any(|pair| pair[0] == "twitter" && pair[1] == "@ada"));

    let last = vault.run_json(&["list", "--filter", "ada"]);
    assert_eq!(last[0]["last_interaction"], "2024-06-01");

    vault.run(&["rename", "Ada Lovelace", "Ada King"]);
    assert!(!vault.people().join("Ada Lovelace.md").exists());
    let raw = fs::read_to_string(vault.people().join("Ada King.md")).expect("read");
    assert!(raw.starts_with("---\nname: Ada King\n"));

    vault.run(&["delete", "Ada King", "--yes"]);
    assert!(vault.root().join(".trash").join("Ada King.md").is_file());
    assert_eq!(vault.run_json(&["list"]).as_array().expect("array").len(), 1);
}

#[test]
fn cli_new_relationship_is_saved_to_config() {
    let vault = Vault::new();
    vault.run(&["add-contact", "--name", "Ada", "--relationship", "Mentor"]);

    let config = fs::read_to_string(vault.config_path()).expect("read config");
    assert!(config.contains("\"mentor\""));
    assert!(config.contains("contacts_folder = \"People\""));

    let known = vault.run_json(&["relationship", "ls"]);
    let known: Vec<&str> = known
        .as_array()
        .expect("array")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(known.iter().filter(|name| **name == "mentor").count(), 1);

    let out = vault.run(&["relationship", "add", "MENTOR"]);
    assert!(out.contains("already known"));
}

#[test]
fn cli_remind_reports_today_and_tomorrow() {
    let vault = Vault::new();
    vault.run(&["add-contact", "--name", "Bob", "--birthday", "1985-06-10"]);
    vault.run(&["add-contact", "--name", "Cy", "--birthday", "2001-06-11"]);
    vault.run(&["add-contact", "--name", "Di", "--birthday", "2001-06-11"]);

    let out = vault.run(&["remind"]);
    assert!(out.contains("It's Bob's birthday today!"));
    assert!(out.contains("It's Cy and Di's birthday tomorrow!"));

    let json = vault.run_json(&["remind", "--days", "1"]);
    assert_eq!(json["today"][0], "Bob");
    assert_eq!(json["upcoming"].as_array().expect("upcoming").len(), 3);
}

#[test]
fn cli_reports_skipped_files() {
    let vault = Vault::new();
    fs::create_dir_all(vault.people()).expect("mkdir");
    fs::write(vault.people().join("Ada.md"), "---\nname: Ada\n---\n").expect("write");
    fs::write(vault.people().join("Scratch.md"), "no header here\n").expect("write");

    let output = vault.output(&["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stdout.contains("Ada"));
    assert!(!stdout.contains("Scratch"));
    assert!(stderr.contains("skipped 1 file(s)"));
}

#[test]
fn cli_exit_codes() {
    let vault = Vault::new();
    vault.run(&["add-contact", "--name", "Ada"]);

    let missing = vault.output(&["show", "Grace"]);
    assert_eq!(missing.status.code(), Some(2));

    let bad_date = vault.output(&["add-contact", "--name", "Grace", "--birthday", "12/09/1906"]);
    assert_eq!(bad_date.status.code(), Some(3));
    assert!(!vault.people().join("Grace.md").exists());

    let duplicate = vault.output(&["add-contact", "--name", "Ada"]);
    assert_eq!(duplicate.status.code(), Some(3));

    let unconfirmed = vault.output(&["delete", "Ada"]);
    assert_eq!(unconfirmed.status.code(), Some(3));
    assert!(vault.people().join("Ada.md").is_file());

    let out_of_range = vault.output(&["interaction", "rm", "Ada", "1"]);
    assert_eq!(out_of_range.status.code(), Some(3));
}

#[test]
fn cli_rejected_edit_leaves_file_untouched() {
    let vault = Vault::new();
    vault.run(&["add-contact", "--name", "Ada", "--birthday", "1990-06-15"]);
    let path = vault.people().join("Ada.md");
    let before = fs::read_to_string(&path).expect("read contact");

    let output = vault.output(&["edit-contact", "Ada", "--email", "ada@x.org", "--set", "name=Bob"]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(fs::read_to_string(&path).expect("read contact"), before);

    vault.run(&[
        "edit-contact",
        "Ada",
        "--email",
        "ada@x.org",
        "--address",
        "12 St James's Square",
    ]);
    vault.run(&["add-field", "Ada", "Github", "--value", "ada-l"]);
    let detail = vault.run_json(&["show", "Ada"]);
    let raw = fs::read_to_string(&path).expect("read contact");
    assert!(raw.contains("email: ada@x.org\n"), "{raw}");
    assert!(raw.contains("address: 12 St James's Square\n"), "{raw}");
    assert!(raw.contains("github: ada-l\n"), "{raw}");
    assert_eq!(detail["name"], "Ada");
}

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Answers for a brand new repository with one untitled patch.
#[allow(dead_code)]
pub const NEW_REPO_ANSWERS: &str =
    "my_repo\nMy Repository\nme@example.com\nhttp://example.com/\nEoSD patch\n";

pub fn repo_update_cmd(cwd: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("repo-update");
    cmd.current_dir(cwd);
    cmd
}

/// Creates `<root>/<id>/patch.js` with the given JSON body.
pub fn write_patch(root: &Path, id: &str, patch_js: &str) {
    fs::create_dir_all(root.join(id)).unwrap();
    fs::write(root.join(id).join("patch.js"), patch_js).unwrap();
}

// Only the end-to-end tests inspect written descriptors.
#[allow(dead_code)]
pub fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

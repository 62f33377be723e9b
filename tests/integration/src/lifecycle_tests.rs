//! Full lifecycle across JSON, dotted-root JSON and TOML client files
//!
//! Scenario: three clients each hold some servers. `init` builds the central
//! store, `sync` fans it back out, then entries are added and removed while
//! every byte the tool does not own stays put.

use mcpset_core::{
    AddOptions, ApplyOptions, CentralStore, CollectOptions, Decision, RemoveOptions, Settings,
    TargetRegistry, TargetStatus, add_entry, apply, collect, remove_entry,
};
use mcpset_fs::compute_file_checksum;
use mcpset_test_utils::{Sandbox, TargetDecl};
use pretty_assertions::assert_eq;
use serde_json::json;

const CLAUDE: &str = r#"{
  "numStartups": 12,
  "mcpServers": {
    "github": {"command": "docker", "args": ["run", "-i", "ghcr.io/github/github-mcp-server"]}
  },
  "projects": {}
}
"#;

const VSCODE: &str = r#"{
    "editor.fontSize": 13,
    "mcp": {
        "servers": {
            "github": {
                "command": "gh-mcp"
            },
            "playwright": {
                "command": "npx",
                "args": ["@playwright/mcp"]
            }
        }
    }
}
"#;

const CODEX: &str = r#"# Codex settings
model = "o3"

[mcp_servers.sqlite]
command = "uvx" # local build
args = ["mcp-server-sqlite", "--db", "/tmp/app.db"]
"#;

struct World {
    sandbox: Sandbox,
    settings: Settings,
}

impl World {
    fn new() -> Self {
        let sandbox = Sandbox::new();
        sandbox.write_targets(&[
            TargetDecl::json("claude", ".claude.json"),
            TargetDecl::json("vscode", ".config/Code/User/settings.json").with_root("mcp.servers"),
            TargetDecl::toml("codex", ".codex/config.toml"),
        ]);
        sandbox.write_file(".claude.json", CLAUDE);
        sandbox.write_file(".config/Code/User/settings.json", VSCODE);
        sandbox.write_file(".codex/config.toml", CODEX);
        let settings = Settings::in_dir(sandbox.config_dir()).with_home(sandbox.home());
        Self { sandbox, settings }
    }

    fn open(&self) -> (TargetRegistry, CentralStore) {
        let registry = TargetRegistry::load(&self.settings).unwrap();
        let store = CentralStore::open(registry.central()).unwrap();
        (registry, store)
    }

    fn checksums(&self) -> Vec<String> {
        [
            ".claude.json",
            ".config/Code/User/settings.json",
            ".codex/config.toml",
        ]
        .iter()
        .map(|rel| compute_file_checksum(&self.sandbox.path(rel)).unwrap())
        .collect()
    }
}

#[test]
fn init_then_sync_converges_every_client() {
    let world = World::new();
    let (registry, mut store) = world.open();

    let collected = collect(
        &registry,
        &mut store,
        &CollectOptions {
            apply: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(collected.run.success());
    assert!(collected.store_written);

    let central = world.sandbox.read_json(".mcp/config.json");
    let keys: Vec<&String> = central["mcpServers"].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["github", "playwright", "sqlite"]);
    // claude is processed first and wins the github collision
    assert_eq!(central["mcpServers"]["github"]["command"], "docker");
    let github = collected
        .provenance
        .iter()
        .find(|p| p.key == "github")
        .unwrap();
    assert_eq!(github.introduced_by, "claude");
    assert_eq!(github.also_defined_in, ["vscode"]);

    let (registry, store) = world.open();
    let report = apply(&registry, &store, &ApplyOptions::default()).unwrap();
    assert!(report.success());
    assert_eq!(report.written(), 3);

    let claude = world.sandbox.read_json(".claude.json");
    assert_eq!(claude["numStartups"], 12);
    assert_eq!(claude["mcpServers"].as_object().unwrap().len(), 3);

    let vscode = world.sandbox.read_json(".config/Code/User/settings.json");
    assert_eq!(vscode["editor.fontSize"], 13);
    // append-only: the local github definition is kept
    assert_eq!(vscode["mcp"]["servers"]["github"]["command"], "gh-mcp");
    assert_eq!(vscode["mcp"]["servers"]["sqlite"]["args"][2], "/tmp/app.db");
    let vscode_plan = &report.outcome("vscode").unwrap().plan;
    let github_decision = vscode_plan.get("github").unwrap();
    assert_eq!(github_decision.decision, Decision::SkippedExisting);
    assert!(github_decision.divergent);

    let codex = world.sandbox.read_file(".codex/config.toml");
    assert!(codex.starts_with("# Codex settings\nmodel = \"o3\"\n"));
    assert!(codex.contains("command = \"uvx\" # local build"));
    assert!(codex.contains("[mcp_servers.github]"));
    assert!(codex.contains("[mcp_servers.playwright]"));
}

#[test]
fn converged_world_is_a_fixed_point() {
    let world = World::new();
    let (registry, mut store) = world.open();
    collect(
        &registry,
        &mut store,
        &CollectOptions {
            apply: true,
            ..Default::default()
        },
    )
    .unwrap();
    let (registry, store) = world.open();
    apply(&registry, &store, &ApplyOptions::default()).unwrap();

    let before = world.checksums();
    let central_before = world.sandbox.read_file(".mcp/config.json");

    let (registry, mut store) = world.open();
    let recollected = collect(
        &registry,
        &mut store,
        &CollectOptions {
            apply: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(!recollected.store_written);
    let (registry, store) = world.open();
    let report = apply(&registry, &store, &ApplyOptions::default()).unwrap();

    assert_eq!(report.written(), 0);
    for outcome in &report.outcomes {
        assert_eq!(outcome.status, TargetStatus::UpToDate, "{}", outcome.target);
    }
    assert_eq!(world.checksums(), before);
    assert_eq!(world.sandbox.read_file(".mcp/config.json"), central_before);
}

#[test]
fn dry_run_sync_touches_nothing() {
    let world = World::new();
    world
        .sandbox
        .write_central(json!({ "memory": { "command": "npx", "args": ["-y", "memory"] } }));
    let before = world.checksums();

    let (registry, store) = world.open();
    let report = apply(
        &registry,
        &store,
        &ApplyOptions {
            dry_run: true,
            diff: true,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(world.checksums(), before);
    for outcome in &report.outcomes {
        assert_eq!(outcome.status, TargetStatus::Pending);
        assert!(outcome.diff.as_deref().unwrap().contains("memory"));
    }
}

#[test]
fn add_then_remove_restores_client_files() {
    let world = World::new();
    let (registry, mut store) = world.open();
    let added = add_entry(
        &registry,
        &mut store,
        "time",
        json!({ "command": "uvx", "args": ["mcp-server-time"] }),
        &AddOptions::default(),
    )
    .unwrap();
    assert!(added.success());
    assert_eq!(added.written(), 4);
    assert!(world.sandbox.read_file(".codex/config.toml").contains("[mcp_servers.time]"));

    let (registry, mut store) = world.open();
    let removed = remove_entry(&registry, &mut store, "time", &RemoveOptions::default()).unwrap();
    assert!(removed.success());

    let central = world.sandbox.read_json(".mcp/config.json");
    assert_eq!(central["mcpServers"], json!({}));
    let value = world.sandbox.read_json(".claude.json");
    assert_eq!(value, serde_json::from_str::<serde_json::Value>(CLAUDE).unwrap());
    let vscode = world.sandbox.read_json(".config/Code/User/settings.json");
    assert_eq!(vscode, serde_json::from_str::<serde_json::Value>(VSCODE).unwrap());
    let codex = world.sandbox.read_file(".codex/config.toml");
    assert!(!codex.contains("time"));
    assert!(codex.contains("command = \"uvx\" # local build"));
}

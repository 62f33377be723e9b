//! The sync guarantees, checked once per client file flavor

use mcpset_core::{
    ApplyOptions, CentralStore, CollectOptions, Decision, Policy, Settings, TargetRegistry,
    TargetStatus, apply, collect,
};
use mcpset_fs::compute_file_checksum;
use mcpset_test_utils::{Sandbox, TargetDecl};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

/// One client file flavor: registry declaration plus a file that holds a
/// local `shared` entry and unrelated settings.
struct Flavor {
    decl: TargetDecl<'static>,
    rel: &'static str,
    content: &'static str,
}

fn claude() -> Flavor {
    Flavor {
        decl: TargetDecl::json("client", ".claude.json"),
        rel: ".claude.json",
        content: "{\n  \"theme\": \"dark\",\n  \"mcpServers\": {\n    \"shared\": {\"command\": \"local\"}\n  },\n  \"tips\": [1, 2, 3]\n}\n",
    }
}

fn vscode() -> Flavor {
    Flavor {
        decl: TargetDecl::json("client", ".vscode/settings.json").with_root("mcp.servers"),
        rel: ".vscode/settings.json",
        content: "{\n\t\"files.eol\": \"\\n\",\n\t\"mcp\": {\n\t\t\"servers\": {\n\t\t\t\"shared\": {\"command\": \"local\"}\n\t\t}\n\t}\n}\n",
    }
}

fn codex() -> Flavor {
    Flavor {
        decl: TargetDecl::toml("client", ".codex/config.toml"),
        rel: ".codex/config.toml",
        content: "# keep me\nmodel = \"o3\"\n\n[mcp_servers.shared]\ncommand = \"local\"\n\n[history]\npersistence = \"none\"\n",
    }
}

fn setup(flavor: &Flavor) -> (Sandbox, Settings) {
    let sandbox = Sandbox::new();
    sandbox.write_targets(&[flavor.decl]);
    sandbox.write_file(flavor.rel, flavor.content);
    sandbox.write_central(json!({
        "shared": { "command": "central" },
        "extra": { "command": "npx", "args": ["-y", "extra"], "env": { "TOKEN": "t" } }
    }));
    let settings = Settings::in_dir(sandbox.config_dir()).with_home(sandbox.home());
    (sandbox, settings)
}

fn sync(settings: &Settings, options: &ApplyOptions) -> mcpset_core::RunReport {
    let registry = TargetRegistry::load(settings).unwrap();
    let store = CentralStore::open(registry.central()).unwrap();
    apply(&registry, &store, options).unwrap()
}

fn read_entries(settings: &Settings) -> mcpset_core::Entries {
    let registry = TargetRegistry::load(settings).unwrap();
    registry.get("client").unwrap().document().unwrap().entries
}

#[rstest]
#[case::claude(claude())]
#[case::vscode(vscode())]
#[case::codex(codex())]
fn sync_is_idempotent(#[case] flavor: Flavor) {
    let (sandbox, settings) = setup(&flavor);

    let first = sync(&settings, &ApplyOptions::default());
    assert_eq!(first.outcome("client").unwrap().status, TargetStatus::Written);
    let after_first = sandbox.read_file(flavor.rel);

    let second = sync(&settings, &ApplyOptions::default());
    assert_eq!(second.outcome("client").unwrap().status, TargetStatus::UpToDate);
    assert_eq!(sandbox.read_file(flavor.rel), after_first);
}

#[rstest]
#[case::claude(claude())]
#[case::vscode(vscode())]
#[case::codex(codex())]
fn append_only_keeps_local_definitions(#[case] flavor: Flavor) {
    let (_sandbox, settings) = setup(&flavor);

    let report = sync(&settings, &ApplyOptions::default());
    let plan = &report.outcome("client").unwrap().plan;
    assert_eq!(plan.get("shared").unwrap().decision, Decision::SkippedExisting);
    assert_eq!(plan.get("extra").unwrap().decision, Decision::Added);

    let entries = read_entries(&settings);
    assert_eq!(entries["shared"], json!({ "command": "local" }));
    assert_eq!(entries["extra"]["env"]["TOKEN"], "t");
}

#[rstest]
#[case::claude(claude())]
#[case::vscode(vscode())]
#[case::codex(codex())]
fn override_policy_replaces_local_definitions(#[case] flavor: Flavor) {
    let (_sandbox, settings) = setup(&flavor);

    let options = ApplyOptions {
        policy: Policy::Override,
        ..Default::default()
    };
    let report = sync(&settings, &options);
    let plan = &report.outcome("client").unwrap().plan;
    assert_eq!(plan.get("shared").unwrap().decision, Decision::Overridden);

    assert_eq!(read_entries(&settings)["shared"], json!({ "command": "central" }));
}

#[rstest]
#[case::claude(claude(), &["\"theme\": \"dark\"", "\"tips\": [1, 2, 3]"])]
#[case::vscode(vscode(), &["\t\"files.eol\": \"\\n\","])]
#[case::codex(codex(), &["# keep me\nmodel = \"o3\"\n", "[history]\npersistence = \"none\"\n"])]
fn unrelated_content_survives_repeated_cycles(#[case] flavor: Flavor, #[case] kept: &[&str]) {
    let (sandbox, settings) = setup(&flavor);

    for _ in 0..3 {
        sync(&settings, &ApplyOptions::default());
        let registry = TargetRegistry::load(&settings).unwrap();
        let mut store = CentralStore::open(registry.central()).unwrap();
        collect(
            &registry,
            &mut store,
            &CollectOptions {
                apply: true,
                ..Default::default()
            },
        )
        .unwrap();
    }

    let text = sandbox.read_file(flavor.rel);
    for fragment in kept {
        assert!(text.contains(fragment), "lost {fragment:?} in:\n{text}");
    }
}

#[rstest]
#[case::claude(claude())]
#[case::vscode(vscode())]
#[case::codex(codex())]
fn dry_run_leaves_checksums_unchanged(#[case] flavor: Flavor) {
    let (sandbox, settings) = setup(&flavor);
    let path = sandbox.path(flavor.rel);
    let central = sandbox.path(".mcp/config.json");
    let before = (
        compute_file_checksum(&path).unwrap(),
        compute_file_checksum(&central).unwrap(),
    );

    for policy in [Policy::AppendOnly, Policy::Override, Policy::DeepAppend] {
        let options = ApplyOptions {
            dry_run: true,
            diff: true,
            policy,
            ..Default::default()
        };
        let report = sync(&settings, &options);
        assert_eq!(report.outcome("client").unwrap().status, TargetStatus::Pending);
    }

    let after = (
        compute_file_checksum(&path).unwrap(),
        compute_file_checksum(&central).unwrap(),
    );
    assert_eq!(after, before);
}

#[test]
fn collector_first_target_wins() {
    let sandbox = Sandbox::new();
    sandbox.write_targets(&[
        TargetDecl::toml("codex", ".codex/config.toml"),
        TargetDecl::json("claude", ".claude.json"),
    ]);
    sandbox.write_file(".codex/config.toml", "[mcp_servers.db]\ncommand = \"from-codex\"\n");
    sandbox.write_file(
        ".claude.json",
        "{\"mcpServers\": {\"db\": {\"command\": \"from-claude\"}}}",
    );
    let settings = Settings::in_dir(sandbox.config_dir()).with_home(sandbox.home());
    let registry = TargetRegistry::load(&settings).unwrap();

    for (order, winner) in [
        (vec!["codex".to_string(), "claude".to_string()], "from-codex"),
        (vec!["claude".to_string(), "codex".to_string()], "from-claude"),
    ] {
        let mut store = CentralStore::open(registry.central()).unwrap();
        collect(
            &registry,
            &mut store,
            &CollectOptions {
                targets: order,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(store.entries()["db"]["command"], winner);
    }
    assert!(!sandbox.exists(".mcp/config.json"));
}
